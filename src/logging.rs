//! Opt-in tracing initialization for applications embedding the shipper.
//!
//! The shipper itself only emits through `tracing`; a host application that
//! has no subscriber of its own can call [`init`] once at startup.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directives that quiet the HTTP stack underneath the shipper.
const DEFAULT_DIRECTIVES: &[&str] = &["hyper=warn", "reqwest=warn", "h2=warn"];

/// Installs a global `tracing` subscriber with the given default level.
///
/// `RUST_LOG`, when set, takes precedence over `default_level`. Safe to
/// call more than once; only the first call installs anything, and an
/// already-installed subscriber (e.g. the host's own) is left in place.
pub fn init(default_level: &str) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(build_filter_string(default_level)));

        let result = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_level(true).compact())
            .try_init();

        if let Err(e) = result {
            eprintln!("appvital-log-shipper: tracing subscriber not installed: {e}");
        }
    });
}

fn build_filter_string(default_level: &str) -> String {
    let mut parts = Vec::with_capacity(DEFAULT_DIRECTIVES.len() + 1);
    parts.push(default_level.to_string());
    parts.extend(DEFAULT_DIRECTIVES.iter().map(|d| (*d).to_string()));
    parts.join(",")
}
