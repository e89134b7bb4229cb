// src/telemetry.rs
//! Tracing setup and log helpers.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_DEV_LOG: &str = "SITE_DEV_LOG";
const DEFAULT_FILTER: &str = "deutsch_daily=info,warn";

/// Dev environment = debug build OR SHUTTLE_ENV in {local, development, dev}.
pub fn is_dev_env() -> bool {
    cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        )
}

/// Compact human logs need BOTH a dev environment and SITE_DEV_LOG=1.
pub fn dev_logging_enabled() -> bool {
    std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1") && is_dev_env()
}

/// Install the global subscriber: compact in dev, JSON otherwise.
/// A second call (tests, or a runtime that already installed one) is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let res = if dev_logging_enabled() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    };

    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Short stable id for learner text. Raw messages never go to the logs.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("ich habe gegangen");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("ich habe gegangen"));
        assert_ne!(a, anon_hash("ich bin gegangen"));
    }
}
