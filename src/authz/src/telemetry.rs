//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over `level` when set. Returns `false` when a global
/// subscriber was already installed, which leaves that one in place.
pub fn init(level: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{level},spacedock_authz={level},spacedock_core={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).with_thread_ids(true))
        .try_init()
        .is_ok()
}
