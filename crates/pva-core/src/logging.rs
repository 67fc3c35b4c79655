//! Development-time tracing setup
//!
//! The engines emit `tracing` events but never install a subscriber;
//! embedding applications that want the output on stderr can call
//! [`init`] once at startup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG`
///
/// Defaults to `warn` when `RUST_LOG` is unset. Calling it again after a
/// subscriber is installed is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_can_be_called_more_than_once() {
        init();
        init();
        tracing::info!("subscriber installed");
    }
}
