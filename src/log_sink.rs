// log_sink.rs
// Purpose: Install the process-wide tracing subscriber for the binaries

use tracing_subscriber::{fmt, EnvFilter};

/// Install a fmt subscriber. `RUST_LOG` wins over `default_level` when set.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging("debug");
        init_logging("not a valid filter ((");
        tracing::info!("logging initialised twice without panicking");
    }
}
