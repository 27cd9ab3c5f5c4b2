// Logging setup: `env_logger` over the `log` facade.

/// Initializes `env_logger`, defaulting `RUST_LOG` to `info` when unset
/// so the daemon is never silent out of the box.
pub fn init() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
