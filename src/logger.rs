/// Route `log` messages to stderr, defaulting to `info`. `RUST_LOG` overrides the level.
pub fn setup() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();
}
