use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger. `debug` raises the default filter from info to
/// debug; `RUST_LOG` still wins.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    // a logger may already be installed by an embedding host or a test
    let _ = Builder::from_env(env).format_timestamp_millis().try_init();
}
