//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 默认级别为 `info`，`VERBOSE_LOGGING=true` 时为 `debug`，`RUST_LOG` 优先
pub fn init() {
    let verbose = std::env::var("VERBOSE_LOGGING")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);
    let default_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
