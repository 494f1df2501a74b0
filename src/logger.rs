// Logger Initialization
//
// The engine logs through the `log` facade; this module installs an
// env_logger backend for embedders that do not bring their own. Repeated
// initialization is a no-op so library consumers and tests can both call it.

use log::LevelFilter;

/// Options for the engine's default logger backend.
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    /// Emit debug-level engine logs in addition to info and above.
    pub debug_logs: bool,
}

impl LoggerOptions {
    pub fn with_debug_logs(mut self, debug_logs: bool) -> Self {
        self.debug_logs = debug_logs;
        self
    }
}

/// Install the default logger. `RUST_LOG` overrides the level chosen here.
pub fn init_logger(options: &LoggerOptions) {
    let level = if options.debug_logs {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
