// Engine Configuration
//
// Configuration is a plain tree of option structs produced by a fluent
// builder. The builder can also populate itself from command-line style
// arguments so embedders can forward their own argv.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub const DEFAULT_WATCHDOG_TIME_LIMIT_MS: u64 = 10_000;
pub const DEFAULT_MAX_GROUPS: usize = 120_000_000;
pub const DEFAULT_FRAGMENT_SIZE: usize = 32_000_000;

/// Guard rails for runaway queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    pub enable: bool,
    pub time_limit_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        WatchdogConfig {
            enable: false,
            time_limit_ms: DEFAULT_WATCHDOG_TIME_LIMIT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupByConfig {
    /// Upper bound on the number of groups a single aggregation may produce.
    pub max_groups: usize,
}

impl Default for GroupByConfig {
    fn default() -> Self {
        GroupByConfig {
            max_groups: DEFAULT_MAX_GROUPS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecConfig {
    pub watchdog: WatchdogConfig,
    pub group_by: GroupByConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptConfig {
    /// Push WHERE conjuncts below a join onto the side they reference.
    pub enable_filter_pushdown: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Fragment size used when table options do not specify one.
    pub default_fragment_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            default_fragment_size: DEFAULT_FRAGMENT_SIZE,
        }
    }
}

/// Root of the engine configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub exec: ExecConfig,
    pub opts: OptConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, clap::Parser)]
#[command(no_binary_name = true)]
struct ConfigArgs {
    #[arg(long)]
    enable_watchdog: Option<bool>,
    #[arg(long)]
    watchdog_time_limit_ms: Option<u64>,
    #[arg(long)]
    max_groups: Option<usize>,
    #[arg(long)]
    enable_filter_pushdown: Option<bool>,
    #[arg(long)]
    default_fragment_size: Option<usize>,
}

/// Fluent builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    pub fn from_config(config: Config) -> Self {
        ConfigBuilder { config }
    }

    pub fn enable_watchdog(mut self, enable: bool) -> Self {
        self.config.exec.watchdog.enable = enable;
        self
    }

    pub fn watchdog_time_limit_ms(mut self, limit_ms: u64) -> Self {
        self.config.exec.watchdog.time_limit_ms = limit_ms;
        self
    }

    pub fn max_groups(mut self, max_groups: usize) -> Self {
        self.config.exec.group_by.max_groups = max_groups;
        self
    }

    pub fn enable_filter_pushdown(mut self, enable: bool) -> Self {
        self.config.opts.enable_filter_pushdown = enable;
        self
    }

    pub fn default_fragment_size(mut self, fragment_size: usize) -> Self {
        self.config.storage.default_fragment_size = fragment_size;
        self
    }

    /// Apply command-line style arguments, e.g.
    /// `["--enable-watchdog", "true", "--max-groups", "1000"]`.
    pub fn parse_args<I, S>(mut self, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        use clap::Parser;
        let parsed = ConfigArgs::try_parse_from(args.into_iter().map(Into::into))?;
        if let Some(v) = parsed.enable_watchdog {
            self.config.exec.watchdog.enable = v;
        }
        if let Some(v) = parsed.watchdog_time_limit_ms {
            self.config.exec.watchdog.time_limit_ms = v;
        }
        if let Some(v) = parsed.max_groups {
            self.config.exec.group_by.max_groups = v;
        }
        if let Some(v) = parsed.enable_filter_pushdown {
            self.config.opts.enable_filter_pushdown = v;
        }
        if let Some(v) = parsed.default_fragment_size {
            self.config.storage.default_fragment_size = v;
        }
        Ok(self)
    }

    pub fn build(self) -> Arc<Config> {
        Arc::new(self.config)
    }
}

/// Build a configuration with default values.
pub fn build_config() -> Arc<Config> {
    ConfigBuilder::new().build()
}
