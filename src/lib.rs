// Ember Database Engine
//
// An embeddable columnar SQL engine. Tables are imported as Arrow record
// batches, SQL is compiled to a relational-algebra plan and executed by a
// batch-at-a-time operator tree. Process-wide setup (platform prerequisites,
// loader-flag mask, builtin module registration) happens in `init` before
// any engine component is handed out.

pub mod builder;
pub mod common;
pub mod config;
pub mod engine;
pub mod exec;
pub mod init;
pub mod logger;
pub mod sql;
pub mod storage;
pub mod version;

// Re-export key items for convenient access
pub use builder::QueryBuilder;
pub use config::{Config, ConfigBuilder, build_config};
pub use engine::{Engine, EngineError, init, init_with_config};
pub use exec::executor::Executor;
pub use init::{InitError, Platform, initialize};
pub use logger::{LoggerOptions, init_logger};
pub use storage::schema::TypeInfo;
pub use version::{VERSION, version};
