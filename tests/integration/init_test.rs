// Process initialization and public entry-point tests.

use anyhow::Result;
use emberdb::init::{
    check_prerequisites, initialize, loader_flags, required_env_vars, InitError,
    Platform, LOADER_LAZY,
};

#[path = "../common/mod.rs"]
mod common;
use common::engine_with_sample_table;

#[test]
fn test_initialize_is_idempotent() -> Result<()> {
    initialize()?;
    initialize()?;
    // The flag bracket used during module registration must not leak.
    assert_eq!(loader_flags(), LOADER_LAZY);
    Ok(())
}

#[test]
fn test_engine_init_runs_process_setup() -> Result<()> {
    // Engine construction goes through initialize(); a second engine in the
    // same process must work.
    let first = engine_with_sample_table()?;
    let second = emberdb::engine::init()?;
    assert_eq!(first.sql("SELECT COUNT(*) FROM t")?.row_count(), 1);
    // Engines do not share storage.
    assert!(second.sql("SELECT COUNT(*) FROM t").is_err());
    Ok(())
}

#[test]
fn test_windows_prerequisites() {
    let reqs = required_env_vars(Platform::Windows);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].var, "JAVA_HOME");
    assert!(required_env_vars(Platform::Linux).is_empty());
    assert!(required_env_vars(Platform::Other).is_empty());

    let err = check_prerequisites(Platform::Windows, |_| None).unwrap_err();
    assert!(matches!(err, InitError::MissingPrerequisite { .. }));
    assert!(err.to_string().contains("JAVA_HOME"));
}

#[test]
fn test_public_surface_reachable() -> Result<()> {
    assert!(!emberdb::version().is_empty());
    assert_eq!(emberdb::version(), emberdb::VERSION);

    emberdb::init_logger(&emberdb::LoggerOptions::default());

    let config = emberdb::ConfigBuilder::new()
        .enable_watchdog(true)
        .watchdog_time_limit_ms(60_000)
        .build();
    assert!(config.exec.watchdog.enable);

    let engine = emberdb::engine::init_with_config(
        emberdb::ConfigBuilder::from_config((*config).clone()),
    )?;
    assert!(engine.config().exec.watchdog.enable);
    Ok(())
}
