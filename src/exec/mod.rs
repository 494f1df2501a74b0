// Query Execution Module
//
// Batch-at-a-time execution of relational-algebra plans over Arrow record
// batches.

pub mod executor;
pub mod expression;
pub mod functions;
pub mod operators;

pub use executor::Executor;

use arrow::error::ArrowError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors raised during plan execution.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
    #[error("type error: {0}")]
    Type(String),
    #[error("execution error: {0}")]
    Execution(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("query exceeded watchdog time limit of {limit_ms} ms")]
    WatchdogTimeout { limit_ms: u64 },
    #[error("aggregation exceeded the configured bound of {max_groups} groups")]
    TooManyGroups { max_groups: usize },
}
