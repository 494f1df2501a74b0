// Query Operators Module
//
// Operators form a pull-based tree: each call to `next_batch` produces the
// next output batch or `None` when the operator is exhausted. Pipeline
// breakers (aggregate, join build side, sort) consume their input on the
// first call.

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod limit;
pub mod project;
pub mod scan;
pub mod sort;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::ExecError;

/// Batch-at-a-time execution operator.
pub trait Operator: Send {
    /// Output schema of this operator.
    fn schema(&self) -> SchemaRef;

    /// Produce the next output batch, or `None` when exhausted.
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError>;
}
