// Table Scan Operator
//
// Emits a table's fragments in import order.

use std::collections::VecDeque;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::Operator;
use crate::exec::ExecError;

pub struct ScanOperator {
    schema: SchemaRef,
    fragments: VecDeque<RecordBatch>,
}

impl ScanOperator {
    pub fn new(schema: SchemaRef, fragments: Vec<RecordBatch>) -> Self {
        ScanOperator {
            schema,
            fragments: fragments.into(),
        }
    }
}

impl Operator for ScanOperator {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        Ok(self.fragments.pop_front())
    }
}
