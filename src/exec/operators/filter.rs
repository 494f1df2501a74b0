// Filter Operator
//
// Evaluates the predicate against each input batch and keeps the rows where
// it is true. NULL predicate results drop the row, per SQL semantics;
// arrow's filter kernel treats nulls in the mask as false.

use arrow::compute::filter_record_batch;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::Operator;
use crate::exec::expression::evaluate_predicate;
use crate::exec::ExecError;
use crate::sql::relalg::Expr;

pub struct FilterOperator {
    input: Box<dyn Operator>,
    predicate: Expr,
}

impl FilterOperator {
    pub fn new(input: Box<dyn Operator>, predicate: Expr) -> Self {
        FilterOperator { input, predicate }
    }
}

impl Operator for FilterOperator {
    fn schema(&self) -> SchemaRef {
        self.input.schema()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        while let Some(batch) = self.input.next_batch()? {
            let mask = evaluate_predicate(&self.predicate, &batch)?;
            let filtered = filter_record_batch(&batch, &mask)?;
            if filtered.num_rows() > 0 {
                return Ok(Some(filtered));
            }
        }
        Ok(None)
    }
}
