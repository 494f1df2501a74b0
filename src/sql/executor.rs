// Relational-Algebra Plan Runner
//
// Thin front-end that runs a compiled plan on an executor and wraps the
// output batches for inspection.

use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::relalg::RelAlgPlan;
use crate::exec::executor::Executor;
use crate::exec::ExecError;

/// Binds one plan to one executor for execution or explaining.
pub struct RelAlgExecutor {
    executor: Arc<Executor>,
    plan: RelAlgPlan,
}

impl RelAlgExecutor {
    pub fn new(executor: Arc<Executor>, plan: RelAlgPlan) -> Self {
        RelAlgExecutor { executor, plan }
    }

    pub fn plan(&self) -> &RelAlgPlan {
        &self.plan
    }

    /// Run the plan to completion.
    pub fn execute(&self) -> Result<ExecutionResult, ExecError> {
        let batches = self.executor.execute_plan(&self.plan)?;
        Ok(ExecutionResult {
            schema: self.plan.schema(),
            batches,
        })
    }

    /// Render the physical plan without running it.
    pub fn explain(&self) -> String {
        self.plan.explain()
    }
}

/// Materialized query output.
#[derive(Debug)]
pub struct ExecutionResult {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl ExecutionResult {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        ExecutionResult { schema, batches }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Collapse the output into a single record batch.
    pub fn to_arrow(&self) -> Result<RecordBatch, ExecError> {
        if self.batches.is_empty() {
            return Ok(RecordBatch::new_empty(self.schema.clone()));
        }
        Ok(concat_batches(&self.schema, &self.batches)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};

    fn int_batch(schema: &SchemaRef, values: Vec<i64>) -> RecordBatch {
        RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(values))])
            .unwrap()
    }

    #[test]
    fn test_result_counts_and_concat() {
        let schema: SchemaRef =
            Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, true)]));
        let result = ExecutionResult::new(
            schema.clone(),
            vec![
                int_batch(&schema, vec![1, 2]),
                int_batch(&schema, vec![3]),
            ],
        );
        assert_eq!(result.row_count(), 3);
        assert_eq!(result.num_columns(), 1);
        assert_eq!(result.to_arrow().unwrap().num_rows(), 3);
    }

    #[test]
    fn test_empty_result_to_arrow() {
        let schema: SchemaRef =
            Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, true)]));
        let result = ExecutionResult::new(schema, vec![]);
        assert_eq!(result.row_count(), 0);
        let batch = result.to_arrow().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 1);
    }
}
