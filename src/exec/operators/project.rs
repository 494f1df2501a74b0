// Projection Operator
//
// Evaluates the projection expressions against each input batch.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::Operator;
use crate::exec::expression::evaluate;
use crate::exec::ExecError;
use crate::sql::relalg::Expr;

pub struct ProjectOperator {
    input: Box<dyn Operator>,
    exprs: Vec<Expr>,
    schema: SchemaRef,
}

impl ProjectOperator {
    pub fn new(input: Box<dyn Operator>, exprs: Vec<Expr>, schema: SchemaRef) -> Self {
        ProjectOperator {
            input,
            exprs,
            schema,
        }
    }
}

impl Operator for ProjectOperator {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        match self.input.next_batch()? {
            Some(batch) => {
                let columns = self
                    .exprs
                    .iter()
                    .map(|expr| evaluate(expr, &batch))
                    .collect::<Result<Vec<_>, _>>()?;
                let projected = RecordBatch::try_new(self.schema.clone(), columns)?;
                Ok(Some(projected))
            }
            None => Ok(None),
        }
    }
}
