// Limit Operator
//
// Skips `offset` rows, then passes through at most `limit` rows.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::Operator;
use crate::exec::ExecError;

pub struct LimitOperator {
    input: Box<dyn Operator>,
    limit: Option<usize>,
    remaining_offset: usize,
    emitted: usize,
}

impl LimitOperator {
    pub fn new(input: Box<dyn Operator>, limit: Option<usize>, offset: usize) -> Self {
        LimitOperator {
            input,
            limit,
            remaining_offset: offset,
            emitted: 0,
        }
    }
}

impl Operator for LimitOperator {
    fn schema(&self) -> SchemaRef {
        self.input.schema()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        loop {
            if let Some(limit) = self.limit {
                if self.emitted >= limit {
                    return Ok(None);
                }
            }
            let Some(mut batch) = self.input.next_batch()? else {
                return Ok(None);
            };
            if self.remaining_offset > 0 {
                let skip = self.remaining_offset.min(batch.num_rows());
                self.remaining_offset -= skip;
                if skip == batch.num_rows() {
                    continue;
                }
                batch = batch.slice(skip, batch.num_rows() - skip);
            }
            if let Some(limit) = self.limit {
                let budget = limit - self.emitted;
                if batch.num_rows() > budget {
                    batch = batch.slice(0, budget);
                }
            }
            if batch.num_rows() == 0 {
                continue;
            }
            self.emitted += batch.num_rows();
            return Ok(Some(batch));
        }
    }
}
