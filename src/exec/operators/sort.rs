// Sort Operator
//
// Materializes its whole input, computes a sort permutation over the key
// columns, and emits one reordered batch.

use arrow::array::UInt32Array;
use arrow::compute::{concat_batches, take};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::Operator;
use crate::common::Datum;
use crate::exec::executor::Watchdog;
use crate::exec::expression::datum_at;
use crate::exec::ExecError;
use crate::sql::relalg::SortKey;

pub struct SortOperator {
    input: Box<dyn Operator>,
    keys: Vec<SortKey>,
    watchdog: Watchdog,
    done: bool,
}

impl SortOperator {
    pub fn new(input: Box<dyn Operator>, keys: Vec<SortKey>, watchdog: Watchdog) -> Self {
        SortOperator {
            input,
            keys,
            watchdog,
            done: false,
        }
    }
}

impl Operator for SortOperator {
    fn schema(&self) -> SchemaRef {
        self.input.schema()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let schema = self.input.schema();
        let mut batches = Vec::new();
        while let Some(batch) = self.input.next_batch()? {
            self.watchdog.check()?;
            batches.push(batch);
        }
        if batches.is_empty() {
            return Ok(None);
        }
        let merged = concat_batches(&schema, &batches)?;

        // Extract the key values once, then sort row indices.
        let mut key_rows: Vec<Vec<Datum>> = Vec::with_capacity(merged.num_rows());
        for row in 0..merged.num_rows() {
            let key = self
                .keys
                .iter()
                .map(|k| datum_at(merged.column(k.index), row))
                .collect::<Result<Vec<_>, _>>()?;
            key_rows.push(key);
        }
        let mut order: Vec<u32> = (0..merged.num_rows() as u32).collect();
        order.sort_by(|&a, &b| {
            for (i, key) in self.keys.iter().enumerate() {
                let left = &key_rows[a as usize][i];
                let right = &key_rows[b as usize][i];
                // Null placement follows nulls_first as-is; only value
                // comparisons flip for descending keys.
                let ordering = if left.is_null() || right.is_null() {
                    left.sort_cmp(right, key.nulls_first)
                } else {
                    let ordering = left.sort_cmp(right, key.nulls_first);
                    if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                };
                if !ordering.is_eq() {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });

        let indices = UInt32Array::from(order);
        let columns = merged
            .columns()
            .iter()
            .map(|col| take(col.as_ref(), &indices, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(RecordBatch::try_new(schema, columns)?))
    }
}
