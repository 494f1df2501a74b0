// Hash Join Operator
//
// Inner equi-join. The right side is consumed into a hash table on the
// first call; left batches are then probed one at a time. NULL keys never
// match.

use std::collections::HashMap;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use super::Operator;
use crate::common::Datum;
use crate::exec::executor::Watchdog;
use crate::exec::expression::{build_array, datum_at};
use crate::exec::ExecError;

pub struct HashJoinOperator {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    left_keys: Vec<usize>,
    right_keys: Vec<usize>,
    schema: SchemaRef,
    watchdog: Watchdog,
    build_table: Option<BuildTable>,
}

struct BuildTable {
    batches: Vec<RecordBatch>,
    /// Key -> (batch index, row index) of matching build rows.
    index: HashMap<Vec<Datum>, Vec<(usize, usize)>>,
}

impl HashJoinOperator {
    pub fn new(
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
        schema: SchemaRef,
        watchdog: Watchdog,
    ) -> Self {
        HashJoinOperator {
            left,
            right,
            left_keys,
            right_keys,
            schema,
            watchdog,
            build_table: None,
        }
    }

    fn build(&mut self) -> Result<(), ExecError> {
        let mut batches = Vec::new();
        let mut index: HashMap<Vec<Datum>, Vec<(usize, usize)>> = HashMap::new();
        while let Some(batch) = self.right.next_batch()? {
            self.watchdog.check()?;
            let batch_idx = batches.len();
            for row in 0..batch.num_rows() {
                let mut key = Vec::with_capacity(self.right_keys.len());
                let mut has_null = false;
                for &col in &self.right_keys {
                    let value = datum_at(batch.column(col), row)?;
                    has_null |= value.is_null();
                    key.push(value);
                }
                if has_null {
                    continue;
                }
                index.entry(key).or_default().push((batch_idx, row));
            }
            batches.push(batch);
        }
        self.build_table = Some(BuildTable { batches, index });
        Ok(())
    }

    fn probe(&self, batch: &RecordBatch) -> Result<Option<RecordBatch>, ExecError> {
        let build = self
            .build_table
            .as_ref()
            .ok_or_else(|| ExecError::Execution("join probe before build".to_string()))?;

        let left_width = batch.num_columns();
        let mut rows: Vec<(usize, (usize, usize))> = Vec::new();
        for row in 0..batch.num_rows() {
            let mut key = Vec::with_capacity(self.left_keys.len());
            let mut has_null = false;
            for &col in &self.left_keys {
                let value = datum_at(batch.column(col), row)?;
                has_null |= value.is_null();
                key.push(value);
            }
            if has_null {
                continue;
            }
            if let Some(matches) = build.index.get(&key) {
                for &m in matches {
                    rows.push((row, m));
                }
            }
        }
        if rows.is_empty() {
            return Ok(None);
        }

        let mut columns: Vec<Vec<Datum>> =
            vec![Vec::with_capacity(rows.len()); self.schema.fields().len()];
        for &(left_row, (build_batch, build_row)) in &rows {
            for col in 0..left_width {
                columns[col].push(datum_at(batch.column(col), left_row)?);
            }
            let right_batch = &build.batches[build_batch];
            for col in 0..right_batch.num_columns() {
                columns[left_width + col]
                    .push(datum_at(right_batch.column(col), build_row)?);
            }
        }
        let arrays = columns
            .iter()
            .enumerate()
            .map(|(i, values)| build_array(values, self.schema.field(i).data_type()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(RecordBatch::try_new(self.schema.clone(), arrays)?))
    }
}

impl Operator for HashJoinOperator {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        if self.build_table.is_none() {
            self.build()?;
        }
        while let Some(batch) = self.left.next_batch()? {
            if let Some(joined) = self.probe(&batch)? {
                return Ok(Some(joined));
            }
        }
        Ok(None)
    }
}
