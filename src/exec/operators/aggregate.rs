// Hash Aggregation Operator
//
// Groups rows by the key columns and folds each group into one accumulator
// per aggregate. Group output order is first-seen order. Without group
// keys the operator always produces exactly one row, even on empty input.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use linked_hash_map::LinkedHashMap;

use super::Operator;
use crate::common::Datum;
use crate::exec::executor::Watchdog;
use crate::exec::expression::{build_array, datum_at};
use crate::exec::ExecError;
use crate::sql::relalg::{AggExpr, AggFunc};

/// Accumulator for a single aggregate within one group.
#[derive(Debug, Clone)]
struct AggState {
    func: AggFunc,
    /// Rows seen; for COUNT(col) only non-null rows are counted.
    count: i64,
    sum: Datum,
    min: Datum,
    max: Datum,
}

impl AggState {
    fn new(func: AggFunc) -> Self {
        AggState {
            func,
            count: 0,
            sum: Datum::Null,
            min: Datum::Null,
            max: Datum::Null,
        }
    }

    fn update(&mut self, value: &Datum) -> Result<(), ExecError> {
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        match self.func {
            AggFunc::Count => {}
            AggFunc::Sum | AggFunc::Avg => self.update_sum(value)?,
            AggFunc::Min => {
                if self.min.is_null() || value.sort_cmp(&self.min, false).is_lt() {
                    self.min = value.clone();
                }
            }
            AggFunc::Max => {
                if self.max.is_null() || value.sort_cmp(&self.max, false).is_gt() {
                    self.max = value.clone();
                }
            }
        }
        Ok(())
    }

    /// COUNT(*) counts rows regardless of nulls.
    fn update_row_count(&mut self) {
        self.count += 1;
    }

    fn update_sum(&mut self, value: &Datum) -> Result<(), ExecError> {
        self.sum = match (&self.sum, value) {
            (Datum::Null, v) => v.clone(),
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.checked_add(*b).ok_or_else(|| {
                ExecError::Execution("integer overflow in SUM".to_string())
            })?),
            (Datum::Int(a), Datum::Float(b)) => Datum::Float(*a as f64 + b),
            (Datum::Float(a), Datum::Int(b)) => Datum::Float(a + *b as f64),
            (Datum::Float(a), Datum::Float(b)) => Datum::Float(a + b),
            (current, v) => {
                return Err(ExecError::Type(format!(
                    "cannot add {} to running sum {}",
                    v, current
                )));
            }
        };
        Ok(())
    }

    fn finish(&self) -> Datum {
        match self.func {
            AggFunc::Count => Datum::Int(self.count),
            AggFunc::Sum => self.sum.clone(),
            AggFunc::Min => self.min.clone(),
            AggFunc::Max => self.max.clone(),
            AggFunc::Avg => {
                if self.count == 0 {
                    Datum::Null
                } else {
                    match self.sum.as_f64() {
                        Some(total) => Datum::Float(total / self.count as f64),
                        None => Datum::Null,
                    }
                }
            }
        }
    }
}

pub struct HashAggregateOperator {
    input: Box<dyn Operator>,
    group_by: Vec<usize>,
    aggs: Vec<AggExpr>,
    schema: SchemaRef,
    max_groups: usize,
    watchdog: Watchdog,
    done: bool,
}

impl HashAggregateOperator {
    pub fn new(
        input: Box<dyn Operator>,
        group_by: Vec<usize>,
        aggs: Vec<AggExpr>,
        schema: SchemaRef,
        max_groups: usize,
        watchdog: Watchdog,
    ) -> Self {
        HashAggregateOperator {
            input,
            group_by,
            aggs,
            schema,
            max_groups,
            watchdog,
            done: false,
        }
    }

    fn consume_input(
        &mut self,
    ) -> Result<LinkedHashMap<Vec<Datum>, Vec<AggState>>, ExecError> {
        let mut groups: LinkedHashMap<Vec<Datum>, Vec<AggState>> = LinkedHashMap::new();
        while let Some(batch) = self.input.next_batch()? {
            self.watchdog.check()?;
            for row in 0..batch.num_rows() {
                let key: Vec<Datum> = self
                    .group_by
                    .iter()
                    .map(|&col| datum_at(batch.column(col), row))
                    .collect::<Result<_, _>>()?;
                if !groups.contains_key(&key) && groups.len() >= self.max_groups {
                    return Err(ExecError::TooManyGroups {
                        max_groups: self.max_groups,
                    });
                }
                let states = groups.entry(key).or_insert_with(|| {
                    self.aggs.iter().map(|a| AggState::new(a.func)).collect()
                });
                for (agg, state) in self.aggs.iter().zip(states.iter_mut()) {
                    match agg.arg {
                        Some(col) => {
                            let value = datum_at(batch.column(col), row)?;
                            state.update(&value)?;
                        }
                        None => state.update_row_count(),
                    }
                }
            }
        }
        // A global aggregate produces one row even for empty input.
        if groups.is_empty() && self.group_by.is_empty() {
            groups.insert(
                Vec::new(),
                self.aggs.iter().map(|a| AggState::new(a.func)).collect(),
            );
        }
        Ok(groups)
    }
}

impl Operator for HashAggregateOperator {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>, ExecError> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let groups = self.consume_input()?;
        let group_count = groups.len();
        let column_count = self.group_by.len() + self.aggs.len();
        let mut columns: Vec<Vec<Datum>> = vec![Vec::with_capacity(group_count); column_count];
        for (key, states) in groups.iter() {
            for (i, value) in key.iter().enumerate() {
                columns[i].push(value.clone());
            }
            for (i, state) in states.iter().enumerate() {
                columns[self.group_by.len() + i].push(state.finish());
            }
        }

        let arrays = columns
            .iter()
            .enumerate()
            .map(|(i, values)| build_array(values, self.schema.field(i).data_type()))
            .collect::<Result<Vec<_>, _>>()?;
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        Ok(Some(batch))
    }
}
