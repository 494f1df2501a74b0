// Shared test utilities

use std::sync::Arc;

use anyhow::Result;
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use emberdb::engine::{init, Engine};

/// A two-column integer batch: a = [1, 2, 3], b = [10, 20, 30].
#[allow(dead_code)]
pub fn sample_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("a", DataType::Int64, true),
        Field::new("b", DataType::Int64, true),
    ]));
    RecordBatch::try_new(schema, vec![
        Arc::new(Int64Array::from(vec![1, 2, 3])),
        Arc::new(Int64Array::from(vec![10, 20, 30])),
    ])
    .unwrap()
}

/// An engine with [`sample_batch`] imported as table `t`.
#[allow(dead_code)]
pub fn engine_with_sample_table() -> Result<Engine> {
    let engine = init()?;
    engine.import_record_batch("t", &sample_batch(), None)?;
    Ok(engine)
}

#[allow(dead_code)]
pub fn int_batch(names: &[&str], columns: Vec<Vec<Option<i64>>>) -> RecordBatch {
    let schema = Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(*n, DataType::Int64, true))
            .collect::<Vec<_>>(),
    ));
    let arrays = columns
        .into_iter()
        .map(|values| Arc::new(Int64Array::from(values)) as Arc<dyn Array>)
        .collect();
    RecordBatch::try_new(schema, arrays).unwrap()
}

#[allow(dead_code)]
pub fn int_column(batch: &RecordBatch, index: usize) -> Vec<Option<i64>> {
    let array = batch
        .column(index)
        .as_any()
        .downcast_ref::<Int64Array>()
        .expect("expected an Int64 column");
    (0..array.len())
        .map(|i| if array.is_null(i) { None } else { Some(array.value(i)) })
        .collect()
}

#[allow(dead_code)]
pub fn float_column(batch: &RecordBatch, index: usize) -> Vec<Option<f64>> {
    let array = batch
        .column(index)
        .as_any()
        .downcast_ref::<Float64Array>()
        .expect("expected a Float64 column");
    (0..array.len())
        .map(|i| if array.is_null(i) { None } else { Some(array.value(i)) })
        .collect()
}

#[allow(dead_code)]
pub fn string_column(batch: &RecordBatch, index: usize) -> Vec<Option<String>> {
    let array = batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("expected a Utf8 column");
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                None
            } else {
                Some(array.value(i).to_string())
            }
        })
        .collect()
}
