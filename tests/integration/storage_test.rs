// Storage-layer tests through the engine: import, fragmentation, append,
// drop, and type validation.

use std::sync::Arc;

use anyhow::Result;
use arrow::array::Int32Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use emberdb::storage::{StorageError, TableOptions};

#[path = "../common/mod.rs"]
mod common;
use common::{engine_with_sample_table, int_batch, int_column};

#[test]
fn test_import_with_explicit_fragment_size() -> Result<()> {
    let engine = emberdb::engine::init()?;
    let info = engine.import_record_batch(
        "t",
        &common::sample_batch(),
        Some(TableOptions::new(2)),
    )?;
    assert_eq!(info.row_count, 3);
    assert_eq!(info.fragment_count, 2);

    let (info, fragments) = engine.data_mgr().fetch_table("t")?;
    assert_eq!(info.name, "t");
    assert_eq!(
        fragments.iter().map(|f| f.num_rows()).collect::<Vec<_>>(),
        vec![2, 1]
    );
    Ok(())
}

#[test]
fn test_list_tables() -> Result<()> {
    let engine = emberdb::engine::init()?;
    engine.import_record_batch("zeta", &common::sample_batch(), None)?;
    engine.import_record_batch("alpha", &common::sample_batch(), None)?;
    assert_eq!(engine.data_mgr().list_tables(), vec!["alpha", "zeta"]);
    Ok(())
}

#[test]
fn test_append_visible_to_queries() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let extra = int_batch(&["a", "b"], vec![vec![Some(4)], vec![Some(40)]]);
    // Appends must reuse the table's schema.
    let extra = RecordBatch::try_new(common::sample_batch().schema(), extra.columns().to_vec())?;
    engine.storage().append_record_batch(&extra, "t")?;

    let result = engine.sql("SELECT COUNT(*) FROM t")?;
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(4)]);
    Ok(())
}

#[test]
fn test_drop_table_removes_it() -> Result<()> {
    let engine = engine_with_sample_table()?;
    engine.storage().drop_table("t")?;
    assert!(engine.sql("SELECT COUNT(*) FROM t").is_err());
    assert!(matches!(
        engine.storage().drop_table("t"),
        Err(StorageError::TableNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_unsupported_column_type_rejected() -> Result<()> {
    let engine = emberdb::engine::init()?;
    let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Int32, true)]));
    let batch = RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![1]))])?;
    let err = engine.import_record_batch("bad", &batch, None).unwrap_err();
    assert!(err.to_string().contains("unsupported column type"));
    Ok(())
}

#[test]
fn test_table_info_lookup() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let info = engine.data_mgr().table_info("t").expect("table missing");
    assert_eq!(info.schema.fields().len(), 2);
    assert_eq!(info.schema_id, engine.storage().schema_id());
    assert!(engine.data_mgr().table_info("nope").is_none());
    Ok(())
}
