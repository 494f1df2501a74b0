// End-to-end SQL tests: import Arrow batches, run SQL, check results.

use anyhow::Result;
use emberdb::engine::{init_with_config, EngineError};
use emberdb::exec::ExecError;
use emberdb::sql::SqlError;
use emberdb::storage::StorageError;
use emberdb::ConfigBuilder;

#[path = "../common/mod.rs"]
mod common;
use common::{
    engine_with_sample_table, float_column, int_batch, int_column, sample_batch,
    string_column,
};

#[test]
fn test_count_star() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT COUNT(*) FROM t")?;
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.num_columns(), 1);
    assert_eq!(result.schema().field(0).name(), "EXPR$0");
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(3)]);
    Ok(())
}

#[test]
fn test_select_star() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT * FROM t")?;
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.num_columns(), 2);
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(1), Some(2), Some(3)]);
    assert_eq!(int_column(&batch, 1), vec![Some(10), Some(20), Some(30)]);
    Ok(())
}

#[test]
fn test_filtered_count() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT COUNT(*) FROM t WHERE a < 3")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(2)]);
    Ok(())
}

#[test]
fn test_explain_renders_physical_plan() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let text = engine.explain("SELECT COUNT(*) FROM t WHERE a < 3")?;
    assert!(text.starts_with("Physical plan"), "got: {}", text);
    assert!(text.contains("Scan"));
    assert!(text.contains("Filter"));
    assert!(text.contains("Aggregate"));
    Ok(())
}

#[test]
fn test_duplicate_import_rejected() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let err = engine
        .import_record_batch("t", &sample_batch(), None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Storage(StorageError::TableAlreadyExists(_))
    ));
    Ok(())
}

#[test]
fn test_aggregate_functions() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql(
        "SELECT SUM(b) AS s, MIN(b) AS lo, MAX(b) AS hi, AVG(b) AS mean FROM t",
    )?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(60)]);
    assert_eq!(int_column(&batch, 1), vec![Some(10)]);
    assert_eq!(int_column(&batch, 2), vec![Some(30)]);
    assert_eq!(float_column(&batch, 3), vec![Some(20.0)]);
    Ok(())
}

#[test]
fn test_group_by_with_order() -> Result<()> {
    let engine = emberdb::engine::init()?;
    let batch = int_batch(
        &["k", "v"],
        vec![
            vec![Some(1), Some(2), Some(1), Some(2), Some(1)],
            vec![Some(10), Some(20), Some(30), Some(40), Some(50)],
        ],
    );
    engine.import_record_batch("g", &batch, None)?;

    let result =
        engine.sql("SELECT k, COUNT(*) AS cnt, SUM(v) AS total FROM g GROUP BY k ORDER BY k")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(1), Some(2)]);
    assert_eq!(int_column(&batch, 1), vec![Some(3), Some(2)]);
    assert_eq!(int_column(&batch, 2), vec![Some(90), Some(60)]);
    Ok(())
}

#[test]
fn test_inner_join() -> Result<()> {
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    let engine = emberdb::engine::init()?;
    let emp = int_batch(
        &["id", "dept_id"],
        vec![
            vec![Some(1), Some(2), Some(3)],
            vec![Some(10), Some(20), Some(99)],
        ],
    );
    engine.import_record_batch("emp", &emp, None)?;

    let dept_schema = Arc::new(Schema::new(vec![
        Field::new("did", DataType::Int64, true),
        Field::new("dname", DataType::Utf8, true),
    ]));
    let dept = RecordBatch::try_new(dept_schema, vec![
        Arc::new(Int64Array::from(vec![10, 20])),
        Arc::new(StringArray::from(vec!["eng", "ops"])),
    ])?;
    engine.import_record_batch("dept", &dept, None)?;

    let result = engine.sql(
        "SELECT emp.id, dept.dname FROM emp \
         INNER JOIN dept ON emp.dept_id = dept.did ORDER BY id",
    )?;
    assert_eq!(result.row_count(), 2);
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(1), Some(2)]);
    assert_eq!(
        string_column(&batch, 1),
        vec![Some("eng".to_string()), Some("ops".to_string())]
    );
    Ok(())
}

#[test]
fn test_arithmetic_projection() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT a + b AS s FROM t ORDER BY s")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(11), Some(22), Some(33)]);
    Ok(())
}

#[test]
fn test_and_or_predicates() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT a FROM t WHERE a = 1 OR a = 3")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(1), Some(3)]);

    let result = engine.sql("SELECT a FROM t WHERE a > 1 AND b < 30")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(2)]);
    Ok(())
}

#[test]
fn test_null_handling() -> Result<()> {
    let engine = emberdb::engine::init()?;
    let batch = int_batch(&["a"], vec![vec![Some(1), None, Some(3)]]);
    engine.import_record_batch("n", &batch, None)?;

    let result = engine.sql("SELECT COUNT(*) FROM n WHERE a IS NULL")?;
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(1)]);

    // COUNT(column) skips NULLs, COUNT(*) does not.
    let result = engine.sql("SELECT COUNT(a) FROM n")?;
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(2)]);
    let result = engine.sql("SELECT COUNT(*) FROM n")?;
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(3)]);

    let result = engine.sql("SELECT a FROM n WHERE a IS NOT NULL")?;
    assert_eq!(
        int_column(&result.to_arrow()?, 0),
        vec![Some(1), Some(3)]
    );
    Ok(())
}

#[test]
fn test_order_by_null_placement() -> Result<()> {
    let engine = emberdb::engine::init()?;
    let batch = int_batch(&["a"], vec![vec![Some(1), None, Some(3)]]);
    engine.import_record_batch("pn", &batch, None)?;

    let result = engine.sql("SELECT a FROM pn ORDER BY a DESC NULLS FIRST")?;
    assert_eq!(
        int_column(&result.to_arrow()?, 0),
        vec![None, Some(3), Some(1)]
    );

    // Defaults: NULLS FIRST on DESC, NULLS LAST on ASC.
    let result = engine.sql("SELECT a FROM pn ORDER BY a DESC")?;
    assert_eq!(
        int_column(&result.to_arrow()?, 0),
        vec![None, Some(3), Some(1)]
    );
    let result = engine.sql("SELECT a FROM pn ORDER BY a")?;
    assert_eq!(
        int_column(&result.to_arrow()?, 0),
        vec![Some(1), Some(3), None]
    );
    let result = engine.sql("SELECT a FROM pn ORDER BY a ASC NULLS FIRST")?;
    assert_eq!(
        int_column(&result.to_arrow()?, 0),
        vec![None, Some(1), Some(3)]
    );
    Ok(())
}

#[test]
fn test_watchdog_time_limit() -> Result<()> {
    let engine = init_with_config(
        ConfigBuilder::new()
            .enable_watchdog(true)
            .watchdog_time_limit_ms(0),
    )?;
    engine.import_record_batch("t", &sample_batch(), None)?;
    let err = engine.sql("SELECT COUNT(*) FROM t").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Exec(ExecError::WatchdogTimeout { .. })
    ));
    Ok(())
}

#[test]
fn test_group_by_max_groups_bound() -> Result<()> {
    let engine = init_with_config(ConfigBuilder::new().max_groups(1))?;
    let batch = int_batch(&["k"], vec![vec![Some(1), Some(2)]]);
    engine.import_record_batch("g", &batch, None)?;
    let err = engine
        .sql("SELECT k, COUNT(*) FROM g GROUP BY k")
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Exec(ExecError::TooManyGroups { max_groups: 1 })
    ));
    Ok(())
}

#[test]
fn test_filter_pushdown_below_join() -> Result<()> {
    let load = |engine: &emberdb::engine::Engine| -> Result<()> {
        let emp = int_batch(
            &["id", "dept_id"],
            vec![
                vec![Some(1), Some(2), Some(3)],
                vec![Some(10), Some(20), Some(99)],
            ],
        );
        engine.import_record_batch("emp", &emp, None)?;
        let dept = int_batch(&["did"], vec![vec![Some(10), Some(20)]]);
        engine.import_record_batch("dept", &dept, None)?;
        Ok(())
    };
    let pushdown = init_with_config(ConfigBuilder::new().enable_filter_pushdown(true))?;
    let plain = emberdb::engine::init()?;
    load(&pushdown)?;
    load(&plain)?;

    let sql = "SELECT emp.id, dept.did FROM emp \
               INNER JOIN dept ON emp.dept_id = dept.did \
               WHERE emp.id > 1 AND dept.did < 30 ORDER BY id";

    // With pushdown the filters sit below the join, one per side.
    let pushed = pushdown.explain(sql)?;
    let join_at = pushed.find("InnerJoin").expect("join missing from plan");
    let filter_at = pushed.find("Filter").expect("filter missing from plan");
    assert!(filter_at > join_at, "plan:\n{}", pushed);
    assert_eq!(pushed.matches("Filter").count(), 2, "plan:\n{}", pushed);

    // Without pushdown the single filter sits above the join.
    let unpushed = plain.explain(sql)?;
    assert!(
        unpushed.find("Filter").unwrap() < unpushed.find("InnerJoin").unwrap(),
        "plan:\n{}",
        unpushed
    );

    // Both plans produce the same rows.
    assert_eq!(
        int_column(&pushdown.sql(sql)?.to_arrow()?, 0),
        int_column(&plain.sql(sql)?.to_arrow()?, 0)
    );
    assert_eq!(
        int_column(&pushdown.sql(sql)?.to_arrow()?, 0),
        vec![Some(2)]
    );
    Ok(())
}

#[test]
fn test_order_by_desc_limit_offset() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT a FROM t ORDER BY a DESC LIMIT 2 OFFSET 1")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(2), Some(1)]);
    Ok(())
}

#[test]
fn test_empty_result() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let result = engine.sql("SELECT a FROM t WHERE a > 100")?;
    assert_eq!(result.row_count(), 0);
    let batch = result.to_arrow()?;
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 1);
    Ok(())
}

#[test]
fn test_unsupported_statements_rejected() -> Result<()> {
    let engine = engine_with_sample_table()?;
    for sql in [
        "DELETE FROM t",
        "INSERT INTO t VALUES (4, 40)",
        "SELECT DISTINCT a FROM t",
        "SELECT a FROM t WHERE a IN (SELECT a FROM t)",
    ] {
        let err = engine.sql(sql).unwrap_err();
        assert!(
            matches!(
                err,
                EngineError::Sql(SqlError::Unsupported(_) | SqlError::Parse(_))
            ),
            "expected rejection for: {}",
            sql
        );
    }
    Ok(())
}

#[test]
fn test_multi_fragment_table() -> Result<()> {
    use emberdb::storage::TableOptions;

    let engine = emberdb::engine::init()?;
    let values: Vec<Option<i64>> = (0..100).map(Some).collect();
    let batch = int_batch(&["v"], vec![values]);
    let info = engine.import_record_batch("big", &batch, Some(TableOptions::new(7)))?;
    assert_eq!(info.fragment_count, 15);

    let result = engine.sql("SELECT SUM(v) AS s, COUNT(*) AS c FROM big")?;
    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(4950)]);
    assert_eq!(int_column(&batch, 1), vec![Some(100)]);
    Ok(())
}
