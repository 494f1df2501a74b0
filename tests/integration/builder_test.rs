// Programmatic query-builder tests.

use anyhow::Result;

#[path = "../common/mod.rs"]
mod common;
use common::{engine_with_sample_table, float_column, int_batch, int_column};

#[test]
fn test_scan_and_count() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let plan = engine
        .builder()
        .scan("t")?
        .agg(&[], &["count"])?
        .finish();
    let result = engine.execute_plan(plan)?;
    assert_eq!(result.schema().field(0).name(), "count");
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(3)]);
    Ok(())
}

#[test]
fn test_filter_and_project() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let scan = engine.builder().scan("t")?;
    let predicate = scan.col("a")?.lt(3).and(scan.col("b")?.gt(10));
    let plan = scan.filter(predicate).proj(&["b"])?.finish();
    let result = engine.execute_plan(plan)?;
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(20)]);
    Ok(())
}

#[test]
fn test_group_by_aggregates() -> Result<()> {
    let engine = emberdb::engine::init()?;
    let batch = int_batch(
        &["k", "v"],
        vec![
            vec![Some(1), Some(2), Some(1)],
            vec![Some(10), Some(20), Some(30)],
        ],
    );
    engine.import_record_batch("g", &batch, None)?;

    let plan = engine
        .builder()
        .scan("g")?
        .agg(&["k"], &["count", "sum(v)", "avg(v)"])?
        .sort(&[("k", false)])?
        .finish();
    let result = engine.execute_plan(plan)?;
    let schema = result.schema();
    assert_eq!(schema.field(1).name(), "count");
    assert_eq!(schema.field(2).name(), "v_sum");
    assert_eq!(schema.field(3).name(), "v_avg");

    let batch = result.to_arrow()?;
    assert_eq!(int_column(&batch, 0), vec![Some(1), Some(2)]);
    assert_eq!(int_column(&batch, 1), vec![Some(2), Some(1)]);
    assert_eq!(int_column(&batch, 2), vec![Some(40), Some(20)]);
    assert_eq!(float_column(&batch, 3), vec![Some(20.0), Some(20.0)]);
    Ok(())
}

#[test]
fn test_sort_desc_and_limit() -> Result<()> {
    let engine = engine_with_sample_table()?;
    let plan = engine
        .builder()
        .scan("t")?
        .sort(&[("a", true)])?
        .proj(&["a"])?
        .limit(Some(2), 0)
        .finish();
    let result = engine.execute_plan(plan)?;
    assert_eq!(int_column(&result.to_arrow()?, 0), vec![Some(3), Some(2)]);
    Ok(())
}

#[test]
fn test_builder_matches_sql() -> Result<()> {
    let engine = engine_with_sample_table()?;

    let scan = engine.builder().scan("t")?;
    let predicate = scan.col("a")?.lt(3);
    let plan = scan.filter(predicate).agg(&[], &["count"])?.finish();
    let built = engine.execute_plan(plan)?;

    let sql = engine.sql("SELECT COUNT(*) FROM t WHERE a < 3")?;
    assert_eq!(
        int_column(&built.to_arrow()?, 0),
        int_column(&sql.to_arrow()?, 0)
    );
    Ok(())
}
