// Arrow-backed Columnar Storage
//
// Imported record batches are validated against the supported logical types
// and split into fixed-size fragments (zero-copy slices). Fragments are the
// scan granularity of the executor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parking_lot::RwLock;

use super::data_mgr::DataProvider;
use super::schema::{TableInfo, TypeKind};
use super::StorageError;
use crate::config::DEFAULT_FRAGMENT_SIZE;

/// Per-import options.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Maximum number of rows per fragment.
    pub fragment_size: usize,
}

impl TableOptions {
    pub fn new(fragment_size: usize) -> Self {
        TableOptions { fragment_size }
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            fragment_size: DEFAULT_FRAGMENT_SIZE,
        }
    }
}

struct TableEntry {
    info: TableInfo,
    fragments: Vec<RecordBatch>,
}

/// In-memory columnar table store.
pub struct ArrowStorage {
    schema_id: u32,
    tables: RwLock<HashMap<String, TableEntry>>,
    table_id_counter: AtomicU32,
}

impl ArrowStorage {
    pub fn new(schema_id: u32) -> Self {
        ArrowStorage {
            schema_id,
            tables: RwLock::new(HashMap::new()),
            table_id_counter: AtomicU32::new(1),
        }
    }

    pub fn schema_id(&self) -> u32 {
        self.schema_id
    }

    /// Import a record batch as a new table.
    pub fn import_record_batch(
        &self,
        batch: &RecordBatch,
        name: &str,
        options: &TableOptions,
    ) -> Result<TableInfo, StorageError> {
        self.import_record_batches(std::slice::from_ref(batch), name, options)
    }

    /// Import a sequence of record batches sharing one schema as a new table.
    pub fn import_record_batches(
        &self,
        batches: &[RecordBatch],
        name: &str,
        options: &TableOptions,
    ) -> Result<TableInfo, StorageError> {
        if options.fragment_size == 0 {
            return Err(StorageError::InvalidOptions(
                "fragment_size must be positive".to_string(),
            ));
        }
        let schema = validate_batches(batches)?;

        let mut fragments = Vec::new();
        let mut row_count = 0;
        for batch in batches {
            row_count += batch.num_rows();
            fragments.extend(split_into_fragments(batch, options.fragment_size));
        }

        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(StorageError::TableAlreadyExists(name.to_string()));
        }
        let info = TableInfo {
            id: self.table_id_counter.fetch_add(1, Ordering::SeqCst),
            schema_id: self.schema_id,
            name: name.to_string(),
            schema,
            row_count,
            fragment_count: fragments.len(),
        };
        log::debug!(
            "imported table {} ({} rows, {} fragments)",
            name,
            row_count,
            fragments.len()
        );
        tables.insert(name.to_string(), TableEntry {
            info: info.clone(),
            fragments,
        });
        Ok(info)
    }

    /// Append a batch to an existing table. The import-time fragment size is
    /// not tracked, so the appended rows become one new fragment.
    pub fn append_record_batch(
        &self,
        batch: &RecordBatch,
        name: &str,
    ) -> Result<TableInfo, StorageError> {
        let mut tables = self.tables.write();
        let entry = tables
            .get_mut(name)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))?;
        if batch.schema() != entry.info.schema {
            return Err(StorageError::SchemaMismatch(format!(
                "append to table {} with a different schema",
                name
            )));
        }
        if batch.num_rows() > 0 {
            entry.fragments.push(batch.clone());
        }
        entry.info.row_count += batch.num_rows();
        entry.info.fragment_count = entry.fragments.len();
        Ok(entry.info.clone())
    }

    pub fn drop_table(&self, name: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.write();
        tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))
    }

    pub fn table_schema(&self, name: &str) -> Option<SchemaRef> {
        self.tables.read().get(name).map(|e| e.info.schema.clone())
    }
}

impl DataProvider for ArrowStorage {
    fn schema_id(&self) -> u32 {
        self.schema_id
    }

    fn table_info(&self, name: &str) -> Option<TableInfo> {
        self.tables.read().get(name).map(|e| e.info.clone())
    }

    fn fetch_fragments(&self, name: &str) -> Result<Vec<RecordBatch>, StorageError> {
        self.tables
            .read()
            .get(name)
            .map(|e| e.fragments.clone())
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))
    }

    fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn validate_batches(batches: &[RecordBatch]) -> Result<SchemaRef, StorageError> {
    let first = batches
        .first()
        .ok_or_else(|| StorageError::SchemaMismatch("no batches to import".to_string()))?;
    let schema = first.schema();
    for field in schema.fields() {
        TypeKind::from_arrow(field.name(), field.data_type())?;
    }
    for batch in &batches[1..] {
        if batch.schema() != schema {
            return Err(StorageError::SchemaMismatch(
                "imported batches must share one schema".to_string(),
            ));
        }
    }
    Ok(schema)
}

fn split_into_fragments(batch: &RecordBatch, fragment_size: usize) -> Vec<RecordBatch> {
    let mut fragments = Vec::new();
    let mut offset = 0;
    while offset < batch.num_rows() {
        let len = fragment_size.min(batch.num_rows() - offset);
        fragments.push(batch.slice(offset, len));
        offset += len;
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};

    fn test_batch(rows: i64) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int64, true)]));
        let values: Vec<i64> = (0..rows).collect();
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    #[test]
    fn test_fragment_split() {
        let storage = ArrowStorage::new(1);
        let info = storage
            .import_record_batch(&test_batch(5), "t", &TableOptions::new(2))
            .unwrap();
        assert_eq!(info.row_count, 5);
        assert_eq!(info.fragment_count, 3);
        let fragments = storage.fetch_fragments("t").unwrap();
        assert_eq!(
            fragments.iter().map(|f| f.num_rows()).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
    }

    #[test]
    fn test_duplicate_import_rejected() {
        let storage = ArrowStorage::new(1);
        storage
            .import_record_batch(&test_batch(3), "t", &TableOptions::new(2))
            .unwrap();
        let err = storage
            .import_record_batch(&test_batch(3), "t", &TableOptions::new(2))
            .unwrap_err();
        assert!(matches!(err, StorageError::TableAlreadyExists(_)));
    }

    #[test]
    fn test_zero_fragment_size_rejected() {
        let storage = ArrowStorage::new(1);
        let err = storage
            .import_record_batch(&test_batch(3), "t", &TableOptions::new(0))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidOptions(_)));
    }

    #[test]
    fn test_append_and_drop() {
        let storage = ArrowStorage::new(1);
        storage
            .import_record_batch(&test_batch(3), "t", &TableOptions::new(10))
            .unwrap();
        let info = storage.append_record_batch(&test_batch(2), "t").unwrap();
        assert_eq!(info.row_count, 5);
        assert_eq!(info.fragment_count, 2);

        storage.drop_table("t").unwrap();
        assert!(storage.table_info("t").is_none());
        assert!(matches!(
            storage.drop_table("t"),
            Err(StorageError::TableNotFound(_))
        ));
    }
}
