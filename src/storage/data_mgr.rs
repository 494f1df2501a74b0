// Data Manager
//
// Registry of data providers keyed by schema id. The executor resolves
// table names through the manager so alternative providers can back tables
// without the execution layer knowing about them.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use parking_lot::RwLock;

use super::schema::TableInfo;
use super::StorageError;
use crate::config::Config;

/// A source of columnar table data.
pub trait DataProvider: Send + Sync {
    fn schema_id(&self) -> u32;
    fn table_info(&self, name: &str) -> Option<TableInfo>;
    fn fetch_fragments(&self, name: &str) -> Result<Vec<RecordBatch>, StorageError>;
    fn list_tables(&self) -> Vec<String>;
}

/// Routes table lookups to registered providers.
pub struct DataMgr {
    config: Arc<Config>,
    providers: RwLock<BTreeMap<u32, Arc<dyn DataProvider>>>,
}

impl DataMgr {
    pub fn new(config: Arc<Config>) -> Self {
        DataMgr {
            config,
            providers: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Register a provider under its schema id. Ids must be unique.
    pub fn register_data_provider(
        &self,
        provider: Arc<dyn DataProvider>,
    ) -> Result<(), StorageError> {
        let mut providers = self.providers.write();
        let schema_id = provider.schema_id();
        if providers.contains_key(&schema_id) {
            return Err(StorageError::ProviderAlreadyRegistered(schema_id));
        }
        providers.insert(schema_id, provider);
        Ok(())
    }

    /// Look up a table across all providers, in schema-id order.
    pub fn table_info(&self, name: &str) -> Option<TableInfo> {
        self.providers
            .read()
            .values()
            .find_map(|p| p.table_info(name))
    }

    /// Fetch a table's descriptor and fragments.
    pub fn fetch_table(&self, name: &str) -> Result<(TableInfo, Vec<RecordBatch>), StorageError> {
        let providers = self.providers.read();
        for provider in providers.values() {
            if let Some(info) = provider.table_info(name) {
                let fragments = provider.fetch_fragments(name)?;
                return Ok((info, fragments));
            }
        }
        Err(StorageError::TableNotFound(name.to_string()))
    }

    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .read()
            .values()
            .flat_map(|p| p.list_tables())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
