// Engine Facade
//
// Wires process initialization, configuration, storage, and execution into
// one handle. `init()` is the usual entry point; everything an embedder
// needs hangs off the returned `Engine`.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use thiserror::Error;

use crate::builder::QueryBuilder;
use crate::config::{Config, ConfigBuilder};
use crate::exec::executor::Executor;
use crate::exec::ExecError;
use crate::init::{self, InitError};
use crate::sql::executor::{ExecutionResult, RelAlgExecutor};
use crate::sql::parser::SqlCompiler;
use crate::sql::relalg::RelAlgPlan;
use crate::sql::SqlError;
use crate::storage::arrow_storage::{ArrowStorage, TableOptions};
use crate::storage::data_mgr::DataMgr;
use crate::storage::schema::TableInfo;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Sql(#[from] SqlError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Create an engine with default configuration.
pub fn init() -> Result<Engine, EngineError> {
    init_with_config(ConfigBuilder::new())
}

/// Create an engine from a configuration builder.
pub fn init_with_config(builder: ConfigBuilder) -> Result<Engine, EngineError> {
    init::initialize()?;
    let config = builder.build();

    let storage = Arc::new(ArrowStorage::new(1));
    let data_mgr = Arc::new(DataMgr::new(config.clone()));
    data_mgr.register_data_provider(storage.clone())?;
    let executor = Arc::new(Executor::new(data_mgr.clone(), config.clone()));

    Ok(Engine {
        config,
        storage,
        data_mgr,
        executor,
    })
}

/// A fully wired engine instance. Cheap to clone the inner handles via the
/// accessors; the engine itself owns nothing the components don't share.
pub struct Engine {
    config: Arc<Config>,
    storage: Arc<ArrowStorage>,
    data_mgr: Arc<DataMgr>,
    executor: Arc<Executor>,
}

impl Engine {
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn storage(&self) -> &Arc<ArrowStorage> {
        &self.storage
    }

    pub fn data_mgr(&self) -> &Arc<DataMgr> {
        &self.data_mgr
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// Import a record batch as a new table. Without explicit options the
    /// configured default fragment size applies.
    pub fn import_record_batch(
        &self,
        name: &str,
        batch: &RecordBatch,
        options: Option<TableOptions>,
    ) -> Result<TableInfo, EngineError> {
        let options = options.unwrap_or(TableOptions {
            fragment_size: self.config.storage.default_fragment_size,
        });
        Ok(self.storage.import_record_batch(batch, name, &options)?)
    }

    /// Compile and run a SELECT statement.
    pub fn sql(&self, query: &str) -> Result<ExecutionResult, EngineError> {
        let compiler = SqlCompiler::new(self.storage.clone(), self.config.clone());
        let plan = compiler.process(query)?;
        let runner = RelAlgExecutor::new(self.executor.clone(), plan);
        Ok(runner.execute()?)
    }

    /// Compile a SELECT statement and render its physical plan.
    pub fn explain(&self, query: &str) -> Result<String, EngineError> {
        let compiler = SqlCompiler::new(self.storage.clone(), self.config.clone());
        let plan = compiler.process(query)?;
        Ok(plan.explain())
    }

    /// Start a programmatic query against this engine's storage.
    pub fn builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.storage.clone(), self.config.clone())
    }

    /// Run an already built plan.
    pub fn execute_plan(&self, plan: RelAlgPlan) -> Result<ExecutionResult, EngineError> {
        let runner = RelAlgExecutor::new(self.executor.clone(), plan);
        Ok(runner.execute()?)
    }
}
