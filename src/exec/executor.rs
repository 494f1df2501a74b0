// Query Execution Engine
//
// Compiles relational-algebra plans into operator trees and drains them,
// enforcing the watchdog while doing so.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arrow::record_batch::RecordBatch;

use super::operators::aggregate::HashAggregateOperator;
use super::operators::filter::FilterOperator;
use super::operators::join::HashJoinOperator;
use super::operators::limit::LimitOperator;
use super::operators::project::ProjectOperator;
use super::operators::scan::ScanOperator;
use super::operators::sort::SortOperator;
use super::operators::Operator;
use super::ExecError;
use crate::config::{Config, WatchdogConfig};
use crate::sql::relalg::{RelAlgNode, RelAlgPlan};
use crate::storage::DataMgr;

/// Deadline guard threaded through the operator tree. Pipeline breakers
/// consult it inside their consume loops, so a runaway query fails while
/// it is still accumulating input, not only between output batches.
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    deadline: Option<Instant>,
    limit_ms: u64,
}

impl Watchdog {
    pub fn new(config: &WatchdogConfig) -> Self {
        let deadline = config
            .enable
            .then(|| Instant::now() + Duration::from_millis(config.time_limit_ms));
        Watchdog {
            deadline,
            limit_ms: config.time_limit_ms,
        }
    }

    /// Fail once the configured time limit has passed.
    pub fn check(&self) -> Result<(), ExecError> {
        match self.deadline {
            Some(deadline) if Instant::now() > deadline => Err(ExecError::WatchdogTimeout {
                limit_ms: self.limit_ms,
            }),
            _ => Ok(()),
        }
    }
}

/// Executes relational-algebra plans against the data manager's tables.
pub struct Executor {
    data_mgr: Arc<DataMgr>,
    config: Arc<Config>,
}

impl Executor {
    pub fn new(data_mgr: Arc<DataMgr>, config: Arc<Config>) -> Self {
        Executor { data_mgr, config }
    }

    pub fn data_mgr(&self) -> &Arc<DataMgr> {
        &self.data_mgr
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Run a plan to completion and collect its output batches.
    pub fn execute_plan(&self, plan: &RelAlgPlan) -> Result<Vec<RecordBatch>, ExecError> {
        let watchdog = Watchdog::new(&self.config.exec.watchdog);
        let mut root = self.build_operator(&plan.root, watchdog)?;
        let started = Instant::now();
        let mut batches = Vec::new();
        while let Some(batch) = root.next_batch()? {
            watchdog.check()?;
            batches.push(batch);
        }
        log::debug!(
            "plan executed in {:?}, {} output batches",
            started.elapsed(),
            batches.len()
        );
        Ok(batches)
    }

    fn build_operator(
        &self,
        node: &RelAlgNode,
        watchdog: Watchdog,
    ) -> Result<Box<dyn Operator>, ExecError> {
        match node {
            RelAlgNode::Scan { table, .. } => {
                let (info, fragments) = self.data_mgr.fetch_table(table)?;
                Ok(Box::new(ScanOperator::new(info.schema, fragments)))
            }
            RelAlgNode::Filter { input, predicate } => {
                let input = self.build_operator(input, watchdog)?;
                Ok(Box::new(FilterOperator::new(input, predicate.clone())))
            }
            RelAlgNode::Project { input, exprs, .. } => {
                let schema = node.schema();
                let input = self.build_operator(input, watchdog)?;
                Ok(Box::new(ProjectOperator::new(input, exprs.clone(), schema)))
            }
            RelAlgNode::Aggregate {
                input,
                group_by,
                aggs,
            } => {
                let schema = node.schema();
                let input = self.build_operator(input, watchdog)?;
                Ok(Box::new(HashAggregateOperator::new(
                    input,
                    group_by.clone(),
                    aggs.clone(),
                    schema,
                    self.config.exec.group_by.max_groups,
                    watchdog,
                )))
            }
            RelAlgNode::Join {
                left,
                right,
                left_keys,
                right_keys,
            } => {
                let schema = node.schema();
                let left = self.build_operator(left, watchdog)?;
                let right = self.build_operator(right, watchdog)?;
                Ok(Box::new(HashJoinOperator::new(
                    left,
                    right,
                    left_keys.clone(),
                    right_keys.clone(),
                    schema,
                    watchdog,
                )))
            }
            RelAlgNode::Sort { input, keys } => {
                let input = self.build_operator(input, watchdog)?;
                Ok(Box::new(SortOperator::new(input, keys.clone(), watchdog)))
            }
            RelAlgNode::Limit {
                input,
                limit,
                offset,
            } => {
                let input = self.build_operator(input, watchdog)?;
                Ok(Box::new(LimitOperator::new(input, *limit, *offset)))
            }
        }
    }
}
