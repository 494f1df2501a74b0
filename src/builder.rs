// Query Builder
//
// Programmatic alternative to the SQL front-end. Plans are composed node
// by node against the live table schemas, so column names are checked at
// build time rather than at execution.

use std::sync::Arc;

use arrow::datatypes::SchemaRef;

use crate::common::Datum;
use crate::config::Config;
use crate::exec::functions;
use crate::sql::relalg::{AggExpr, BinOp, Expr, RelAlgNode, RelAlgPlan, SortKey};
use crate::sql::SqlError;
use crate::storage::ArrowStorage;

/// Entry point for composing plans without SQL.
pub struct QueryBuilder {
    storage: Arc<ArrowStorage>,
    #[allow(dead_code)]
    config: Arc<Config>,
}

impl QueryBuilder {
    pub fn new(storage: Arc<ArrowStorage>, config: Arc<Config>) -> Self {
        QueryBuilder { storage, config }
    }

    /// Start a plan from a table scan.
    pub fn scan(&self, table: &str) -> Result<BuilderNode, SqlError> {
        let schema = self
            .storage
            .table_schema(table)
            .ok_or_else(|| SqlError::TableNotFound(table.to_string()))?;
        Ok(BuilderNode {
            node: RelAlgNode::Scan {
                table: table.to_string(),
                schema,
            },
        })
    }
}

/// A partially built plan. Each combinator consumes the node and returns
/// the extended one.
pub struct BuilderNode {
    node: RelAlgNode,
}

impl BuilderNode {
    fn schema(&self) -> SchemaRef {
        self.node.schema()
    }

    fn resolve(&self, name: &str) -> Result<usize, SqlError> {
        self.schema()
            .fields()
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| SqlError::ColumnNotFound(name.to_string()))
    }

    /// Reference a column of this node for use in `filter`.
    pub fn col(&self, name: &str) -> Result<BuilderExpr, SqlError> {
        let index = self.resolve(name)?;
        let name = self.schema().field(index).name().clone();
        Ok(BuilderExpr {
            expr: Expr::column(index, name),
        })
    }

    /// Keep only the named columns, in the given order.
    pub fn proj(self, columns: &[&str]) -> Result<BuilderNode, SqlError> {
        let mut exprs = Vec::with_capacity(columns.len());
        let mut names = Vec::with_capacity(columns.len());
        for name in columns {
            let index = self.resolve(name)?;
            let name = self.schema().field(index).name().clone();
            exprs.push(Expr::column(index, name.clone()));
            names.push(name);
        }
        Ok(BuilderNode {
            node: RelAlgNode::Project {
                input: Box::new(self.node),
                exprs,
                names,
            },
        })
    }

    pub fn filter(self, predicate: BuilderExpr) -> BuilderNode {
        BuilderNode {
            node: RelAlgNode::Filter {
                input: Box::new(self.node),
                predicate: predicate.expr,
            },
        }
    }

    /// Group by the named columns and compute the given aggregates.
    ///
    /// Aggregates are spelled `"count"`, `"count(a)"`, `"sum(b)"` and so
    /// on; the output column for `sum(b)` is named `b_sum`.
    pub fn agg(self, group_keys: &[&str], aggs: &[&str]) -> Result<BuilderNode, SqlError> {
        let mut group_by = Vec::with_capacity(group_keys.len());
        for name in group_keys {
            group_by.push(self.resolve(name)?);
        }
        let mut agg_exprs = Vec::with_capacity(aggs.len());
        for spec in aggs {
            agg_exprs.push(self.parse_agg(spec)?);
        }
        if agg_exprs.is_empty() {
            return Err(SqlError::Invalid(
                "at least one aggregate is required".to_string(),
            ));
        }
        Ok(BuilderNode {
            node: RelAlgNode::Aggregate {
                input: Box::new(self.node),
                group_by,
                aggs: agg_exprs,
            },
        })
    }

    fn parse_agg(&self, spec: &str) -> Result<AggExpr, SqlError> {
        let spec = spec.trim();
        let (func_name, arg_name) = match spec.split_once('(') {
            Some((func, rest)) => {
                let inner = rest
                    .strip_suffix(')')
                    .ok_or_else(|| {
                        SqlError::Invalid(format!("malformed aggregate: {}", spec))
                    })?
                    .trim();
                (func.trim(), Some(inner))
            }
            None => (spec, None),
        };
        let func = functions::lookup_aggregate(func_name)
            .ok_or_else(|| SqlError::Unsupported(format!("function {}", func_name)))?;
        let (arg, name) = match arg_name {
            None | Some("") | Some("*") => (None, func_name.to_lowercase()),
            Some(column) => {
                let index = self.resolve(column)?;
                let column = self.schema().field(index).name().clone();
                let name = format!("{}_{}", column, func_name.to_lowercase());
                (Some(index), name)
            }
        };
        Ok(AggExpr { func, arg, name })
    }

    /// Sort by the named columns; `descending` per key.
    pub fn sort(self, keys: &[(&str, bool)]) -> Result<BuilderNode, SqlError> {
        let mut sort_keys = Vec::with_capacity(keys.len());
        for &(name, descending) in keys {
            sort_keys.push(SortKey {
                index: self.resolve(name)?,
                descending,
                nulls_first: descending,
            });
        }
        Ok(BuilderNode {
            node: RelAlgNode::Sort {
                input: Box::new(self.node),
                keys: sort_keys,
            },
        })
    }

    pub fn limit(self, limit: Option<usize>, offset: usize) -> BuilderNode {
        BuilderNode {
            node: RelAlgNode::Limit {
                input: Box::new(self.node),
                limit,
                offset,
            },
        }
    }

    pub fn finish(self) -> RelAlgPlan {
        RelAlgPlan::new(self.node)
    }
}

/// Expression handle used for filter predicates.
#[derive(Debug, Clone)]
pub struct BuilderExpr {
    expr: Expr,
}

impl BuilderExpr {
    fn binary(self, op: BinOp, other: impl Into<BuilderExpr>) -> BuilderExpr {
        BuilderExpr {
            expr: Expr::binary(op, self.expr, other.into().expr),
        }
    }

    pub fn eq(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::Eq, other)
    }

    pub fn ne(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::NotEq, other)
    }

    pub fn lt(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::Lt, other)
    }

    pub fn le(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::LtEq, other)
    }

    pub fn gt(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::Gt, other)
    }

    pub fn ge(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::GtEq, other)
    }

    pub fn and(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::And, other)
    }

    pub fn or(self, other: impl Into<BuilderExpr>) -> BuilderExpr {
        self.binary(BinOp::Or, other)
    }

    pub fn not(self) -> BuilderExpr {
        BuilderExpr {
            expr: Expr::Not(Box::new(self.expr)),
        }
    }

    pub fn is_null(self) -> BuilderExpr {
        BuilderExpr {
            expr: Expr::IsNull {
                expr: Box::new(self.expr),
                negated: false,
            },
        }
    }

    pub fn is_not_null(self) -> BuilderExpr {
        BuilderExpr {
            expr: Expr::IsNull {
                expr: Box::new(self.expr),
                negated: true,
            },
        }
    }
}

impl From<i64> for BuilderExpr {
    fn from(value: i64) -> Self {
        BuilderExpr {
            expr: Expr::Literal(Datum::Int(value)),
        }
    }
}

impl From<f64> for BuilderExpr {
    fn from(value: f64) -> Self {
        BuilderExpr {
            expr: Expr::Literal(Datum::Float(value)),
        }
    }
}

impl From<&str> for BuilderExpr {
    fn from(value: &str) -> Self {
        BuilderExpr {
            expr: Expr::Literal(Datum::Str(value.to_string())),
        }
    }
}

impl From<bool> for BuilderExpr {
    fn from(value: bool) -> Self {
        BuilderExpr {
            expr: Expr::Literal(Datum::Bool(value)),
        }
    }
}
