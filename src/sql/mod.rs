// SQL Processing Module
//
// This module contains the SQL-to-relational-algebra compiler and the
// executor front-end that runs compiled plans.

pub mod executor;
pub mod parser;
pub mod relalg;

pub use executor::{ExecutionResult, RelAlgExecutor};
pub use parser::SqlCompiler;
pub use relalg::{AggExpr, AggFunc, BinOp, Expr, RelAlgNode, RelAlgPlan, SortKey};

use thiserror::Error;

/// Errors raised while compiling SQL into a relational-algebra plan.
#[derive(Error, Debug)]
pub enum SqlError {
    #[error("parse error: {0}")]
    Parse(#[from] sqlparser::parser::ParserError),
    #[error("unsupported SQL feature: {0}")]
    Unsupported(String),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("ambiguous column reference: {0}")]
    AmbiguousColumn(String),
    #[error("invalid query: {0}")]
    Invalid(String),
}
