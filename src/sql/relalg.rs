// Relational Algebra Plan
//
// The plan produced by the SQL compiler and the query builder, consumed by
// the executor. Column references are bound to positional indices in the
// input node's schema, so execution never resolves names.

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

use crate::common::Datum;

/// Binary operators over expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Eq => "=",
            BinOp::NotEq => "<>",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
        };
        write!(f, "{}", symbol)
    }
}

/// Scalar expression over the input node's columns.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Bound column reference. `name` is carried for display only.
    Column { index: usize, name: String },
    Literal(Datum),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull { expr: Box<Expr>, negated: bool },
}

impl Expr {
    pub fn column(index: usize, name: impl Into<String>) -> Expr {
        Expr::Column {
            index,
            name: name.into(),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Result type of this expression against `input`.
    pub fn data_type(&self, input: &Schema) -> DataType {
        match self {
            Expr::Column { index, .. } => input.field(*index).data_type().clone(),
            // Bare NULL literals materialize as Int64 arrays.
            Expr::Literal(datum) => datum.data_type().unwrap_or(DataType::Int64),
            Expr::Binary { op, left, right } => {
                if op.is_comparison() || op.is_logical() {
                    DataType::Boolean
                } else {
                    let lt = left.data_type(input);
                    let rt = right.data_type(input);
                    if lt == DataType::Float64 || rt == DataType::Float64 {
                        DataType::Float64
                    } else {
                        DataType::Int64
                    }
                }
            }
            Expr::Not(_) | Expr::IsNull { .. } => DataType::Boolean,
        }
    }

    /// Column indices this expression references.
    pub fn referenced_columns(&self, out: &mut Vec<usize>) {
        match self {
            Expr::Column { index, .. } => out.push(*index),
            Expr::Literal(_) => {}
            Expr::Binary { left, right, .. } => {
                left.referenced_columns(out);
                right.referenced_columns(out);
            }
            Expr::Not(inner) => inner.referenced_columns(out),
            Expr::IsNull { expr, .. } => expr.referenced_columns(out),
        }
    }

    /// Rewrite column indices through `mapping` (old index -> new index).
    pub fn remap_columns(&self, mapping: &dyn Fn(usize) -> usize) -> Expr {
        match self {
            Expr::Column { index, name } => Expr::Column {
                index: mapping(*index),
                name: name.clone(),
            },
            Expr::Literal(datum) => Expr::Literal(datum.clone()),
            Expr::Binary { op, left, right } => Expr::Binary {
                op: *op,
                left: Box::new(left.remap_columns(mapping)),
                right: Box::new(right.remap_columns(mapping)),
            },
            Expr::Not(inner) => Expr::Not(Box::new(inner.remap_columns(mapping))),
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: Box::new(expr.remap_columns(mapping)),
                negated: *negated,
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column { name, index } => write!(f, "{}#{}", name, index),
            Expr::Literal(datum) => write!(f, "{}", datum),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Not(inner) => write!(f, "NOT {}", inner),
            Expr::IsNull { expr, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", expr)
                } else {
                    write!(f, "{} IS NULL", expr)
                }
            }
        }
    }
}

/// Aggregate functions known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl AggFunc {
    pub fn name(self) -> &'static str {
        match self {
            AggFunc::Count => "count",
            AggFunc::Sum => "sum",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Avg => "avg",
        }
    }

    /// Output type given the argument's type (`None` for COUNT(*)).
    pub fn output_type(self, arg: Option<&DataType>) -> DataType {
        match self {
            AggFunc::Count => DataType::Int64,
            AggFunc::Avg => DataType::Float64,
            AggFunc::Sum | AggFunc::Min | AggFunc::Max => {
                arg.cloned().unwrap_or(DataType::Int64)
            }
        }
    }
}

/// One aggregate in an Aggregate node. `arg == None` means COUNT(*).
#[derive(Debug, Clone)]
pub struct AggExpr {
    pub func: AggFunc,
    pub arg: Option<usize>,
    pub name: String,
}

impl fmt::Display for AggExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            Some(index) => write!(f, "{}(#{})", self.func.name().to_uppercase(), index),
            None => write!(f, "{}(*)", self.func.name().to_uppercase()),
        }
    }
}

/// One sort key of a Sort node.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub index: usize,
    pub descending: bool,
    pub nulls_first: bool,
}

/// A node of the relational-algebra plan.
#[derive(Debug, Clone)]
pub enum RelAlgNode {
    Scan {
        table: String,
        schema: SchemaRef,
    },
    Filter {
        input: Box<RelAlgNode>,
        predicate: Expr,
    },
    Project {
        input: Box<RelAlgNode>,
        exprs: Vec<Expr>,
        names: Vec<String>,
    },
    Aggregate {
        input: Box<RelAlgNode>,
        group_by: Vec<usize>,
        aggs: Vec<AggExpr>,
    },
    /// Inner equi-join; key vectors are parallel.
    Join {
        left: Box<RelAlgNode>,
        right: Box<RelAlgNode>,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
    },
    Sort {
        input: Box<RelAlgNode>,
        keys: Vec<SortKey>,
    },
    Limit {
        input: Box<RelAlgNode>,
        limit: Option<usize>,
        offset: usize,
    },
}

impl RelAlgNode {
    /// Output schema of this node.
    pub fn schema(&self) -> SchemaRef {
        match self {
            RelAlgNode::Scan { schema, .. } => schema.clone(),
            RelAlgNode::Filter { input, .. }
            | RelAlgNode::Sort { input, .. }
            | RelAlgNode::Limit { input, .. } => input.schema(),
            RelAlgNode::Project { input, exprs, names } => {
                let input_schema = input.schema();
                let fields: Vec<Field> = exprs
                    .iter()
                    .zip(names.iter())
                    .map(|(expr, name)| match expr {
                        // Plain column projections keep the source field type
                        // and nullability.
                        Expr::Column { index, .. } => {
                            input_schema.field(*index).clone().with_name(name)
                        }
                        _ => Field::new(name, expr.data_type(&input_schema), true),
                    })
                    .collect();
                Arc::new(Schema::new(fields))
            }
            RelAlgNode::Aggregate {
                input,
                group_by,
                aggs,
            } => {
                let input_schema = input.schema();
                let mut fields: Vec<Field> = group_by
                    .iter()
                    .map(|&index| input_schema.field(index).clone())
                    .collect();
                for agg in aggs {
                    let arg_type = agg.arg.map(|i| input_schema.field(i).data_type().clone());
                    fields.push(Field::new(
                        &agg.name,
                        agg.func.output_type(arg_type.as_ref()),
                        true,
                    ));
                }
                Arc::new(Schema::new(fields))
            }
            RelAlgNode::Join { left, right, .. } => {
                let mut fields: Vec<Field> =
                    left.schema().fields().iter().map(|f| f.as_ref().clone()).collect();
                fields.extend(right.schema().fields().iter().map(|f| f.as_ref().clone()));
                Arc::new(Schema::new(fields))
            }
        }
    }

    fn render(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match self {
            RelAlgNode::Scan { table, schema } => {
                let columns: Vec<&str> =
                    schema.fields().iter().map(|f| f.name().as_str()).collect();
                out.push_str(&format!(
                    "{}Scan(table={}, columns=[{}])\n",
                    pad,
                    table,
                    columns.join(", ")
                ));
            }
            RelAlgNode::Filter { input, predicate } => {
                out.push_str(&format!("{}Filter(condition={})\n", pad, predicate));
                input.render(indent + 1, out);
            }
            RelAlgNode::Project { input, exprs, names } => {
                let items: Vec<String> = exprs
                    .iter()
                    .zip(names.iter())
                    .map(|(e, n)| format!("{}={}", n, e))
                    .collect();
                out.push_str(&format!("{}Project(exprs=[{}])\n", pad, items.join(", ")));
                input.render(indent + 1, out);
            }
            RelAlgNode::Aggregate {
                input,
                group_by,
                aggs,
            } => {
                let keys: Vec<String> = group_by.iter().map(|i| format!("#{}", i)).collect();
                let items: Vec<String> = aggs.iter().map(|a| a.to_string()).collect();
                out.push_str(&format!(
                    "{}Aggregate(group=[{}], aggs=[{}])\n",
                    pad,
                    keys.join(", "),
                    items.join(", ")
                ));
                input.render(indent + 1, out);
            }
            RelAlgNode::Join {
                left,
                right,
                left_keys,
                right_keys,
            } => {
                let keys: Vec<String> = left_keys
                    .iter()
                    .zip(right_keys.iter())
                    .map(|(l, r)| format!("#{}=#{}", l, r))
                    .collect();
                out.push_str(&format!("{}InnerJoin(keys=[{}])\n", pad, keys.join(", ")));
                left.render(indent + 1, out);
                right.render(indent + 1, out);
            }
            RelAlgNode::Sort { input, keys } => {
                let items: Vec<String> = keys
                    .iter()
                    .map(|k| {
                        format!("#{} {}", k.index, if k.descending { "DESC" } else { "ASC" })
                    })
                    .collect();
                out.push_str(&format!("{}Sort(keys=[{}])\n", pad, items.join(", ")));
                input.render(indent + 1, out);
            }
            RelAlgNode::Limit { input, limit, offset } => {
                match limit {
                    Some(n) => out.push_str(&format!(
                        "{}Limit(limit={}, offset={})\n",
                        pad, n, offset
                    )),
                    None => out.push_str(&format!("{}Limit(offset={})\n", pad, offset)),
                }
                input.render(indent + 1, out);
            }
        }
    }
}

impl fmt::Display for RelAlgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(0, &mut out);
        write!(f, "{}", out.trim_end())
    }
}

/// A complete plan ready for execution.
#[derive(Debug, Clone)]
pub struct RelAlgPlan {
    pub root: RelAlgNode,
}

impl RelAlgPlan {
    pub fn new(root: RelAlgNode) -> Self {
        RelAlgPlan { root }
    }

    pub fn schema(&self) -> SchemaRef {
        self.root.schema()
    }

    /// Human-readable rendering used by EXPLAIN.
    pub fn explain(&self) -> String {
        format!("Physical plan for the CPU:\n{}\n", self.root)
    }
}
