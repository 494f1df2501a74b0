// SQL-to-Relational-Algebra Compiler
//
// Wraps sqlparser and binds the parsed tree against the storage's table
// schemas, producing a positional relational-algebra plan. Data definition
// goes through the storage API, so everything except SELECT is rejected
// here.

use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use sqlparser::ast as sqlast;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::relalg::{AggExpr, BinOp, Expr, RelAlgNode, RelAlgPlan, SortKey};
use super::SqlError;
use crate::common::Datum;
use crate::config::Config;
use crate::exec::functions;
use crate::storage::ArrowStorage;

/// Compiles SQL text into [`RelAlgPlan`]s bound to the given storage.
pub struct SqlCompiler {
    storage: Arc<ArrowStorage>,
    config: Arc<Config>,
}

/// One table visible in the FROM clause, with its column offset in the
/// combined row.
struct BindTarget {
    qualifier: String,
    schema: SchemaRef,
    offset: usize,
}

/// Name-resolution scope over the FROM clause.
struct Scope {
    targets: Vec<BindTarget>,
}

impl Scope {
    fn num_columns(&self) -> usize {
        self.targets
            .iter()
            .map(|t| t.schema.fields().len())
            .sum()
    }

    fn resolve(&self, qualifier: Option<&str>, name: &str) -> Result<(usize, String), SqlError> {
        let mut found = None;
        for target in &self.targets {
            if let Some(q) = qualifier {
                if !target.qualifier.eq_ignore_ascii_case(q) {
                    continue;
                }
            }
            if let Some((i, field)) = target
                .schema
                .fields()
                .iter()
                .enumerate()
                .find(|(_, f)| f.name().eq_ignore_ascii_case(name))
            {
                if found.is_some() {
                    return Err(SqlError::AmbiguousColumn(name.to_string()));
                }
                found = Some((target.offset + i, field.name().clone()));
            }
        }
        found.ok_or_else(|| SqlError::ColumnNotFound(name.to_string()))
    }

    /// All columns in FROM order, for `SELECT *`.
    fn all_columns(&self) -> Vec<(usize, String)> {
        let mut columns = Vec::new();
        for target in &self.targets {
            for (i, field) in target.schema.fields().iter().enumerate() {
                columns.push((target.offset + i, field.name().clone()));
            }
        }
        columns
    }
}

impl SqlCompiler {
    pub fn new(storage: Arc<ArrowStorage>, config: Arc<Config>) -> Self {
        SqlCompiler { storage, config }
    }

    /// Compile one SELECT statement into a plan.
    pub fn process(&self, sql: &str) -> Result<RelAlgPlan, SqlError> {
        let mut statements = Parser::parse_sql(&GenericDialect {}, sql)?;
        if statements.len() != 1 {
            return Err(SqlError::Unsupported(
                "exactly one statement expected".to_string(),
            ));
        }
        match statements.remove(0) {
            sqlast::Statement::Query(query) => self.compile_query(*query),
            other => Err(SqlError::Unsupported(format!(
                "only SELECT is supported, got: {}",
                statement_kind(&other)
            ))),
        }
    }

    fn compile_query(&self, query: sqlast::Query) -> Result<RelAlgPlan, SqlError> {
        if query.with.is_some() {
            return Err(SqlError::Unsupported("WITH clauses".to_string()));
        }
        let select = match *query.body {
            sqlast::SetExpr::Select(select) => *select,
            _ => {
                return Err(SqlError::Unsupported(
                    "set operations and VALUES".to_string(),
                ));
            }
        };
        if select.distinct.is_some() {
            return Err(SqlError::Unsupported("SELECT DISTINCT".to_string()));
        }
        if select.having.is_some() {
            return Err(SqlError::Unsupported("HAVING".to_string()));
        }

        let (mut node, scope) = self.bind_from(&select.from)?;

        if let Some(selection) = &select.selection {
            let predicate = self.bind_expr(selection, &scope)?;
            node = self.apply_filter(node, predicate);
        }

        let group_exprs = match &select.group_by {
            sqlast::GroupByExpr::Expressions(exprs) => exprs.as_slice(),
            sqlast::GroupByExpr::All => {
                return Err(SqlError::Unsupported("GROUP BY ALL".to_string()));
            }
        };
        let has_aggregate = !group_exprs.is_empty()
            || select
                .projection
                .iter()
                .any(|item| select_item_expr(item).is_some_and(contains_aggregate));

        let mut node = if has_aggregate {
            self.compile_aggregate(node, &scope, &select.projection, group_exprs)?
        } else {
            self.compile_projection(node, &scope, &select.projection)?
        };

        if !query.order_by.is_empty() {
            node = self.apply_order_by(node, &query.order_by)?;
        }

        let limit = match &query.limit {
            Some(expr) => Some(parse_usize(expr, "LIMIT")?),
            None => None,
        };
        let offset = match &query.offset {
            Some(offset) => parse_usize(&offset.value, "OFFSET")?,
            None => 0,
        };
        if limit.is_some() || offset > 0 {
            node = RelAlgNode::Limit {
                input: Box::new(node),
                limit,
                offset,
            };
        }

        Ok(RelAlgPlan::new(node))
    }

    fn bind_from(
        &self,
        from: &[sqlast::TableWithJoins],
    ) -> Result<(RelAlgNode, Scope), SqlError> {
        let [table_with_joins] = from else {
            return Err(SqlError::Unsupported(
                "exactly one FROM item expected".to_string(),
            ));
        };
        let (mut node, first) = self.bind_table_factor(&table_with_joins.relation, 0)?;
        let mut scope = Scope {
            targets: vec![first],
        };

        for join in &table_with_joins.joins {
            let left_width = scope.num_columns();
            let (right_node, right_target) =
                self.bind_table_factor(&join.relation, left_width)?;
            let condition = match &join.join_operator {
                sqlast::JoinOperator::Inner(sqlast::JoinConstraint::On(cond)) => cond,
                _ => {
                    return Err(SqlError::Unsupported(
                        "only INNER JOIN ... ON is supported".to_string(),
                    ));
                }
            };
            let right_scope = Scope {
                targets: vec![BindTarget {
                    qualifier: right_target.qualifier.clone(),
                    schema: right_target.schema.clone(),
                    offset: 0,
                }],
            };
            let (left_keys, right_keys) =
                extract_join_keys(condition, &scope, &right_scope)?;
            node = RelAlgNode::Join {
                left: Box::new(node),
                right: Box::new(right_node),
                left_keys,
                right_keys,
            };
            scope.targets.push(right_target);
        }
        Ok((node, scope))
    }

    fn bind_table_factor(
        &self,
        factor: &sqlast::TableFactor,
        offset: usize,
    ) -> Result<(RelAlgNode, BindTarget), SqlError> {
        match factor {
            sqlast::TableFactor::Table { name, alias, .. } => {
                let table_name = object_name(name)?;
                let schema = self
                    .storage
                    .table_schema(&table_name)
                    .ok_or_else(|| SqlError::TableNotFound(table_name.clone()))?;
                let qualifier = alias
                    .as_ref()
                    .map(|a| a.name.value.clone())
                    .unwrap_or_else(|| table_name.clone());
                let node = RelAlgNode::Scan {
                    table: table_name,
                    schema: schema.clone(),
                };
                Ok((node, BindTarget {
                    qualifier,
                    schema,
                    offset,
                }))
            }
            _ => Err(SqlError::Unsupported(
                "only plain table references are supported in FROM".to_string(),
            )),
        }
    }

    /// Wrap `node` in a filter. With filter pushdown enabled, conjuncts that
    /// only touch one side of a join move below it.
    fn apply_filter(&self, node: RelAlgNode, predicate: Expr) -> RelAlgNode {
        if !self.config.opts.enable_filter_pushdown {
            return RelAlgNode::Filter {
                input: Box::new(node),
                predicate,
            };
        }
        let (left, right, left_keys, right_keys) = match node {
            RelAlgNode::Join {
                left,
                right,
                left_keys,
                right_keys,
            } => (left, right, left_keys, right_keys),
            other => {
                return RelAlgNode::Filter {
                    input: Box::new(other),
                    predicate,
                };
            }
        };

        let left_width = left.schema().fields().len();
        let mut left_conjuncts = Vec::new();
        let mut right_conjuncts = Vec::new();
        let mut residual = Vec::new();
        for conjunct in split_conjuncts(predicate) {
            let mut refs = Vec::new();
            conjunct.referenced_columns(&mut refs);
            if refs.iter().all(|&i| i < left_width) {
                left_conjuncts.push(conjunct);
            } else if refs.iter().all(|&i| i >= left_width) {
                right_conjuncts
                    .push(conjunct.remap_columns(&|i| i - left_width));
            } else {
                residual.push(conjunct);
            }
        }

        let left = push_conjuncts(*left, left_conjuncts);
        let right = push_conjuncts(*right, right_conjuncts);
        let joined = RelAlgNode::Join {
            left: Box::new(left),
            right: Box::new(right),
            left_keys,
            right_keys,
        };
        push_conjuncts(joined, residual)
    }

    fn compile_projection(
        &self,
        node: RelAlgNode,
        scope: &Scope,
        projection: &[sqlast::SelectItem],
    ) -> Result<RelAlgNode, SqlError> {
        let mut exprs = Vec::new();
        let mut names = Vec::new();
        for (position, item) in projection.iter().enumerate() {
            match item {
                sqlast::SelectItem::Wildcard(_) => {
                    for (index, name) in scope.all_columns() {
                        exprs.push(Expr::column(index, name.clone()));
                        names.push(name);
                    }
                }
                sqlast::SelectItem::UnnamedExpr(expr) => {
                    let bound = self.bind_expr(expr, scope)?;
                    names.push(output_name(&bound, position, None));
                    exprs.push(bound);
                }
                sqlast::SelectItem::ExprWithAlias { expr, alias } => {
                    let bound = self.bind_expr(expr, scope)?;
                    names.push(alias.value.clone());
                    exprs.push(bound);
                }
                sqlast::SelectItem::QualifiedWildcard(..) => {
                    return Err(SqlError::Unsupported(
                        "qualified wildcards".to_string(),
                    ));
                }
            }
        }
        Ok(RelAlgNode::Project {
            input: Box::new(node),
            exprs,
            names,
        })
    }

    fn compile_aggregate(
        &self,
        node: RelAlgNode,
        scope: &Scope,
        projection: &[sqlast::SelectItem],
        group_exprs: &[sqlast::Expr],
    ) -> Result<RelAlgNode, SqlError> {
        let mut group_by = Vec::new();
        for expr in group_exprs {
            let (index, _) = self.bind_column_ref(expr, scope)?;
            group_by.push(index);
        }

        // Select items map either onto a group key or onto an aggregate.
        let mut aggs: Vec<AggExpr> = Vec::new();
        let mut out_exprs = Vec::new();
        let mut out_names = Vec::new();
        for (position, item) in projection.iter().enumerate() {
            let (expr, alias) = match item {
                sqlast::SelectItem::UnnamedExpr(expr) => (expr, None),
                sqlast::SelectItem::ExprWithAlias { expr, alias } => {
                    (expr, Some(alias.value.clone()))
                }
                _ => {
                    return Err(SqlError::Unsupported(
                        "wildcards in aggregate queries".to_string(),
                    ));
                }
            };
            if contains_aggregate(expr) {
                let agg = self.bind_aggregate(expr, scope, position, alias)?;
                let out_index = group_by.len() + aggs.len();
                out_exprs.push(Expr::column(out_index, agg.name.clone()));
                out_names.push(agg.name.clone());
                aggs.push(agg);
            } else {
                let (index, name) = self.bind_column_ref(expr, scope)?;
                let key_position =
                    group_by.iter().position(|&g| g == index).ok_or_else(|| {
                        SqlError::Invalid(format!(
                            "column {} must appear in GROUP BY or an aggregate",
                            name
                        ))
                    })?;
                let out_name = alias.unwrap_or(name);
                out_exprs.push(Expr::column(key_position, out_name.clone()));
                out_names.push(out_name);
            }
        }
        if aggs.is_empty() {
            return Err(SqlError::Invalid(
                "GROUP BY query without aggregates".to_string(),
            ));
        }

        let aggregate = RelAlgNode::Aggregate {
            input: Box::new(node),
            group_by,
            aggs,
        };
        Ok(RelAlgNode::Project {
            input: Box::new(aggregate),
            exprs: out_exprs,
            names: out_names,
        })
    }

    fn bind_aggregate(
        &self,
        expr: &sqlast::Expr,
        scope: &Scope,
        position: usize,
        alias: Option<String>,
    ) -> Result<AggExpr, SqlError> {
        let sqlast::Expr::Function(function) = expr else {
            return Err(SqlError::Unsupported(
                "aggregates must be top-level select items".to_string(),
            ));
        };
        let func_name = object_name(&function.name)?;
        let func = functions::lookup_aggregate(&func_name)
            .ok_or_else(|| SqlError::Unsupported(format!("function {}", func_name)))?;
        if function.distinct {
            return Err(SqlError::Unsupported("DISTINCT aggregates".to_string()));
        }
        let arg = match function.args.as_slice() {
            [sqlast::FunctionArg::Unnamed(sqlast::FunctionArgExpr::Wildcard)] => None,
            [sqlast::FunctionArg::Unnamed(sqlast::FunctionArgExpr::Expr(arg))] => {
                Some(self.bind_column_ref(arg, scope)?.0)
            }
            [] => None,
            _ => {
                return Err(SqlError::Unsupported(
                    "aggregate argument must be a single column or *".to_string(),
                ));
            }
        };
        let name = alias.unwrap_or_else(|| format!("EXPR${}", position));
        Ok(AggExpr { func, arg, name })
    }

    fn bind_column_ref(
        &self,
        expr: &sqlast::Expr,
        scope: &Scope,
    ) -> Result<(usize, String), SqlError> {
        match expr {
            sqlast::Expr::Identifier(ident) => scope.resolve(None, &ident.value),
            sqlast::Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                [qualifier, name] => scope.resolve(Some(&qualifier.value), &name.value),
                _ => Err(SqlError::Unsupported(
                    "nested compound identifiers".to_string(),
                )),
            },
            _ => Err(SqlError::Unsupported(
                "expected a plain column reference".to_string(),
            )),
        }
    }

    fn bind_expr(&self, expr: &sqlast::Expr, scope: &Scope) -> Result<Expr, SqlError> {
        match expr {
            sqlast::Expr::Identifier(_) | sqlast::Expr::CompoundIdentifier(_) => {
                let (index, name) = self.bind_column_ref(expr, scope)?;
                Ok(Expr::column(index, name))
            }
            sqlast::Expr::Value(value) => Ok(Expr::Literal(bind_literal(value)?)),
            sqlast::Expr::BinaryOp { left, op, right } => {
                let op = bind_operator(op)?;
                Ok(Expr::binary(
                    op,
                    self.bind_expr(left, scope)?,
                    self.bind_expr(right, scope)?,
                ))
            }
            sqlast::Expr::UnaryOp { op, expr } => match op {
                sqlast::UnaryOperator::Not => {
                    Ok(Expr::Not(Box::new(self.bind_expr(expr, scope)?)))
                }
                sqlast::UnaryOperator::Minus => {
                    match self.bind_expr(expr, scope)? {
                        Expr::Literal(Datum::Int(v)) => Ok(Expr::Literal(Datum::Int(-v))),
                        Expr::Literal(Datum::Float(v)) => {
                            Ok(Expr::Literal(Datum::Float(-v)))
                        }
                        bound => Ok(Expr::binary(
                            BinOp::Minus,
                            Expr::Literal(Datum::Int(0)),
                            bound,
                        )),
                    }
                }
                sqlast::UnaryOperator::Plus => self.bind_expr(expr, scope),
                other => Err(SqlError::Unsupported(format!(
                    "unary operator {}",
                    other
                ))),
            },
            sqlast::Expr::Nested(inner) => self.bind_expr(inner, scope),
            sqlast::Expr::IsNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.bind_expr(inner, scope)?),
                negated: false,
            }),
            sqlast::Expr::IsNotNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.bind_expr(inner, scope)?),
                negated: true,
            }),
            sqlast::Expr::Function(_) => Err(SqlError::Unsupported(
                "aggregates are only allowed as top-level select items".to_string(),
            )),
            other => Err(SqlError::Unsupported(format!("expression {}", other))),
        }
    }

    /// Sort keys resolve against the projected output: by name or by
    /// 1-based ordinal.
    fn apply_order_by(
        &self,
        node: RelAlgNode,
        order_by: &[sqlast::OrderByExpr],
    ) -> Result<RelAlgNode, SqlError> {
        let schema = node.schema();
        let mut keys = Vec::new();
        for item in order_by {
            let index = match &item.expr {
                sqlast::Expr::Identifier(ident) => schema
                    .fields()
                    .iter()
                    .position(|f| f.name().eq_ignore_ascii_case(&ident.value))
                    .ok_or_else(|| SqlError::ColumnNotFound(ident.value.clone()))?,
                sqlast::Expr::Value(sqlast::Value::Number(text, _)) => {
                    let ordinal: usize = text.parse().map_err(|_| {
                        SqlError::Invalid(format!("bad ORDER BY ordinal: {}", text))
                    })?;
                    if ordinal == 0 || ordinal > schema.fields().len() {
                        return Err(SqlError::Invalid(format!(
                            "ORDER BY ordinal {} out of range",
                            ordinal
                        )));
                    }
                    ordinal - 1
                }
                other => {
                    return Err(SqlError::Unsupported(format!(
                        "ORDER BY expression {}",
                        other
                    )));
                }
            };
            let ascending = item.asc.unwrap_or(true);
            // Default NULL placement follows descending-high semantics.
            let nulls_first = item.nulls_first.unwrap_or(!ascending);
            keys.push(SortKey {
                index,
                descending: !ascending,
                nulls_first,
            });
        }
        Ok(RelAlgNode::Sort {
            input: Box::new(node),
            keys,
        })
    }
}

fn object_name(name: &sqlast::ObjectName) -> Result<String, SqlError> {
    match name.0.as_slice() {
        [ident] => Ok(ident.value.clone()),
        _ => Err(SqlError::Unsupported(
            "qualified object names".to_string(),
        )),
    }
}

fn statement_kind(statement: &sqlast::Statement) -> &'static str {
    match statement {
        sqlast::Statement::Insert { .. } => "INSERT",
        sqlast::Statement::Update { .. } => "UPDATE",
        sqlast::Statement::Delete { .. } => "DELETE",
        sqlast::Statement::CreateTable { .. } => "CREATE TABLE",
        sqlast::Statement::Drop { .. } => "DROP",
        sqlast::Statement::Explain { .. } => "EXPLAIN",
        _ => "statement",
    }
}

fn select_item_expr(item: &sqlast::SelectItem) -> Option<&sqlast::Expr> {
    match item {
        sqlast::SelectItem::UnnamedExpr(expr)
        | sqlast::SelectItem::ExprWithAlias { expr, .. } => Some(expr),
        _ => None,
    }
}

fn contains_aggregate(expr: &sqlast::Expr) -> bool {
    match expr {
        sqlast::Expr::Function(function) => object_name(&function.name)
            .ok()
            .and_then(|name| functions::lookup_aggregate(&name))
            .is_some(),
        sqlast::Expr::BinaryOp { left, right, .. } => {
            contains_aggregate(left) || contains_aggregate(right)
        }
        sqlast::Expr::UnaryOp { expr, .. } | sqlast::Expr::Nested(expr) => {
            contains_aggregate(expr)
        }
        _ => false,
    }
}

fn bind_literal(value: &sqlast::Value) -> Result<Datum, SqlError> {
    match value {
        sqlast::Value::Number(text, _) => {
            if let Ok(v) = text.parse::<i64>() {
                Ok(Datum::Int(v))
            } else {
                text.parse::<f64>()
                    .map(Datum::Float)
                    .map_err(|_| SqlError::Invalid(format!("bad numeric literal: {}", text)))
            }
        }
        sqlast::Value::SingleQuotedString(text) => Ok(Datum::Str(text.clone())),
        sqlast::Value::Boolean(v) => Ok(Datum::Bool(*v)),
        sqlast::Value::Null => Ok(Datum::Null),
        other => Err(SqlError::Unsupported(format!("literal {}", other))),
    }
}

fn bind_operator(op: &sqlast::BinaryOperator) -> Result<BinOp, SqlError> {
    match op {
        sqlast::BinaryOperator::Eq => Ok(BinOp::Eq),
        sqlast::BinaryOperator::NotEq => Ok(BinOp::NotEq),
        sqlast::BinaryOperator::Lt => Ok(BinOp::Lt),
        sqlast::BinaryOperator::LtEq => Ok(BinOp::LtEq),
        sqlast::BinaryOperator::Gt => Ok(BinOp::Gt),
        sqlast::BinaryOperator::GtEq => Ok(BinOp::GtEq),
        sqlast::BinaryOperator::And => Ok(BinOp::And),
        sqlast::BinaryOperator::Or => Ok(BinOp::Or),
        sqlast::BinaryOperator::Plus => Ok(BinOp::Plus),
        sqlast::BinaryOperator::Minus => Ok(BinOp::Minus),
        sqlast::BinaryOperator::Multiply => Ok(BinOp::Multiply),
        sqlast::BinaryOperator::Divide => Ok(BinOp::Divide),
        sqlast::BinaryOperator::Modulo => Ok(BinOp::Modulo),
        other => Err(SqlError::Unsupported(format!("operator {}", other))),
    }
}

fn parse_usize(expr: &sqlast::Expr, clause: &str) -> Result<usize, SqlError> {
    match expr {
        sqlast::Expr::Value(sqlast::Value::Number(text, _)) => text
            .parse()
            .map_err(|_| SqlError::Invalid(format!("bad {} value: {}", clause, text))),
        other => Err(SqlError::Unsupported(format!(
            "{} must be a number literal, got {}",
            clause, other
        ))),
    }
}

fn output_name(expr: &Expr, position: usize, alias: Option<String>) -> String {
    if let Some(alias) = alias {
        return alias;
    }
    match expr {
        Expr::Column { name, .. } => name.clone(),
        _ => format!("EXPR${}", position),
    }
}

fn split_conjuncts(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Binary {
            op: BinOp::And,
            left,
            right,
        } => {
            let mut out = split_conjuncts(*left);
            out.extend(split_conjuncts(*right));
            out
        }
        other => vec![other],
    }
}

fn push_conjuncts(node: RelAlgNode, conjuncts: Vec<Expr>) -> RelAlgNode {
    let Some(predicate) = conjuncts
        .into_iter()
        .reduce(|acc, next| Expr::binary(BinOp::And, acc, next))
    else {
        return node;
    };
    RelAlgNode::Filter {
        input: Box::new(node),
        predicate,
    }
}

fn extract_join_keys(
    condition: &sqlast::Expr,
    left: &Scope,
    right: &Scope,
) -> Result<(Vec<usize>, Vec<usize>), SqlError> {
    match condition {
        sqlast::Expr::BinaryOp {
            left: lhs,
            op: sqlast::BinaryOperator::And,
            right: rhs,
        } => {
            let (mut lk, mut rk) = extract_join_keys(lhs, left, right)?;
            let (lk2, rk2) = extract_join_keys(rhs, left, right)?;
            lk.extend(lk2);
            rk.extend(rk2);
            Ok((lk, rk))
        }
        sqlast::Expr::BinaryOp {
            left: lhs,
            op: sqlast::BinaryOperator::Eq,
            right: rhs,
        } => {
            let left_of = |expr: &sqlast::Expr, scope: &Scope| match expr {
                sqlast::Expr::Identifier(ident) => scope.resolve(None, &ident.value),
                sqlast::Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                    [q, n] => scope.resolve(Some(&q.value), &n.value),
                    _ => Err(SqlError::Unsupported(
                        "nested compound identifiers".to_string(),
                    )),
                },
                _ => Err(SqlError::Unsupported(
                    "join keys must be column references".to_string(),
                )),
            };
            if let (Ok((li, _)), Ok((ri, _))) = (left_of(lhs, left), left_of(rhs, right)) {
                Ok((vec![li], vec![ri]))
            } else if let (Ok((li, _)), Ok((ri, _))) =
                (left_of(rhs, left), left_of(lhs, right))
            {
                Ok((vec![li], vec![ri]))
            } else {
                Err(SqlError::Unsupported(
                    "join condition must equate columns of the joined tables".to_string(),
                ))
            }
        }
        sqlast::Expr::Nested(inner) => extract_join_keys(inner, left, right),
        _ => Err(SqlError::Unsupported(
            "join condition must be a conjunction of equalities".to_string(),
        )),
    }
}
