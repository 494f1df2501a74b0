// Columnar Expression Evaluation
//
// Expressions are evaluated against whole record batches. Comparisons and
// boolean operators produce BooleanArrays consumed by the filter operator;
// arithmetic produces numeric arrays. NULL follows SQL three-valued logic.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Float64Array, Float64Builder, Int64Array,
    Int64Builder, StringArray, StringBuilder,
};
use arrow::compute::{and_kleene, is_not_null, is_null, not, or_kleene};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use super::ExecError;
use crate::common::Datum;
use crate::sql::relalg::{BinOp, Expr};

/// Evaluate an expression over a batch, producing one array of
/// `batch.num_rows()` values.
pub fn evaluate(expr: &Expr, batch: &RecordBatch) -> Result<ArrayRef, ExecError> {
    match expr {
        Expr::Column { index, .. } => Ok(batch.column(*index).clone()),
        Expr::Literal(datum) => literal_array(datum, batch.num_rows()),
        Expr::Binary { op, left, right } => {
            let lhs = evaluate(left, batch)?;
            let rhs = evaluate(right, batch)?;
            if op.is_logical() {
                let lhs = as_boolean(&lhs)?;
                let rhs = as_boolean(&rhs)?;
                let out = match op {
                    BinOp::And => and_kleene(lhs, rhs)?,
                    _ => or_kleene(lhs, rhs)?,
                };
                Ok(Arc::new(out))
            } else if op.is_comparison() {
                Ok(Arc::new(compare_arrays(*op, &lhs, &rhs)?))
            } else {
                arithmetic_arrays(*op, &lhs, &rhs)
            }
        }
        Expr::Not(inner) => {
            let values = evaluate(inner, batch)?;
            let values = as_boolean(&values)?;
            Ok(Arc::new(not(values)?))
        }
        Expr::IsNull { expr, negated } => {
            let values = evaluate(expr, batch)?;
            let out = if *negated {
                is_not_null(values.as_ref())?
            } else {
                is_null(values.as_ref())?
            };
            Ok(Arc::new(out))
        }
    }
}

/// Evaluate a predicate, requiring a boolean result.
pub fn evaluate_predicate(expr: &Expr, batch: &RecordBatch) -> Result<BooleanArray, ExecError> {
    let values = evaluate(expr, batch)?;
    Ok(as_boolean(&values)?.clone())
}

fn as_boolean(array: &ArrayRef) -> Result<&BooleanArray, ExecError> {
    array
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| {
            ExecError::Type(format!(
                "expected a boolean expression, got {}",
                array.data_type()
            ))
        })
}

fn literal_array(datum: &Datum, rows: usize) -> Result<ArrayRef, ExecError> {
    let array: ArrayRef = match datum {
        Datum::Null => Arc::new(Int64Array::from(vec![None::<i64>; rows])),
        Datum::Int(v) => Arc::new(Int64Array::from(vec![*v; rows])),
        Datum::Float(v) => Arc::new(Float64Array::from(vec![*v; rows])),
        Datum::Str(v) => Arc::new(StringArray::from(vec![v.as_str(); rows])),
        Datum::Bool(v) => Arc::new(BooleanArray::from(vec![*v; rows])),
    };
    Ok(array)
}

fn compare_arrays(op: BinOp, left: &ArrayRef, right: &ArrayRef) -> Result<BooleanArray, ExecError> {
    let mut builder = BooleanBuilder::with_capacity(left.len());
    for row in 0..left.len() {
        let lv = datum_at(left, row)?;
        let rv = datum_at(right, row)?;
        if lv.is_null() || rv.is_null() {
            builder.append_null();
            continue;
        }
        let ordering = lv.compare(&rv).ok_or_else(|| {
            ExecError::Type(format!(
                "cannot compare {} with {}",
                left.data_type(),
                right.data_type()
            ))
        })?;
        let result = match op {
            BinOp::Eq => ordering.is_eq(),
            BinOp::NotEq => ordering.is_ne(),
            BinOp::Lt => ordering.is_lt(),
            BinOp::LtEq => ordering.is_le(),
            BinOp::Gt => ordering.is_gt(),
            BinOp::GtEq => ordering.is_ge(),
            _ => unreachable!("not a comparison operator"),
        };
        builder.append_value(result);
    }
    Ok(builder.finish())
}

fn arithmetic_arrays(op: BinOp, left: &ArrayRef, right: &ArrayRef) -> Result<ArrayRef, ExecError> {
    let float_result =
        left.data_type() == &DataType::Float64 || right.data_type() == &DataType::Float64;
    if float_result {
        let mut builder = Float64Builder::with_capacity(left.len());
        for row in 0..left.len() {
            let lv = datum_at(left, row)?;
            let rv = datum_at(right, row)?;
            match (lv.as_f64(), rv.as_f64()) {
                (Some(a), Some(b)) => builder.append_value(apply_float(op, a, b)),
                _ => builder.append_null(),
            }
        }
        Ok(Arc::new(builder.finish()))
    } else {
        let mut builder = Int64Builder::with_capacity(left.len());
        for row in 0..left.len() {
            let lv = datum_at(left, row)?;
            let rv = datum_at(right, row)?;
            match (lv, rv) {
                (Datum::Int(a), Datum::Int(b)) => builder.append_value(apply_int(op, a, b)?),
                (Datum::Null, _) | (_, Datum::Null) => builder.append_null(),
                (a, b) => {
                    return Err(ExecError::Type(format!(
                        "cannot apply {} to {} and {}",
                        op, a, b
                    )));
                }
            }
        }
        Ok(Arc::new(builder.finish()))
    }
}

fn apply_float(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Plus => a + b,
        BinOp::Minus => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
        _ => unreachable!("not an arithmetic operator"),
    }
}

fn apply_int(op: BinOp, a: i64, b: i64) -> Result<i64, ExecError> {
    let out = match op {
        BinOp::Plus => a.checked_add(b),
        BinOp::Minus => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => {
            if b == 0 {
                return Err(ExecError::DivisionByZero);
            }
            a.checked_div(b)
        }
        BinOp::Modulo => {
            if b == 0 {
                return Err(ExecError::DivisionByZero);
            }
            a.checked_rem(b)
        }
        _ => unreachable!("not an arithmetic operator"),
    };
    out.ok_or_else(|| ExecError::Execution("integer overflow".to_string()))
}

/// Read one scalar out of an array.
pub fn datum_at(array: &ArrayRef, row: usize) -> Result<Datum, ExecError> {
    if array.is_null(row) {
        return Ok(Datum::Null);
    }
    match array.data_type() {
        DataType::Int64 => {
            let values = array.as_any().downcast_ref::<Int64Array>().ok_or_else(|| {
                ExecError::Type("Int64 array downcast failed".to_string())
            })?;
            Ok(Datum::Int(values.value(row)))
        }
        DataType::Float64 => {
            let values = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| ExecError::Type("Float64 array downcast failed".to_string()))?;
            Ok(Datum::Float(values.value(row)))
        }
        DataType::Utf8 => {
            let values = array.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
                ExecError::Type("Utf8 array downcast failed".to_string())
            })?;
            Ok(Datum::Str(values.value(row).to_string()))
        }
        DataType::Boolean => {
            let values = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| ExecError::Type("Boolean array downcast failed".to_string()))?;
            Ok(Datum::Bool(values.value(row)))
        }
        other => Err(ExecError::Type(format!(
            "unsupported array type {}",
            other
        ))),
    }
}

/// Build an array of `data_type` from scalars. Int scalars coerce into
/// Float64 arrays; everything else must match the target type exactly.
pub fn build_array(values: &[Datum], data_type: &DataType) -> Result<ArrayRef, ExecError> {
    match data_type {
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(values.len());
            for value in values {
                match value {
                    Datum::Null => builder.append_null(),
                    Datum::Int(v) => builder.append_value(*v),
                    other => return Err(type_mismatch(other, data_type)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(values.len());
            for value in values {
                match value {
                    Datum::Null => builder.append_null(),
                    Datum::Float(v) => builder.append_value(*v),
                    Datum::Int(v) => builder.append_value(*v as f64),
                    other => return Err(type_mismatch(other, data_type)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::Utf8 => {
            let mut builder = StringBuilder::new();
            for value in values {
                match value {
                    Datum::Null => builder.append_null(),
                    Datum::Str(v) => builder.append_value(v),
                    other => return Err(type_mismatch(other, data_type)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(values.len());
            for value in values {
                match value {
                    Datum::Null => builder.append_null(),
                    Datum::Bool(v) => builder.append_value(*v),
                    other => return Err(type_mismatch(other, data_type)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        other => Err(ExecError::Type(format!(
            "cannot build array of type {}",
            other
        ))),
    }
}

fn type_mismatch(datum: &Datum, data_type: &DataType) -> ExecError {
    ExecError::Type(format!("value {} does not fit column type {}", datum, data_type))
}
