// Scalar Value Representation
//
// A `Datum` is a single scalar crossing operator boundaries: a literal in an
// expression tree, a group key, or an aggregate accumulator value. Column
// data itself stays in Arrow arrays; datums only appear at row granularity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use arrow::datatypes::DataType;

/// Scalar value for one of the engine's supported logical types.
#[derive(Debug, Clone)]
pub enum Datum {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::Null, Datum::Null) => true,
            (Datum::Int(a), Datum::Int(b)) => a == b,
            (Datum::Float(a), Datum::Float(b)) => a.to_bits() == b.to_bits(),
            (Datum::Str(a), Datum::Str(b)) => a == b,
            (Datum::Bool(a), Datum::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Datum {}

impl Hash for Datum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Datum::Null => 0u8.hash(state),
            Datum::Int(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Datum::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Datum::Str(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Datum::Bool(b) => {
                4u8.hash(state);
                b.hash(state);
            }
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "NULL"),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::Float(v) => write!(f, "{}", v),
            Datum::Str(s) => write!(f, "'{}'", s),
            Datum::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Arrow type of this scalar; `None` for NULL, whose type depends on
    /// context.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Datum::Null => None,
            Datum::Int(_) => Some(DataType::Int64),
            Datum::Float(_) => Some(DataType::Float64),
            Datum::Str(_) => Some(DataType::Utf8),
            Datum::Bool(_) => Some(DataType::Boolean),
        }
    }

    /// Compare two non-null scalars, coercing across Int/Float.
    /// Returns `None` for incompatible types or when either side is NULL.
    pub fn compare(&self, other: &Datum) -> Option<Ordering> {
        match (self, other) {
            (Datum::Int(a), Datum::Int(b)) => Some(a.cmp(b)),
            (Datum::Float(a), Datum::Float(b)) => a.partial_cmp(b),
            (Datum::Int(a), Datum::Float(b)) => (*a as f64).partial_cmp(b),
            (Datum::Float(a), Datum::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Datum::Str(a), Datum::Str(b)) => Some(a.cmp(b)),
            (Datum::Bool(a), Datum::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Ordering for sort keys. NULLs sort according to `nulls_first`.
    pub fn sort_cmp(&self, other: &Datum, nulls_first: bool) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if nulls_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if nulls_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(i) => Some(*i as f64),
            Datum::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(
            Datum::Int(2).compare(&Datum::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Datum::Float(3.0).compare(&Datum::Int(3)),
            Some(Ordering::Equal)
        );
        assert_eq!(Datum::Int(1).compare(&Datum::Str("x".into())), None);
    }

    #[test]
    fn test_null_ordering() {
        assert_eq!(Datum::Null.sort_cmp(&Datum::Int(1), true), Ordering::Less);
        assert_eq!(
            Datum::Null.sort_cmp(&Datum::Int(1), false),
            Ordering::Greater
        );
        assert_eq!(Datum::Null.sort_cmp(&Datum::Null, true), Ordering::Equal);
    }

    #[test]
    fn test_hash_eq_for_group_keys() {
        use std::collections::HashMap;
        let mut groups: HashMap<Vec<Datum>, usize> = HashMap::new();
        groups.insert(vec![Datum::Int(1), Datum::Str("a".into())], 1);
        assert_eq!(
            groups.get(&vec![Datum::Int(1), Datum::Str("a".into())]),
            Some(&1)
        );
        assert_eq!(groups.get(&vec![Datum::Int(2), Datum::Str("a".into())]), None);
    }
}
