//! Typed, nullable cell values

use chrono::NaiveDate;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single value in a record set
///
/// Reals compare by their canonical bit pattern, so `NaN == NaN` and
/// `0.0 == -0.0`. That makes `Cell` usable as a hash key when looking for
/// exact-duplicate rows.
#[derive(Debug, Clone, Default)]
pub enum Cell {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    Blob(Vec<u8>),
}

/// Normalized key used to match rows across tables in a join
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum JoinKey {
    Integer(i64),
    Real(u64),
    Text(String),
    Date(NaiveDate),
    Blob(Vec<u8>),
}

fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

/// Returns the integer a float represents exactly, if any
pub(crate) fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Key for join matching; `None` for nulls, which never match.
    ///
    /// Integral reals collapse onto integers so `5` joins with `5.0`.
    pub(crate) fn join_key(&self) -> Option<JoinKey> {
        match self {
            Cell::Null => None,
            Cell::Integer(i) => Some(JoinKey::Integer(*i)),
            Cell::Real(f) => Some(match integral(*f) {
                Some(i) => JoinKey::Integer(i),
                None => JoinKey::Real(canonical_bits(*f)),
            }),
            Cell::Text(s) => Some(JoinKey::Text(s.clone())),
            Cell::Date(d) => Some(JoinKey::Date(*d)),
            Cell::Blob(b) => Some(JoinKey::Blob(b.clone())),
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Integer(a), Cell::Integer(b)) => a == b,
            (Cell::Real(a), Cell::Real(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Date(a), Cell::Date(b)) => a == b,
            (Cell::Blob(a), Cell::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null => {}
            Cell::Integer(i) => i.hash(state),
            Cell::Real(f) => canonical_bits(*f).hash(state),
            Cell::Text(s) => s.hash(state),
            Cell::Date(d) => d.hash(state),
            Cell::Blob(b) => b.hash(state),
        }
    }
}

/// Flat-file rendering: nulls are empty, dates are `YYYY-MM-DD`, whole reals
/// keep a trailing `.0`.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) if integral(*r).is_some() => write!(f, "{:.1}", r),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Blob(b) => b.iter().try_for_each(|byte| write!(f, "{:02x}", byte)),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Real(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Cell::Real(f64::NAN), Cell::Real(f64::NAN));
        assert_eq!(Cell::Real(0.0), Cell::Real(-0.0));

        let mut seen = HashSet::new();
        assert!(seen.insert(Cell::Real(f64::NAN)));
        assert!(!seen.insert(Cell::Real(f64::NAN)));
    }

    #[test]
    fn test_kinds_do_not_compare_equal() {
        assert_ne!(Cell::Integer(5), Cell::Real(5.0));
        assert_ne!(Cell::Integer(5), Cell::text("5"));
        assert_ne!(Cell::Null, Cell::text(""));
    }

    #[test]
    fn test_join_key_collapses_integral_reals() {
        assert_eq!(Cell::Integer(5).join_key(), Cell::Real(5.0).join_key());
        assert_ne!(Cell::Integer(5).join_key(), Cell::Real(5.5).join_key());
        assert_eq!(Cell::Null.join_key(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(Cell::Integer(42).to_string(), "42");
        assert_eq!(Cell::Real(12.5).to_string(), "12.5");
        assert_eq!(Cell::Real(3.0).to_string(), "3.0");
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()).to_string(),
            "1990-01-01"
        );
        assert_eq!(Cell::Blob(vec![0xde, 0xad]).to_string(), "dead");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Cell::from(None::<i64>), Cell::Null);
        assert_eq!(Cell::from(Some("a@x.com")), Cell::text("a@x.com"));
    }
}
