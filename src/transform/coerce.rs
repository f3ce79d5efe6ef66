//! Permissive type coercions
//!
//! Every coercion is total: a value that cannot be converted becomes
//! [`Cell::Null`] instead of raising. Applying a coercion to its own output
//! returns the same value.

use crate::record::{Cell, integral};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a calendar date; time-of-day parts are truncated
///
/// # Example
/// ```
/// use cademycode_etl::record::Cell;
/// use cademycode_etl::transform::to_date;
///
/// assert_eq!(to_date(&Cell::text("1990-01-01")).to_string(), "1990-01-01");
/// assert_eq!(to_date(&Cell::text("last tuesday")), Cell::Null);
/// ```
pub fn to_date(cell: &Cell) -> Cell {
    match cell {
        Cell::Date(d) => Cell::Date(*d),
        Cell::Text(s) => parse_date(s.trim()).into(),
        _ => Cell::Null,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Coerce to a finite real number
pub fn to_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Integer(i) => Cell::Real(*i as f64),
        Cell::Real(f) if f.is_finite() => Cell::Real(*f),
        Cell::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .into(),
        _ => Cell::Null,
    }
}

/// Coerce to a nullable integer
///
/// Values with a fractional part are nulled rather than truncated.
pub fn to_integer(cell: &Cell) -> Cell {
    match cell {
        Cell::Integer(i) => Cell::Integer(*i),
        Cell::Real(f) => integral(*f).into(),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
                .into()
        }
        _ => Cell::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Cell {
        Cell::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_to_date_formats() {
        assert_eq!(to_date(&Cell::text("1990-01-01")), date(1990, 1, 1));
        assert_eq!(to_date(&Cell::text(" 1990-01-01 ")), date(1990, 1, 1));
        assert_eq!(to_date(&Cell::text("1990/02/03")), date(1990, 2, 3));
        assert_eq!(to_date(&Cell::text("02/03/1990")), date(1990, 2, 3));
        assert_eq!(to_date(&Cell::text("1990-01-01 13:45:00")), date(1990, 1, 1));
        assert_eq!(to_date(&Cell::text("1990-01-01T13:45:00")), date(1990, 1, 1));
        assert_eq!(to_date(&Cell::text("1990-01-01T13:45:00+02:00")), date(1990, 1, 1));
    }

    #[test]
    fn test_to_date_nulls_garbage() {
        assert_eq!(to_date(&Cell::text("not a date")), Cell::Null);
        assert_eq!(to_date(&Cell::text("1990-13-45")), Cell::Null);
        assert_eq!(to_date(&Cell::text("")), Cell::Null);
        assert_eq!(to_date(&Cell::Integer(19900101)), Cell::Null);
        assert_eq!(to_date(&Cell::Null), Cell::Null);
    }

    #[test]
    fn test_to_numeric() {
        assert_eq!(to_numeric(&Cell::text("12.5")), Cell::Real(12.5));
        assert_eq!(to_numeric(&Cell::text("7")), Cell::Real(7.0));
        assert_eq!(to_numeric(&Cell::Integer(3)), Cell::Real(3.0));
        assert_eq!(to_numeric(&Cell::text("abc")), Cell::Null);
        assert_eq!(to_numeric(&Cell::text("NaN")), Cell::Null);
        assert_eq!(to_numeric(&Cell::Real(f64::INFINITY)), Cell::Null);
        assert_eq!(to_numeric(&Cell::Null), Cell::Null);
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(to_integer(&Cell::text("5")), Cell::Integer(5));
        assert_eq!(to_integer(&Cell::text(" 5 ")), Cell::Integer(5));
        assert_eq!(to_integer(&Cell::text("3.0")), Cell::Integer(3));
        assert_eq!(to_integer(&Cell::Real(2.0)), Cell::Integer(2));
        assert_eq!(to_integer(&Cell::Real(2.5)), Cell::Null);
        assert_eq!(to_integer(&Cell::text("not_a_number")), Cell::Null);
        assert_eq!(to_integer(&Cell::Null), Cell::Null);
    }

    #[test]
    fn test_coercions_are_idempotent() {
        let inputs = [
            Cell::text("1990-01-01"),
            Cell::text("12.5"),
            Cell::text("4"),
            Cell::text("junk"),
            Cell::Integer(8),
            Cell::Real(1.5),
            Cell::Null,
        ];

        for coerce in [to_date, to_numeric, to_integer] {
            for input in &inputs {
                let once = coerce(input);
                assert_eq!(coerce(&once), once, "not idempotent for {:?}", input);
            }
        }
    }
}
