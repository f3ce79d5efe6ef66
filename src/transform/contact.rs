//! Contact information decomposition
//!
//! The source stores contact details as one text column holding a
//! dictionary literal such as `{'email': 'a@x.com', 'phone': None}`. The
//! bare `None`, `True` and `False` keywords are rewritten to their JSON
//! spellings, then the text is parsed as JSON5, which covers single-quoted
//! strings and unquoted keys. The text is never evaluated.

use crate::model::columns;
use crate::record::{Cell, Table, integral};

use eyre::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Splits the combined contact column into one column per sub-field
///
/// # Example
/// ```
/// use cademycode_etl::record::{Cell, Table};
/// use cademycode_etl::transform::ContactDecomposer;
///
/// let mut students = Table::from_rows(
///     "students",
///     ["uuid", "contact_info"],
///     vec![vec![
///         Cell::text("s1"),
///         Cell::text("{'email':'a@x.com','phone':'123'}"),
///     ]],
/// )
/// .unwrap();
///
/// ContactDecomposer::default().decompose(&mut students).unwrap();
/// assert_eq!(students.columns(), ["uuid", "email", "phone"]);
/// assert_eq!(students.get(0, "email"), Some(&Cell::text("a@x.com")));
/// ```
#[derive(Debug, Clone)]
pub struct ContactDecomposer {
    column: String,
    fields: Vec<String>,
}

impl ContactDecomposer {
    /// Decompose `column` into the given sub-field columns
    pub fn new(column: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            column: column.into(),
            fields,
        }
    }

    /// Parse one contact literal into cells, one per sub-field
    ///
    /// Returns `None` when the text is not an object literal.
    pub fn parse(&self, raw: &str) -> Option<Vec<Cell>> {
        parse_object(raw).map(|object| self.cells(&object))
    }

    fn cells(&self, object: &Map<String, Value>) -> Vec<Cell> {
        self.fields
            .iter()
            .map(|field| match object.get(field) {
                None | Some(Value::Null) => Cell::Null,
                Some(Value::String(s)) => Cell::text(s.as_str()),
                Some(Value::Number(n)) => Cell::text(number_text(n)),
                Some(other) => Cell::text(other.to_string()),
            })
            .collect()
    }

    /// Replace the combined column with one column per sub-field
    ///
    /// Rows with a null contact value get nulls. When the table has no
    /// combined column the sub-field columns are still added, all null, so
    /// the output schema does not depend on the input. Keys outside the
    /// configured fields are dropped and reported at debug level.
    ///
    /// Returns how many non-null contact values were rejected as unparsable.
    pub fn decompose(&self, table: &mut Table) -> Result<usize> {
        let contacts = if table.has_column(&self.column) {
            table.drop_column(&self.column)?
        } else {
            vec![Cell::Null; table.len()]
        };

        let split = self.split(&contacts);
        if !split.ignored.is_empty() {
            log::debug!(
                "Ignoring {} keys not in the configured fields: {:?}",
                self.column,
                split.ignored
            );
        }

        for (field, values) in self.fields.iter().zip(split.columns) {
            table.append_column(field.as_str(), values)?;
        }

        Ok(split.rejected)
    }

    fn split(&self, contacts: &[Cell]) -> Split {
        let mut split = Split {
            columns: vec![Vec::with_capacity(contacts.len()); self.fields.len()],
            rejected: 0,
            ignored: BTreeSet::new(),
        };

        for contact in contacts {
            let object = match contact {
                Cell::Text(raw) => parse_object(raw),
                _ => None,
            };
            let cells = match object {
                Some(object) => {
                    split.ignored.extend(
                        object
                            .keys()
                            .filter(|key| !self.fields.contains(key))
                            .cloned(),
                    );
                    self.cells(&object)
                }
                None => {
                    if !contact.is_null() {
                        split.rejected += 1;
                    }
                    vec![Cell::Null; self.fields.len()]
                }
            };
            for (column, cell) in split.columns.iter_mut().zip(cells) {
                column.push(cell);
            }
        }

        split
    }
}

/// Sub-field columns built from one contact column
struct Split {
    columns: Vec<Vec<Cell>>,
    rejected: usize,
    ignored: BTreeSet<String>,
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match json5::from_str::<Value>(&json_keywords(raw)).ok()? {
        Value::Object(object) => Some(object),
        _ => None,
    }
}

/// Rewrite bare `None`, `True` and `False` outside string literals
fn json_keywords(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        if c == '\'' || c == '"' {
            quote = Some(c);
            out.push(c);
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let mut word = String::from(c);
            while let Some(&next) = chars.peek() {
                if !(next.is_alphanumeric() || next == '_' || next == '$') {
                    break;
                }
                word.push(next);
                chars.next();
            }
            out.push_str(match word.as_str() {
                "None" => "null",
                "True" => "true",
                "False" => "false",
                other => other,
            });
        } else {
            out.push(c);
        }
    }

    out
}

/// Whole numbers render without a fractional part, whatever the parser
/// produced
fn number_text(n: &serde_json::Number) -> String {
    match n.as_i64().or_else(|| n.as_f64().and_then(integral)) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

impl Default for ContactDecomposer {
    fn default() -> Self {
        Self::new(
            columns::CONTACT_INFO,
            vec![columns::EMAIL.to_string(), columns::PHONE.to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn students(contacts: Vec<Cell>) -> Table {
        let rows = contacts
            .into_iter()
            .enumerate()
            .map(|(i, c)| vec![Cell::text(format!("s{}", i)), c])
            .collect();
        Table::from_rows("students", ["uuid", "contact_info"], rows).unwrap()
    }

    #[test]
    fn test_parse_single_quoted_literal() {
        let cells = ContactDecomposer::default()
            .parse("{'email':'a@x.com','phone':'123'}")
            .unwrap();
        assert_eq!(cells, vec![Cell::text("a@x.com"), Cell::text("123")]);
    }

    #[test]
    fn test_parse_json_and_missing_keys() {
        let cells = ContactDecomposer::default()
            .parse(r#"{"email": "b@x.com", "mailing_address": "1 Main St"}"#)
            .unwrap();
        assert_eq!(cells, vec![Cell::text("b@x.com"), Cell::Null]);
    }

    #[test]
    fn test_parse_numeric_phone_as_text() {
        let cells = ContactDecomposer::default()
            .parse("{email: 'c@x.com', phone: 5551234}")
            .unwrap();
        assert_eq!(cells[1], Cell::text("5551234"));
    }

    #[test]
    fn test_parse_rejects_non_literals() {
        let decomposer = ContactDecomposer::default();
        assert_eq!(decomposer.parse("__import__('os').system('ls')"), None);
        assert_eq!(decomposer.parse("['a@x.com', '123']"), None);
        assert_eq!(decomposer.parse(""), None);
    }

    #[test]
    fn test_parse_python_keywords() {
        let decomposer = ContactDecomposer::default();
        assert_eq!(
            decomposer.parse("{'email': 'a@x.com', 'phone': None}"),
            Some(vec![Cell::text("a@x.com"), Cell::Null])
        );
        assert_eq!(
            decomposer.parse("{'email': 'None of True', 'phone': True}"),
            Some(vec![Cell::text("None of True"), Cell::text("true")])
        );
    }

    #[test]
    fn test_keywords_inside_strings_are_kept() {
        assert_eq!(
            json_keywords(r#"{'a': 'it\'s None', "b": False, None_x: 1}"#),
            r#"{'a': 'it\'s None', "b": false, None_x: 1}"#
        );
    }

    #[test]
    fn test_split_reports_ignored_keys() {
        let contacts = vec![
            Cell::text("{'mailing_address': '303 N Timber Key', 'email': 'x@woohoo.com'}"),
            Cell::text("{'email': 'y@woohoo.com', 'phone': '1', 'fax': '2'}"),
        ];

        let split = ContactDecomposer::default().split(&contacts);

        assert_eq!(split.rejected, 0);
        assert_eq!(
            split.ignored.into_iter().collect::<Vec<_>>(),
            ["fax", "mailing_address"]
        );
        assert_eq!(split.columns[0], [Cell::text("x@woohoo.com"), Cell::text("y@woohoo.com")]);
    }

    #[test]
    fn test_decompose_replaces_column() {
        let mut table = students(vec![
            Cell::text("{'email':'a@x.com','phone':'123'}"),
            Cell::Null,
            Cell::text("garbage"),
        ]);

        let rejected = ContactDecomposer::default().decompose(&mut table).unwrap();

        assert_eq!(rejected, 1);
        assert_eq!(table.columns(), ["uuid", "email", "phone"]);
        assert_eq!(table.get(0, "phone"), Some(&Cell::text("123")));
        assert_eq!(table.get(1, "email"), Some(&Cell::Null));
        assert_eq!(table.get(1, "phone"), Some(&Cell::Null));
        assert_eq!(table.get(2, "email"), Some(&Cell::Null));
    }

    #[test]
    fn test_decompose_without_contact_column() {
        let mut table =
            Table::from_rows("students", ["uuid"], vec![vec![Cell::text("s1")]]).unwrap();

        ContactDecomposer::default().decompose(&mut table).unwrap();

        assert_eq!(table.columns(), ["uuid", "email", "phone"]);
        assert_eq!(table.get(0, "email"), Some(&Cell::Null));
    }

    #[test]
    fn test_custom_fields() {
        let decomposer = ContactDecomposer::new(
            "contact_info",
            vec!["email".to_string(), "mailing_address".to_string()],
        );
        let mut table = students(vec![Cell::text(
            "{'mailing_address': '303 N Timber Key', 'email': 'x@woohoo.com'}",
        )]);

        decomposer.decompose(&mut table).unwrap();
        assert_eq!(
            table.get(0, "mailing_address"),
            Some(&Cell::text("303 N Timber Key"))
        );
    }
}
