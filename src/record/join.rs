//! Left join of two record sets

use super::cell::JoinKey;
use super::{Cell, Row, Table};

use eyre::Result;
use std::collections::HashMap;

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

impl Table {
    /// Left join `right` onto `self` where `self[left_on] == right[right_on]`
    ///
    /// Every left row is kept, in order. A left row with several matches is
    /// repeated once per match; one with no match gets nulls for every right
    /// column. Null keys never match.
    ///
    /// When both key columns share a name, the right key is not repeated in
    /// the output. Other clashing names get `_x` / `_y` suffixes.
    ///
    /// # Example
    /// ```
    /// use cademycode_etl::record::{Cell, Table};
    ///
    /// let students = Table::from_rows(
    ///     "students",
    ///     ["student_id", "job_id"],
    ///     vec![
    ///         vec![Cell::text("s1"), Cell::Integer(1)],
    ///         vec![Cell::text("s2"), Cell::Integer(9)],
    ///     ],
    /// )
    /// .unwrap();
    /// let jobs = Table::from_rows(
    ///     "jobs",
    ///     ["job_id", "job_category"],
    ///     vec![vec![Cell::Integer(1), Cell::text("analytics")]],
    /// )
    /// .unwrap();
    ///
    /// let joined = students.left_join(&jobs, "job_id", "job_id").unwrap();
    /// assert_eq!(joined.columns(), ["student_id", "job_id", "job_category"]);
    /// assert_eq!(joined.len(), 2);
    /// assert_eq!(joined.get(1, "job_category"), Some(&Cell::Null));
    /// ```
    pub fn left_join(&self, right: &Table, left_on: &str, right_on: &str) -> Result<Table> {
        let left_key = self.require_column(left_on)?;
        let right_key = right.require_column(right_on)?;
        let shared_key = left_on == right_on;

        // Right columns carried into the output
        let right_cols: Vec<usize> = (0..right.columns().len())
            .filter(|&i| !(shared_key && i == right_key))
            .collect();

        let columns = joined_columns(self, right, &right_cols);

        let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows().iter().enumerate() {
            if let Some(key) = row[right_key].join_key() {
                index.entry(key).or_default().push(i);
            }
        }

        let mut joined = Table::new(format!("{}_{}", self.name(), right.name()), columns);
        for row in self.rows() {
            let matches = row[left_key].join_key().and_then(|key| index.get(&key));
            match matches {
                Some(matches) => {
                    for &m in matches {
                        let right_row = &right.rows()[m];
                        let cells = right_cols.iter().map(|&i| right_row[i].clone());
                        joined.push_row(combine(row, cells))?;
                    }
                }
                None => {
                    joined.push_row(combine(row, right_cols.iter().map(|_| Cell::Null)))?;
                }
            }
        }

        Ok(joined)
    }
}

fn combine(left: &[Cell], right: impl Iterator<Item = Cell>) -> Row {
    left.iter().cloned().chain(right).collect()
}

fn joined_columns(left: &Table, right: &Table, right_cols: &[usize]) -> Vec<String> {
    let right_names: Vec<&str> = right_cols
        .iter()
        .map(|&i| right.columns()[i].as_str())
        .collect();

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .map(|name| match right_names.contains(&name.as_str()) {
            true => format!("{}{}", name, LEFT_SUFFIX),
            false => name.clone(),
        })
        .collect();

    columns.extend(right_names.iter().map(|&name| match left.has_column(name) {
        true => format!("{}{}", name, RIGHT_SUFFIX),
        false => name.to_string(),
    }));

    columns
}
