//! In-memory record set with a named column schema

use super::Cell;
use crate::error::EtlError;

use eyre::{Result, ensure};
use std::collections::HashSet;

/// A row of cells, positionally aligned with [`Table::columns`]
pub type Row = Vec<Cell>;

/// A named table of rows sharing one column schema
///
/// Every row always has exactly one cell per column; the mutating
/// operations below keep that invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from column names and rows
    ///
    /// # Errors
    /// Returns an error if any row's width differs from the column count
    pub fn from_rows<C: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = C>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        let mut table = Self::new(name, columns.into_iter().map(Into::into).collect());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Row) -> Result<()> {
        ensure!(
            row.len() == self.columns.len(),
            "Row has {} cells but table '{}' has {} columns",
            row.len(),
            self.name,
            self.columns.len()
        );
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Index of a column that must exist
    ///
    /// # Errors
    /// Returns [`EtlError::SchemaMismatch`] when the column is absent
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| EtlError::schema_mismatch(&self.name, column).into())
    }

    /// Cell at `row` in the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// All cells of one column, in row order
    pub fn column_values(&self, column: &str) -> Result<Vec<&Cell>> {
        let idx = self.require_column(column)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Replace every cell of a column with `f(cell)`
    ///
    /// Returns how many non-null cells became null.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<usize>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let idx = self.require_column(column)?;
        let mut nulled = 0;
        for row in &mut self.rows {
            let mapped = f(&row[idx]);
            if mapped.is_null() && !row[idx].is_null() {
                nulled += 1;
            }
            row[idx] = mapped;
        }
        Ok(nulled)
    }

    /// Keep only rows for which the predicate holds; returns rows removed
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Drop rows holding a null in any of the given columns
    ///
    /// Returns the number of rows removed.
    pub fn drop_nulls(&mut self, columns: &[&str]) -> Result<usize> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.retain_rows(|row| indices.iter().all(|&i| !row[i].is_null())))
    }

    /// Remove rows identical in every column to an earlier row
    ///
    /// The first occurrence is kept and row order is preserved. Returns the
    /// number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let mut seen: HashSet<Row> = HashSet::with_capacity(self.rows.len());
        self.retain_rows(|row| seen.insert(row.to_vec()))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let idx = self.require_column(from)?;
        ensure!(
            from == to || !self.has_column(to),
            EtlError::schema_mismatch(&self.name, format!("{} (already exists)", to))
        );
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// Remove a column from the schema, returning its cells
    pub fn drop_column(&mut self, column: &str) -> Result<Vec<Cell>> {
        let idx = self.require_column(column)?;
        self.columns.remove(idx);
        Ok(self.rows.iter_mut().map(|row| row.remove(idx)).collect())
    }

    /// Add a column at the end of the schema
    ///
    /// # Errors
    /// Fails if the name is taken or `values` does not have one cell per row
    pub fn append_column(&mut self, column: impl Into<String>, values: Vec<Cell>) -> Result<()> {
        let column = column.into();
        ensure!(
            !self.has_column(&column),
            EtlError::schema_mismatch(&self.name, format!("{} (already exists)", column))
        );
        ensure!(
            values.len() == self.rows.len(),
            "Column '{}' has {} values but table '{}' has {} rows",
            column,
            values.len(),
            self.name,
            self.rows.len()
        );
        self.columns.push(column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}
