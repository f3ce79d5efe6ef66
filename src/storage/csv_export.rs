//! Delimited-text export of the joined record set

use crate::error::EtlError;
use crate::record::Table;

use eyre::Result;
use std::path::{Path, PathBuf};

/// Writes a table as delimited text with a header row
///
/// Nulls are written as empty fields, dates as `YYYY-MM-DD` and whole reals
/// keep a `.0` suffix. No row index column is written.
#[derive(Debug, Clone)]
pub struct CsvExport {
    path: PathBuf,
    delimiter: u8,
}

impl CsvExport {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sink_error(&self, reason: impl ToString) -> EtlError {
        EtlError::sink_write(self.path.display().to_string(), reason)
    }

    /// Write `table`, replacing any existing file
    ///
    /// Returns the number of data rows written.
    pub fn write(&self, table: &Table) -> Result<usize> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&self.path)
            .map_err(|e| self.sink_error(e))?;

        writer
            .write_record(table.columns())
            .map_err(|e| self.sink_error(e))?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(|e| self.sink_error(e))?;
        }
        writer.flush().map_err(|e| self.sink_error(e))?;

        log::debug!("Wrote {} rows to {}", table.len(), self.path.display());
        Ok(table.len())
    }
}
