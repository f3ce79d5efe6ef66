//! Fatal error kinds raised by the pipeline stages
//!
//! Malformed individual values are never errors: coercion turns them into
//! nulls. Only the structural and I/O failures below abort a run.

use thiserror::Error;

/// A failure that aborts the whole ETL run
///
/// Stages return `eyre::Result`, so the kind travels inside an
/// `eyre::Report`. Recover it with `report.downcast_ref::<EtlError>()`.
#[derive(Debug, Error)]
pub enum EtlError {
    /// The source store could not be opened or a table could not be read
    #[error("cannot read source {location}: {reason}")]
    SourceAccess { location: String, reason: String },

    /// An expected column is missing from a record set
    #[error("table '{table}' has no column '{column}'")]
    SchemaMismatch { table: String, column: String },

    /// A destination could not be written
    #[error("cannot write {target}: {reason}")]
    SinkWrite { target: String, reason: String },
}

impl EtlError {
    pub fn source_access(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceAccess {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema_mismatch(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn sink_write(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::SinkWrite {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
