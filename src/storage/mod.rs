//! Storage backends
//!
//! - SQLite source holding the raw record sets
//! - SQLite sink receiving the cleaned record sets
//! - Delimited-text export of the joined record set

mod csv_export;
mod sqlite;

pub use csv_export::CsvExport;
pub use sqlite::{SqliteSink, SqliteSource};
