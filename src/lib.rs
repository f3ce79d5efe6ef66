//! Cademycode ETL
//!
//! Cleans the raw student, job and course tables of the Cademycode SQLite
//! database, writes the cleaned tables to a sink database and exports a
//! denormalized flat file joining all three.

pub mod cli;
pub mod config;
pub mod error;
pub mod etl;
pub mod loader;
pub mod model;
pub mod record;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use error::EtlError;
pub use etl::{Extractor, IdentityTransformer, Loader, Pipeline, Transformer};
pub use loader::CleanDataLoader;
pub use model::{Entity, Tables};
pub use record::{Cell, Table};
pub use storage::{CsvExport, SqliteSink, SqliteSource};
pub use transform::CleaningTransformer;
