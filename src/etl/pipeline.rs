//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use crate::model::{Cleaned, Entity, RowCounts, RuleCount, Tables};

use eyre::{Result, WrapErr};
use std::fmt;

const LOG_TARGET: &str = "cademycode_etl::run";

/// Log handle scoped to a single pipeline run
///
/// Every message is stamped with the run id so interleaved output from
/// separate invocations stays attributable.
#[derive(Debug, Clone)]
pub struct RunLog {
    run_id: String,
}

impl RunLog {
    /// Open a log handle for a new run
    pub fn start() -> Self {
        Self {
            run_id: chrono::Local::now().format("%Y%m%dT%H%M%S%.3f").to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn info(&self, message: fmt::Arguments<'_>) {
        log::info!(target: LOG_TARGET, "[{}] {}", self.run_id, message);
    }

    pub fn debug(&self, message: fmt::Arguments<'_>) {
        log::debug!(target: LOG_TARGET, "[{}] {}", self.run_id, message);
    }

    pub fn warn(&self, message: fmt::Arguments<'_>) {
        log::warn!(target: LOG_TARGET, "[{}] {}", self.run_id, message);
    }

    pub fn error(&self, message: fmt::Arguments<'_>) {
        log::error!(target: LOG_TARGET, "[{}] {}", self.run_id, message);
    }
}

/// What a pipeline run did
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: String,
    /// Row counts at extraction time
    pub raw_counts: RowCounts,
    /// Row counts after every cleaning rule
    pub clean_counts: RowCounts,
    /// Per-rule row counts, in rule order
    pub trace: Vec<RuleCount>,
    /// Rows written to the flat export; `None` when nothing was loaded
    pub exported_rows: Option<usize>,
}

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// Stages run strictly in sequence; a failure in any stage aborts the run
/// and later stages never start.
///
/// # Type Parameters
/// - `E`: Extractor producing the raw record sets
/// - `T`: Transformer cleaning them
/// - `L`: Loader persisting the cleaned record sets
///
/// # Example
/// ```no_run
/// use cademycode_etl::etl::Pipeline;
/// use cademycode_etl::loader::CleanDataLoader;
/// use cademycode_etl::storage::{CsvExport, SqliteSink, SqliteSource};
/// use cademycode_etl::transform::CleaningTransformer;
///
/// # async fn example() -> eyre::Result<()> {
/// let pipeline = Pipeline::new(
///     SqliteSource::new("cademycode.db"),
///     CleaningTransformer::default(),
///     CleanDataLoader::new(SqliteSink::new("clean.db"), CsvExport::new("clean.csv")),
/// );
///
/// let report = pipeline.run().await?;
/// println!("Exported {:?} rows", report.exported_rows);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor<Output = Tables>,
    T: Transformer<Input = Tables, Output = Cleaned>,
    L: Loader<Input = Tables>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract the raw record sets from the source
    /// 2. Clean them
    /// 3. Load the cleaned record sets and the joined export
    ///
    /// # Errors
    /// Returns an error if any stage fails. Tables already written by the
    /// loader are left in place.
    pub async fn run(&self) -> Result<PipelineReport> {
        let log = RunLog::start();
        log.info(format_args!("ETL pipeline started"));

        let result = self.execute(&log, true).await;
        match &result {
            Ok(_) => log.info(format_args!("ETL pipeline completed successfully")),
            Err(e) => log.error(format_args!("ETL pipeline failed: {:#}", e)),
        }
        result
    }

    /// Extract and clean without loading anything
    ///
    /// # Errors
    /// Returns an error if extraction or cleaning fails
    pub async fn dry_run(&self) -> Result<PipelineReport> {
        let log = RunLog::start();
        log.info(format_args!("ETL dry run started, nothing will be written"));

        let result = self.execute(&log, false).await;
        match &result {
            Ok(_) => log.info(format_args!("ETL dry run completed")),
            Err(e) => log.error(format_args!("ETL dry run failed: {:#}", e)),
        }
        result
    }

    async fn execute(&self, log: &RunLog, load: bool) -> Result<PipelineReport> {
        // Extract
        log.info(format_args!("Extracting data from {}", self.extractor.describe()));
        let raw = self
            .extractor
            .extract()
            .await
            .wrap_err("Extract stage failed")?;
        let raw_counts = raw.row_counts();
        log.info(format_args!("Row counts before cleaning: {}", raw_counts));

        // Transform
        log.info(format_args!("Transforming data"));
        let cleaned = self
            .transformer
            .transform(raw)
            .wrap_err("Transform stage failed")?;
        for step in &cleaned.trace {
            log.debug(format_args!("{}", step));
        }
        let clean_counts = cleaned.row_counts();
        log.info(format_args!("Row counts after cleaning: {}", clean_counts));

        if clean_counts.get(Entity::Students) == 0 {
            log.warn(format_args!("No student rows survived cleaning"));
        }

        let Cleaned { tables, trace } = cleaned;

        // Load
        let exported_rows = if load {
            log.info(format_args!("Loading cleaned data into {}", self.loader.describe()));
            let rows = self
                .loader
                .load(tables)
                .await
                .wrap_err("Load stage failed")?;
            log.info(format_args!(
                "Load complete: cleaned tables written, {} joined row(s) exported",
                rows
            ));
            Some(rows)
        } else {
            None
        };

        Ok(PipelineReport {
            run_id: log.run_id().to_string(),
            raw_counts,
            clean_counts,
            trace,
            exported_rows,
        })
    }
}
