//! CLI helper functions

use crate::{
    config::PipelineConfig,
    etl::{Pipeline, PipelineReport},
    loader::CleanDataLoader,
    storage::SqliteSource,
    transform::CleaningTransformer,
};
use eyre::{Context, Result};

/// The pipeline the binary runs
pub type CleaningPipeline = Pipeline<SqliteSource, CleaningTransformer, CleanDataLoader>;

/// Assemble the pipeline from a resolved config
///
/// Pipeline: SqliteSource → CleaningTransformer → CleanDataLoader
pub fn build_pipeline(config: &PipelineConfig) -> Result<CleaningPipeline> {
    config.validate()?;
    let loader = config.loader().context("Invalid export settings")?;
    Ok(Pipeline::new(config.extractor(), config.transformer(), loader))
}

/// Extract, clean and load
pub async fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    log::debug!(
        "source={} sink={} export={}",
        config.source.display(),
        config.sink.display(),
        config.export_path.display()
    );
    build_pipeline(config)?.run().await
}

/// Extract and clean only; nothing is written
pub async fn check_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    log::debug!("source={}", config.source.display());
    build_pipeline(config)?.dry_run().await
}
