//! Extractor trait for reading record sets from a source

use eyre::Result;

/// Extractor trait for reading everything a run needs from a source
///
/// Extraction is a full, unfiltered read. Implementors open their source,
/// materialize the records and release the source before returning.
///
/// # Example
/// ```no_run
/// use cademycode_etl::etl::Extractor;
/// use cademycode_etl::record::Table;
/// use eyre::Result;
///
/// struct FixtureExtractor {
///     table: Table,
/// }
///
/// impl Extractor for FixtureExtractor {
///     type Output = Table;
///
///     async fn extract(&self) -> Result<Self::Output> {
///         Ok(self.table.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// What one extraction produces
    type Output: Send;

    /// Read the source
    ///
    /// # Errors
    /// Returns an error if the source cannot be opened or read
    fn extract(&self) -> impl std::future::Future<Output = Result<Self::Output>> + Send;

    /// Human-readable source location for run logs
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
