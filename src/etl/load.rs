//! Loader trait for writing cleaned record sets to destinations

use eyre::Result;

/// Loader trait for persisting a run's output
///
/// Returns the number of rows written to the primary destination.
///
/// # Example
/// ```no_run
/// use cademycode_etl::etl::Loader;
/// use cademycode_etl::record::Table;
/// use eyre::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Input = Table;
///
///     async fn load(&self, input: Self::Input) -> Result<usize> {
///         Ok(input.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// What the loader consumes
    type Input: Send;

    /// Write `input` to the destination
    ///
    /// # Errors
    /// Returns an error if a destination cannot be written
    fn load(&self, input: Self::Input) -> impl std::future::Future<Output = Result<usize>> + Send;

    /// Human-readable destination for run logs
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
