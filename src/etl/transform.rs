//! Transformer trait for data transformation

use eyre::Result;

/// Transformer trait for transforming record sets
///
/// Transformers are pure: no I/O and no state outside their input.
///
/// # Example
/// ```
/// use cademycode_etl::etl::Transformer;
/// use cademycode_etl::record::{Cell, Table};
/// use eyre::Result;
///
/// struct DropDuplicates;
///
/// impl Transformer for DropDuplicates {
///     type Input = Table;
///     type Output = Table;
///
///     fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
///         input.drop_duplicates();
///         Ok(input)
///     }
/// }
///
/// let table = Table::from_rows(
///     "t",
///     ["id"],
///     vec![vec![Cell::Integer(1)], vec![Cell::Integer(1)]],
/// )
/// .unwrap();
/// assert_eq!(DropDuplicates.transform(table).unwrap().len(), 1);
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform the input
    ///
    /// # Errors
    /// Returns an error on structural problems such as a missing column
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Identity transformer that passes items through unchanged
///
/// The generic parameter T must be specified when creating the transformer.
pub struct IdentityTransformer<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for IdentityTransformer<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> IdentityTransformer<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Send + Sync> Transformer for IdentityTransformer<T> {
    type Input = T;
    type Output = T;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        Ok(input)
    }
}
