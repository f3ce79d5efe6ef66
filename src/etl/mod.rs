//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Trait definitions for the three stages, and the [`Pipeline`] that runs
//! them strictly in sequence.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{Pipeline, PipelineReport, RunLog};
pub use transform::{IdentityTransformer, Transformer};
