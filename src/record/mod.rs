//! In-memory record sets
//!
//! A [`Table`] is a named set of rows sharing one column schema, with the
//! handful of column and row operations the cleaning rules need: mapping a
//! column, filtering nulls, dropping exact duplicates, reshaping the schema
//! and left joins.

mod cell;
mod join;
mod table;

pub use cell::Cell;
pub use table::{Row, Table};

pub(crate) use cell::integral;
