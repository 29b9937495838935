//! SELECT 처리 모듈
//!
//! Compiles a raw statement against a table layout, derives the storage scan
//! bounds from it and folds the fetched cells back into logical rows.

pub mod ast;
pub mod bounds;
pub mod compiler;
pub mod process;
pub mod restriction;
pub mod result;
pub mod statement;

#[cfg(test)]
mod compiler_tests;
#[cfg(test)]
mod fixtures;

// Re-export main types
pub use ast::{ColumnIdentifier, ConsistencyLevel, Parameters, RawStatement, Relation, Term};
pub use bounds::{IndexExpression, KeyBounds, KeyRange};
pub use compiler::{SelectCompiler, compile};
pub use restriction::{Bound, Restriction, Restrictions};
pub use result::{ColumnSpec, NO_TIMESTAMP, ResultColumn, ResultMetadata, ResultRow, ResultSet};
pub use statement::{SelectStatement, Selected};
