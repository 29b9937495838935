//! Table layout descriptions consumed by the SELECT compiler.

pub mod layout;
pub mod types;

pub use layout::{FieldDef, FieldId, FieldRole, IndexedFields, Kind, TableLayout, TableLayoutBuilder};
pub use types::FieldType;
