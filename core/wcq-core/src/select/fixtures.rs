//! Layouts shared by the select unit tests.

use crate::schema::{FieldType, IndexedFields, Kind, TableLayout};
use crate::select::ast::RawStatement;
use crate::select::compiler::SelectCompiler;
use crate::select::statement::SelectStatement;
use crate::error::WcqResult;
use std::sync::Arc;

/// `users(id PRIMARY KEY, name, age, visits counter)`.
pub fn static_layout() -> Arc<TableLayout> {
    Arc::new(
        TableLayout::builder("users", Kind::Static, "id", FieldType::Utf8)
            .metadata("name", FieldType::Utf8)
            .metadata("age", FieldType::Int32)
            .metadata("visits", FieldType::Counter)
            .build()
            .unwrap(),
    )
}

/// `events(id, day, seq, kind, note, PRIMARY KEY (id, day, seq))`.
pub fn sparse_layout() -> Arc<TableLayout> {
    Arc::new(
        TableLayout::builder("events", Kind::Sparse, "id", FieldType::Utf8)
            .clustering("day", FieldType::Utf8)
            .clustering("seq", FieldType::Utf8)
            .metadata("kind", FieldType::Utf8)
            .metadata("note", FieldType::Utf8)
            .build()
            .unwrap(),
    )
}

/// `timeline(user, posted, body, PRIMARY KEY (user, posted)) WITH COMPACT STORAGE`.
pub fn dynamic_layout() -> Arc<TableLayout> {
    Arc::new(
        TableLayout::builder("timeline", Kind::Dynamic, "user", FieldType::Utf8)
            .clustering("posted", FieldType::Utf8)
            .value("body", FieldType::Utf8)
            .build()
            .unwrap(),
    )
}

/// `readings(sensor, c1, c2, c3, reading, PRIMARY KEY (sensor, c1, c2, c3)) WITH COMPACT STORAGE`.
pub fn dense_layout() -> Arc<TableLayout> {
    Arc::new(
        TableLayout::builder("readings", Kind::Dense, "sensor", FieldType::Utf8)
            .clustering("c1", FieldType::Utf8)
            .clustering("c2", FieldType::Utf8)
            .clustering("c3", FieldType::Utf8)
            .value("reading", FieldType::Utf8)
            .build()
            .unwrap(),
    )
}

pub fn indexed(names: &[&str]) -> IndexedFields {
    names.iter().copied().collect()
}

pub fn compile(raw: &RawStatement, layout: Arc<TableLayout>) -> WcqResult<SelectStatement> {
    SelectCompiler::new().compile(raw, layout, &indexed(&["kind", "name"]))
}
