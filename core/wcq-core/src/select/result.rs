//! Logical rows produced by [`SelectStatement::process`](crate::select::SelectStatement::process).

use crate::error::WcqResult;
use crate::schema::FieldType;
use arrow::array::{ArrayRef, BinaryArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::sync::Arc;

/// Timestamp reported for values that are not backed by a stored cell
/// (partition key, clustering components of non-compact tables).
pub const NO_TIMESTAMP: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    /// Display identifier from the select clause.
    pub name: String,
    /// `None` when the field is unset for this row.
    pub value: Option<Vec<u8>>,
    pub timestamp: i64,
}

impl ResultColumn {
    pub fn set(name: impl Into<String>, value: Vec<u8>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            timestamp,
        }
    }

    pub fn unset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            timestamp: NO_TIMESTAMP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub key: Vec<u8>,
    pub columns: Vec<ResultColumn>,
}

impl ResultRow {
    /// First column reported under `name`.
    pub fn get(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Value of the column reported under `name`, if set.
    pub fn value(&self, name: &str) -> Option<&[u8]> {
        self.get(name)?.value.as_deref()
    }
}

/// Output column description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    /// Short type name, e.g. `UTF8Type`.
    pub value_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMetadata {
    pub comparator: String,
    pub default_validator: &'static str,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub metadata: ResultMetadata,
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Single-row count result: one `LongType` column holding `count` as a
    /// big-endian `i64`, keyed by the column name.
    pub fn count(column: &str, count: usize) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let long_type = FieldType::BigInt.short_name();
        Self {
            metadata: ResultMetadata {
                comparator: FieldType::Utf8.short_name().to_string(),
                default_validator: long_type,
                columns: vec![ColumnSpec {
                    name: column.to_string(),
                    value_type: long_type,
                }],
            },
            rows: vec![ResultRow {
                key: column.as_bytes().to_vec(),
                columns: vec![ResultColumn::set(
                    column,
                    count.to_be_bytes().to_vec(),
                    NO_TIMESTAMP,
                )],
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Arrow view of the rows: one nullable `Binary` column per output column.
    ///
    /// Columns a row does not carry (static rows without cells) become nulls.
    pub fn to_record_batch(&self) -> WcqResult<RecordBatch> {
        let fields: Vec<Field> = self
            .metadata
            .columns
            .iter()
            .map(|spec| Field::new(spec.name.as_str(), DataType::Binary, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let arrays: Vec<ArrayRef> = self
            .metadata
            .columns
            .iter()
            .enumerate()
            .map(|(position, spec)| {
                let values: Vec<Option<&[u8]>> = self
                    .rows
                    .iter()
                    .map(|row| column_value(row, position, &spec.name))
                    .collect();
                Arc::new(BinaryArray::from(values)) as ArrayRef
            })
            .collect();

        let options = RecordBatchOptions::new().with_row_count(Some(self.rows.len()));
        Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
    }
}

/// Positional match first; rows that skipped columns fall back to the name.
fn column_value<'a>(row: &'a ResultRow, position: usize, name: &str) -> Option<&'a [u8]> {
    match row.columns.get(position) {
        Some(column) if column.name == name => column.value.as_deref(),
        _ => row.value(name),
    }
}
