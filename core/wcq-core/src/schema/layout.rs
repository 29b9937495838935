//! Table layout — the physical shape a SELECT is compiled against.
//!
//! Fields are kept in schema order: partition key, clustering fields, value
//! field, then metadata fields. Wildcard selections expand in that order.

use crate::error::{WcqError, WcqResult};
use crate::schema::types::FieldType;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// How logical rows map onto physical cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// No clustering fields, one named cell per metadata field.
    Static,
    /// Composite cell names `[clustering..., metadata name]`.
    Sparse,
    /// One clustering field whose value is the cell name.
    Dynamic,
    /// Composite cell names `[clustering...]`, cell value is the value field.
    Dense,
}

impl Kind {
    pub fn is_compact(&self) -> bool {
        matches!(self, Kind::Dynamic | Kind::Dense)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::Sparse | Kind::Dense)
    }
}

/// Role of a field in the physical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldRole {
    PartitionKey,
    /// Clustering field at the given composite position.
    Clustering(usize),
    Value,
    Metadata,
}

/// Position of a field in [`TableLayout::fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    name: String,
    role: FieldRole,
    field_type: FieldType,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary name of the field, used as the cell name component.
    pub fn key(&self) -> &[u8] {
        self.name.as_bytes()
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// Read-only description of a table.
#[derive(Debug, Clone)]
pub struct TableLayout {
    name: String,
    kind: Kind,
    fields: Vec<FieldDef>,
    clustering: Vec<FieldId>,
    value: Option<FieldId>,
    metadata: Vec<FieldId>,
    by_name: AHashMap<String, FieldId>,
}

impl TableLayout {
    pub fn builder(
        name: impl Into<String>,
        kind: Kind,
        key_name: impl Into<String>,
        key_type: FieldType,
    ) -> TableLayoutBuilder {
        TableLayoutBuilder {
            name: name.into(),
            kind,
            key: (key_name.into(), key_type),
            clustering: Vec::new(),
            value: None,
            metadata: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> {
        (0..self.fields.len()).map(FieldId)
    }

    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.fields[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    /// The partition key is always the first field.
    pub fn partition_key(&self) -> FieldId {
        FieldId(0)
    }

    pub fn clustering(&self) -> &[FieldId] {
        &self.clustering
    }

    pub fn value(&self) -> Option<FieldId> {
        self.value
    }

    pub fn metadata(&self) -> &[FieldId] {
        &self.metadata
    }

    /// Number of components in a stored cell name; zero for non-composite kinds.
    pub fn composite_arity(&self) -> usize {
        match self.kind {
            Kind::Sparse => self.clustering.len() + 1,
            Kind::Dense => self.clustering.len(),
            Kind::Static | Kind::Dynamic => 0,
        }
    }

    /// Type name of the cell-name comparator.
    pub fn comparator_name(&self) -> String {
        match self.kind {
            Kind::Static => FieldType::Utf8.short_name().to_string(),
            Kind::Dynamic => self.field(self.clustering[0]).field_type.short_name().to_string(),
            Kind::Sparse | Kind::Dense => {
                let mut parts: Vec<&str> = self
                    .clustering
                    .iter()
                    .map(|id| self.field(*id).field_type.short_name())
                    .collect();
                if self.kind == Kind::Sparse {
                    parts.push(FieldType::Utf8.short_name());
                }
                format!("CompositeType({})", parts.join(","))
            }
        }
    }

    /// Type name of cell values when nothing more specific applies.
    pub fn default_validator_name(&self) -> &'static str {
        match self.value {
            Some(id) => self.field(id).field_type.short_name(),
            None => FieldType::Bytes.short_name(),
        }
    }
}

pub struct TableLayoutBuilder {
    name: String,
    kind: Kind,
    key: (String, FieldType),
    clustering: Vec<(String, FieldType)>,
    value: Option<(String, FieldType)>,
    metadata: Vec<(String, FieldType)>,
}

impl TableLayoutBuilder {
    pub fn clustering(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.clustering.push((name.into(), field_type));
        self
    }

    pub fn value(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.value = Some((name.into(), field_type));
        self
    }

    pub fn metadata(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.metadata.push((name.into(), field_type));
        self
    }

    /// Validates the field set against the layout kind.
    pub fn build(self) -> WcqResult<TableLayout> {
        let schema_err = |msg: &str| WcqError::Schema(format!("table '{}': {msg}", self.name));
        let n_clustering = self.clustering.len();
        let has_value = self.value.is_some();
        let n_metadata = self.metadata.len();

        match self.kind {
            Kind::Static if n_clustering > 0 || has_value => {
                return Err(schema_err("static tables have no clustering or value field"));
            }
            Kind::Sparse if n_clustering == 0 || has_value => {
                return Err(schema_err(
                    "sparse tables need clustering fields and no value field",
                ));
            }
            Kind::Dynamic if n_clustering != 1 || n_metadata > 0 => {
                return Err(schema_err(
                    "dynamic tables have exactly one clustering field and no metadata",
                ));
            }
            Kind::Dense if n_clustering == 0 || !has_value || n_metadata > 0 => {
                return Err(schema_err(
                    "dense tables need clustering fields, a value field and no metadata",
                ));
            }
            _ => {}
        }

        let mut fields = Vec::with_capacity(1 + n_clustering + n_metadata + has_value as usize);
        fields.push(FieldDef {
            name: self.key.0,
            role: FieldRole::PartitionKey,
            field_type: self.key.1,
        });
        let mut clustering = Vec::with_capacity(n_clustering);
        for (position, (name, field_type)) in self.clustering.into_iter().enumerate() {
            clustering.push(FieldId(fields.len()));
            fields.push(FieldDef {
                name,
                role: FieldRole::Clustering(position),
                field_type,
            });
        }
        let value = self.value.map(|(name, field_type)| {
            fields.push(FieldDef {
                name,
                role: FieldRole::Value,
                field_type,
            });
            FieldId(fields.len() - 1)
        });
        let mut metadata = Vec::with_capacity(n_metadata);
        for (name, field_type) in self.metadata {
            metadata.push(FieldId(fields.len()));
            fields.push(FieldDef {
                name,
                role: FieldRole::Metadata,
                field_type,
            });
        }

        let mut by_name = AHashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), FieldId(idx)).is_some() {
                return Err(WcqError::Schema(format!(
                    "table '{}': duplicate field '{}'",
                    self.name, field.name
                )));
            }
        }

        Ok(TableLayout {
            name: self.name,
            kind: self.kind,
            fields,
            clustering,
            value,
            metadata,
            by_name,
        })
    }
}

/// Snapshot of the indexed field names of a table, taken from the index
/// manager when the statement is compiled.
#[derive(Debug, Clone, Default)]
pub struct IndexedFields {
    names: AHashSet<Vec<u8>>,
}

impl IndexedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.names.contains(key)
    }
}

impl<S: AsRef<str>> FromIterator<S> for IndexedFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|s| s.as_ref().as_bytes().to_vec())
                .collect(),
        }
    }
}
