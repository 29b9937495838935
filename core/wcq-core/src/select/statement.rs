//! Compiled SELECT statement.
//!
//! Built once by [`crate::select::SelectCompiler`] and immutable afterwards.
//! Bound variables are passed to every call instead of being stored, so one
//! statement can serve many executions concurrently.

use crate::error::WcqResult;
use crate::schema::{FieldId, TableLayout};
use crate::select::ast::{ConsistencyLevel, Parameters, Term};
use crate::select::restriction::{Restriction, Restrictions};
use std::borrow::Cow;
use std::sync::Arc;

/// A selected field and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub field: FieldId,
    /// Identifier exactly as the caller wrote it.
    pub display: String,
}

#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub(crate) layout: Arc<TableLayout>,
    pub(crate) parameters: Parameters,
    pub(crate) limit: usize,
    /// Empty means wildcard.
    pub(crate) selection: Vec<Selected>,
    pub(crate) restrictions: Restrictions,
    pub(crate) has_indexed_expression: bool,
    pub(crate) count_column: String,
}

impl SelectStatement {
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn table(&self) -> &str {
        self.layout.name()
    }

    pub fn consistency(&self) -> ConsistencyLevel {
        self.parameters.consistency
    }

    /// Maximum number of logical rows returned.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of cells the storage layer should fetch to fill `limit()` rows.
    ///
    /// Non-compact tables fold one cell per metadata field into each row.
    pub fn fetch_limit(&self) -> usize {
        if self.layout.kind().is_compact() {
            self.limit
        } else {
            self.layout.metadata().len().max(1).saturating_mul(self.limit)
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.parameters.reversed
    }

    pub fn is_count(&self) -> bool {
        self.parameters.count
    }

    pub fn is_wildcard(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn has_indexed_expression(&self) -> bool {
        self.has_indexed_expression
    }

    pub fn restriction(&self, field: FieldId) -> Option<&Restriction> {
        self.restrictions.get(field)
    }

    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    /// Selected fields, with the wildcard expanded to schema order.
    pub fn expanded_selection(&self) -> Cow<'_, [Selected]> {
        if self.selection.is_empty() {
            Cow::Owned(
                self.layout
                    .field_ids()
                    .map(|field| Selected {
                        field,
                        display: self.layout.field(field).name().to_string(),
                    })
                    .collect(),
            )
        } else {
            Cow::Borrowed(&self.selection)
        }
    }

    /// Binary value of `term` typed as `field`.
    pub(crate) fn bind(
        &self,
        field: FieldId,
        term: &Term,
        variables: &[Vec<u8>],
    ) -> WcqResult<Vec<u8>> {
        let def = self.layout.field(field);
        term.to_bytes(def.name(), def.field_type(), variables)
    }

    /// Like [`bind`](Self::bind), in the comparable form used inside cell names.
    pub(crate) fn bind_component(
        &self,
        field: FieldId,
        term: &Term,
        variables: &[Vec<u8>],
    ) -> WcqResult<Vec<u8>> {
        let value = self.bind(field, term, variables)?;
        Ok(self.layout.field(field).field_type().to_comparable(&value))
    }
}
