//! SELECT compiler — validates a raw statement against a table layout.
//!
//! Rules are checked in a fixed order and compilation stops at the first
//! violation:
//!
//! 1. LIMIT is strictly positive
//! 2. selection resolves (COUNT accepts only `*` and `1`)
//! 3. WHERE relations bind without conflicts
//! 4. clustering restrictions form an equality prefix, optionally closed by one range
//! 5. metadata restrictions are backed by an indexed equality
//! 6. reversed order needs an equality on the partition key

use crate::config::SelectConfig;
use crate::error::{WcqError, WcqResult};
use crate::operator::Operator;
use crate::schema::{FieldId, FieldRole, IndexedFields, TableLayout};
use crate::select::ast::{ColumnIdentifier, RawStatement, Relation};
use crate::select::restriction::{Bound, RestrictionBuilder};
use crate::select::statement::{SelectStatement, Selected};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Compiles [`RawStatement`]s into [`SelectStatement`]s.
#[derive(Debug, Clone, Default)]
pub struct SelectCompiler {
    config: SelectConfig,
}

impl SelectCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SelectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// Validates and binds `raw` against `layout`.
    ///
    /// `indexed` is the set of indexed field names at compile time.
    #[instrument(skip_all, fields(table = %raw.table))]
    pub fn compile(
        &self,
        raw: &RawStatement,
        layout: Arc<TableLayout>,
        indexed: &IndexedFields,
    ) -> WcqResult<SelectStatement> {
        let params = &raw.parameters;
        if params.limit <= 0 {
            return Err(WcqError::InvalidLimit(params.limit));
        }
        let limit = usize::try_from(params.limit).unwrap_or(usize::MAX);

        if self.config.normalize(&raw.table, false) != layout.name() && raw.table != layout.name() {
            return Err(WcqError::Schema(format!(
                "statement targets table '{}' but the layout describes '{}'",
                raw.table,
                layout.name()
            )));
        }

        let selection = self.bind_selection(raw, &layout)?;
        let mut builder = self.bind_where(raw, &layout)?;
        check_clustering_prefix(&builder, &layout)?;
        let has_indexed_expression = check_indexed(&mut builder, &layout, indexed)?;

        if params.reversed {
            let key = builder.get(layout.partition_key());
            if !key.is_some_and(|r| r.is_equality()) {
                return Err(WcqError::UnsupportedReversal);
            }
        }

        let restrictions = builder.freeze();
        debug!(
            target: "wcq",
            kind = ?layout.kind(),
            selected = selection.len(),
            restricted = restrictions.len(),
            has_indexed_expression,
            limit,
            "compiled select"
        );

        Ok(SelectStatement {
            layout,
            parameters: params.clone(),
            limit,
            selection,
            restrictions,
            has_indexed_expression,
            count_column: self.config.count_column.clone(),
        })
    }

    fn resolve(&self, layout: &TableLayout, ident: &ColumnIdentifier) -> Option<FieldId> {
        layout.lookup(&self.config.normalize(&ident.text, ident.quoted))
    }

    fn bind_selection(&self, raw: &RawStatement, layout: &TableLayout) -> WcqResult<Vec<Selected>> {
        if raw.parameters.count {
            return match raw.select_clause.as_slice() {
                [arg] if !arg.quoted && (arg.text == "*" || arg.text == "1") => Ok(Vec::new()),
                _ => Err(WcqError::UnsupportedCount),
            };
        }

        raw.select_clause
            .iter()
            .map(|ident| {
                let field = self.resolve(layout, ident).ok_or_else(|| WcqError::UnknownField {
                    name: ident.text.clone(),
                    clause: "selection",
                })?;
                Ok(Selected {
                    field,
                    display: ident.text.clone(),
                })
            })
            .collect()
    }

    fn bind_where(&self, raw: &RawStatement, layout: &TableLayout) -> WcqResult<RestrictionBuilder> {
        let mut builder = RestrictionBuilder::new();
        for relation in &raw.where_clause {
            let entity = relation.entity();
            let field = self.resolve(layout, entity).ok_or_else(|| WcqError::UnknownField {
                name: entity.text.clone(),
                clause: "where",
            })?;
            let def = layout.field(field);
            let name = def.name();

            if def.role() == FieldRole::Value {
                return Err(WcqError::UnsupportedRestriction(format!(
                    "restricting the value of a compact table ('{name}') is not supported"
                )));
            }

            match relation {
                Relation::Compare { op, value, .. } => match op {
                    Operator::Eq => builder.add_equality(field, name, value.clone())?,
                    Operator::Gt | Operator::Gte => {
                        let bound = Bound {
                            term: value.clone(),
                            inclusive: *op == Operator::Gte,
                        };
                        builder.add_bound(field, name, true, bound)?
                    }
                    Operator::Lt | Operator::Lte => {
                        let bound = Bound {
                            term: value.clone(),
                            inclusive: *op == Operator::Lte,
                        };
                        builder.add_bound(field, name, false, bound)?
                    }
                },
                Relation::In { values, .. } => {
                    if def.role() != FieldRole::PartitionKey && builder.get(field).is_none() {
                        return Err(WcqError::UnsupportedRestriction(format!(
                            "IN relation on '{name}': IN is only supported on the partition key"
                        )));
                    }
                    builder.add_in(field, name, values.clone())?
                }
            }
        }
        Ok(builder)
    }
}

/// Compiles with the default configuration.
pub fn compile(
    raw: &RawStatement,
    layout: Arc<TableLayout>,
    indexed: &IndexedFields,
) -> WcqResult<SelectStatement> {
    SelectCompiler::new().compile(raw, layout, indexed)
}

/// Once a clustering field is unrestricted or range-restricted, every later
/// clustering field must be unrestricted.
fn check_clustering_prefix(builder: &RestrictionBuilder, layout: &TableLayout) -> WcqResult<()> {
    let mut should_be_done = false;
    let mut previous: Option<&str> = None;
    for &id in layout.clustering() {
        let name = layout.field(id).name();
        match builder.get(id) {
            None => should_be_done = true,
            Some(_) if should_be_done => {
                return Err(WcqError::NonPrefixRestriction {
                    field: name.to_string(),
                    previous: previous.unwrap_or_default().to_string(),
                });
            }
            Some(r) if !r.is_equality() => should_be_done = true,
            Some(_) => {}
        }
        previous = Some(name);
    }
    Ok(())
}

/// Returns whether any metadata field is restricted, rewriting a partition
/// key equality into a closed range when it is.
fn check_indexed(
    builder: &mut RestrictionBuilder,
    layout: &TableLayout,
    indexed: &IndexedFields,
) -> WcqResult<bool> {
    let mut has_indexed_expression = false;
    let mut has_indexed_equality = false;
    for &id in layout.metadata() {
        let Some(restriction) = builder.get(id) else {
            continue;
        };
        has_indexed_expression = true;
        if restriction.is_equality() && indexed.contains(layout.field(id).key()) {
            has_indexed_equality = true;
        }
    }

    if !has_indexed_expression {
        return Ok(false);
    }
    if !has_indexed_equality {
        return Err(WcqError::NoIndexedEquality);
    }

    let key = layout.partition_key();
    if let Some(restriction) = builder.get(key) {
        if restriction.eq_values().len() > 1 {
            return Err(WcqError::IndexedInUnsupported);
        }
        builder.equality_to_range(key);
    }
    Ok(true)
}
