//! Scan bounds and index expressions derived from a compiled statement.
//!
//! The storage layer asks two questions: which partitions (`key_bounds`) and
//! which cells inside them. Cells are either an explicit name list
//! (`requested_columns`) or a slice (`requested_bounds`); `is_column_range`
//! decides which one applies and calling the other is a contract violation.
//! Clustering values go into cell names in their comparable form
//! ([`FieldType::to_comparable`](crate::schema::FieldType::to_comparable)).

use crate::codec::CompositeBuilder;
use crate::error::{WcqError, WcqResult};
use crate::operator::Operator;
use crate::schema::{FieldRole, Kind};
use crate::select::restriction::Restriction;
use crate::select::statement::SelectStatement;

/// Partition-key part of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBounds {
    /// Exact partition keys.
    Keys(Vec<Vec<u8>>),
    Range(KeyRange),
}

/// Partition-key range. An empty side is unbounded and reported inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: Vec<u8>,
    pub start_inclusive: bool,
    pub end: Vec<u8>,
    pub end_inclusive: bool,
}

/// Predicate handed to the secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpression {
    pub column: Vec<u8>,
    pub op: Operator,
    pub value: Vec<u8>,
}

impl SelectStatement {
    pub fn is_key_range(&self) -> bool {
        if self.has_indexed_expression {
            return true;
        }
        !self
            .restrictions
            .get(self.layout.partition_key())
            .is_some_and(Restriction::is_equality)
    }

    /// Exact partition keys; only valid when `!is_key_range()`.
    pub fn keys(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<Vec<u8>>> {
        let key = self.layout.partition_key();
        match self.restrictions.get(key) {
            Some(Restriction::Equality(values)) => values
                .iter()
                .map(|term| self.bind(key, term, variables))
                .collect(),
            _ => Err(WcqError::assertion(
                "keys() requires an equality on the partition key",
            )),
        }
    }

    pub fn key_bounds(&self, variables: &[Vec<u8>]) -> WcqResult<KeyBounds> {
        if !self.is_key_range() {
            return Ok(KeyBounds::Keys(self.keys(variables)?));
        }
        Ok(KeyBounds::Range(KeyRange {
            start: self.key_bound(true, variables)?,
            start_inclusive: self.include_key_bound(true),
            end: self.key_bound(false, variables)?,
            end_inclusive: self.include_key_bound(false),
        }))
    }

    pub fn key_start(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<u8>> {
        self.key_bound(true, variables)
    }

    pub fn key_finish(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<u8>> {
        self.key_bound(false, variables)
    }

    pub fn include_start_key(&self) -> bool {
        self.include_key_bound(true)
    }

    pub fn include_finish_key(&self) -> bool {
        self.include_key_bound(false)
    }

    fn key_bound(&self, is_start: bool, variables: &[Vec<u8>]) -> WcqResult<Vec<u8>> {
        let key = self.layout.partition_key();
        match self.restrictions.get(key) {
            None => Ok(Vec::new()),
            Some(r @ Restriction::Equality(_)) => {
                let term = r.single_value().ok_or_else(|| {
                    WcqError::assertion("a multi-valued partition key has no single bound")
                })?;
                self.bind(key, term, variables)
            }
            Some(r) => match r.bound(is_start) {
                Some(bound) => self.bind(key, &bound.term, variables),
                None => Ok(Vec::new()),
            },
        }
    }

    fn include_key_bound(&self, is_start: bool) -> bool {
        match self.restrictions.get(self.layout.partition_key()) {
            None | Some(Restriction::Equality(_)) => true,
            Some(r) => r.bound(is_start).is_none_or(|b| b.inclusive),
        }
    }

    /// Whether cells are selected by slice rather than by name.
    pub fn is_column_range(&self) -> bool {
        if self.layout.kind() == Kind::Static {
            return false;
        }
        self.layout
            .clustering()
            .iter()
            .any(|&id| !self.restrictions.get(id).is_some_and(Restriction::is_equality))
    }

    /// Composite prefix of every clustering equality.
    fn clustering_prefix(&self, variables: &[Vec<u8>]) -> WcqResult<CompositeBuilder> {
        let mut builder = CompositeBuilder::new(self.layout.composite_arity());
        for &id in self.layout.clustering() {
            let term = self
                .restrictions
                .get(id)
                .and_then(Restriction::single_value)
                .ok_or_else(|| {
                    WcqError::assertion(format!(
                        "clustering field '{}' is not bound by a single equality",
                        self.layout.field(id).name()
                    ))
                })?;
            builder.add(&self.bind_component(id, term, variables)?, Operator::Eq)?;
        }
        Ok(builder)
    }

    /// Explicit cell names to fetch; only valid when `!is_column_range()`.
    pub fn requested_columns(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<Vec<u8>>> {
        if self.is_column_range() {
            return Err(WcqError::assertion(
                "requested_columns() called on a column range query",
            ));
        }

        match self.layout.kind() {
            Kind::Static => Ok(self
                .expanded_selection()
                .iter()
                .map(|s| self.layout.field(s.field))
                .filter(|def| def.role() == FieldRole::Metadata)
                .map(|def| def.key().to_vec())
                .collect()),
            Kind::Sparse => {
                let prefix = self.clustering_prefix(variables)?;
                let mut columns = Vec::new();
                for selected in self.expanded_selection().iter() {
                    let def = self.layout.field(selected.field);
                    if def.role() != FieldRole::Metadata {
                        continue;
                    }
                    let mut name = prefix.clone();
                    name.add(def.key(), Operator::Eq)?;
                    columns.push(name.build());
                }
                Ok(columns)
            }
            Kind::Dynamic => {
                let id = self.layout.clustering()[0];
                let term = self
                    .restrictions
                    .get(id)
                    .and_then(Restriction::single_value)
                    .ok_or_else(|| {
                        WcqError::assertion("dynamic column name needs a single equality")
                    })?;
                Ok(vec![self.bind_component(id, term, variables)?])
            }
            Kind::Dense => Ok(vec![self.clustering_prefix(variables)?.build()]),
        }
    }

    pub fn requested_start(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<u8>> {
        self.requested_bounds(true, variables)
    }

    pub fn requested_finish(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<u8>> {
        self.requested_bounds(false, variables)
    }

    /// Start (`is_start`) or end of the cell slice; only valid when
    /// `is_column_range()`. An empty bound is open.
    pub fn requested_bounds(&self, is_start: bool, variables: &[Vec<u8>]) -> WcqResult<Vec<u8>> {
        if !self.is_column_range() {
            return Err(WcqError::assertion(
                "requested_bounds() called on a query with exact column names",
            ));
        }

        match self.layout.kind() {
            Kind::Static => {
                if self.is_wildcard() {
                    Ok(Vec::new())
                } else {
                    Err(WcqError::assertion(
                        "only a wildcard selection slices a static table",
                    ))
                }
            }
            Kind::Dynamic => {
                let id = self.layout.clustering()[0];
                match self.restrictions.get(id).and_then(|r| r.bound(is_start)) {
                    Some(bound) => self.bind_component(id, &bound.term, variables),
                    None => Ok(Vec::new()),
                }
            }
            Kind::Sparse | Kind::Dense => {
                let mut builder = CompositeBuilder::new(self.layout.composite_arity());
                let mut last_op = None;
                for &id in self.layout.clustering() {
                    let Some(restriction) = self.restrictions.get(id) else {
                        break;
                    };
                    if let Some(term) = restriction.single_value() {
                        builder.add(&self.bind_component(id, term, variables)?, Operator::Eq)?;
                        last_op = Some(Operator::Eq);
                        continue;
                    }
                    if let Some(bound) = restriction.bound(is_start) {
                        let op = if is_start {
                            Operator::start(bound.inclusive)
                        } else {
                            Operator::end(bound.inclusive)
                        };
                        builder.add(&self.bind_component(id, &bound.term, variables)?, op)?;
                        last_op = Some(op);
                    }
                    break;
                }

                if !is_start && last_op == Some(Operator::Eq) {
                    Ok(builder.build_as_end_of_range())
                } else {
                    Ok(builder.build())
                }
            }
        }
    }

    /// Secondary-index predicates, one per equality value and one per range side.
    pub fn index_expressions(&self, variables: &[Vec<u8>]) -> WcqResult<Vec<IndexExpression>> {
        if !self.has_indexed_expression {
            return Ok(Vec::new());
        }

        let mut expressions = Vec::new();
        for &id in self.layout.metadata() {
            let Some(restriction) = self.restrictions.get(id) else {
                continue;
            };
            let column = self.layout.field(id).key();
            match restriction {
                Restriction::Equality(values) => {
                    for term in values {
                        expressions.push(IndexExpression {
                            column: column.to_vec(),
                            op: Operator::Eq,
                            value: self.bind(id, term, variables)?,
                        });
                    }
                }
                Restriction::Range { start, end } => {
                    if let Some(bound) = start {
                        expressions.push(IndexExpression {
                            column: column.to_vec(),
                            op: Operator::start(bound.inclusive),
                            value: self.bind(id, &bound.term, variables)?,
                        });
                    }
                    if let Some(bound) = end {
                        expressions.push(IndexExpression {
                            column: column.to_vec(),
                            op: Operator::end(bound.inclusive),
                            value: self.bind(id, &bound.term, variables)?,
                        });
                    }
                }
            }
        }
        Ok(expressions)
    }
}
