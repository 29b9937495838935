//! Per-field predicates built from the WHERE clause.
//!
//! Relations are accumulated in a [`RestrictionBuilder`] and then frozen into
//! an immutable [`Restrictions`] map owned by the compiled statement.

use crate::error::{WcqError, WcqResult};
use crate::schema::FieldId;
use crate::select::ast::Term;
use ahash::AHashMap;
use smallvec::{SmallVec, smallvec};

/// One side of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub term: Term,
    pub inclusive: bool,
}

/// Compiled predicate on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    /// Non-empty value set; more than one value only for IN on the partition key.
    Equality(SmallVec<[Term; 1]>),
    Range {
        start: Option<Bound>,
        end: Option<Bound>,
    },
}

impl Restriction {
    pub fn is_equality(&self) -> bool {
        matches!(self, Restriction::Equality(_))
    }

    pub fn eq_values(&self) -> &[Term] {
        match self {
            Restriction::Equality(values) => values,
            Restriction::Range { .. } => &[],
        }
    }

    /// The value of a single-valued equality.
    pub fn single_value(&self) -> Option<&Term> {
        match self {
            Restriction::Equality(values) if values.len() == 1 => values.first(),
            _ => None,
        }
    }

    pub fn bound(&self, is_start: bool) -> Option<&Bound> {
        match self {
            Restriction::Range { start, end } => {
                if is_start {
                    start.as_ref()
                } else {
                    end.as_ref()
                }
            }
            Restriction::Equality(_) => None,
        }
    }
}

/// Mutable accumulation phase of WHERE-clause binding.
#[derive(Debug, Default)]
pub struct RestrictionBuilder {
    by_field: AHashMap<FieldId, Restriction>,
}

impl RestrictionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldId) -> Option<&Restriction> {
        self.by_field.get(&field)
    }

    /// `field = value`; conflicts with anything already on the field.
    pub fn add_equality(&mut self, field: FieldId, name: &str, value: Term) -> WcqResult<()> {
        if self.by_field.contains_key(&field) {
            return Err(WcqError::ConflictingRestriction {
                field: name.to_string(),
                reason: "if it includes an Equal",
            });
        }
        self.by_field.insert(field, Restriction::Equality(smallvec![value]));
        Ok(())
    }

    /// `field IN (values)`; conflicts with anything already on the field.
    pub fn add_in(&mut self, field: FieldId, name: &str, values: Vec<Term>) -> WcqResult<()> {
        if self.by_field.contains_key(&field) {
            return Err(WcqError::ConflictingRestriction {
                field: name.to_string(),
                reason: "if it includes an IN",
            });
        }
        if values.is_empty() {
            return Err(WcqError::UnsupportedRestriction(format!(
                "IN relation on '{name}' needs at least one value"
            )));
        }
        self.by_field
            .insert(field, Restriction::Equality(SmallVec::from_vec(values)));
        Ok(())
    }

    /// Sets the start (`is_start`) or end side of a range.
    pub fn add_bound(
        &mut self,
        field: FieldId,
        name: &str,
        is_start: bool,
        bound: Bound,
    ) -> WcqResult<()> {
        let restriction = self.by_field.entry(field).or_insert(Restriction::Range {
            start: None,
            end: None,
        });
        let slot = match restriction {
            Restriction::Equality(_) => {
                return Err(WcqError::ConflictingRestriction {
                    field: name.to_string(),
                    reason: "if it includes an Equal",
                });
            }
            Restriction::Range { start, end } => {
                if is_start {
                    start
                } else {
                    end
                }
            }
        };
        if slot.is_some() {
            return Err(WcqError::ConflictingRestriction {
                field: name.to_string(),
                reason: if is_start {
                    "of the Greater-Than kind"
                } else {
                    "of the Lesser-Than kind"
                },
            });
        }
        *slot = Some(bound);
        Ok(())
    }

    /// Turns a single-value equality into the inclusive range `[v, v]`.
    ///
    /// Leaves anything else untouched; returns whether a rewrite happened.
    pub fn equality_to_range(&mut self, field: FieldId) -> bool {
        let Some(restriction) = self.by_field.get_mut(&field) else {
            return false;
        };
        let Some(value) = restriction.single_value().cloned() else {
            return false;
        };
        *restriction = Restriction::Range {
            start: Some(Bound {
                term: value.clone(),
                inclusive: true,
            }),
            end: Some(Bound {
                term: value,
                inclusive: true,
            }),
        };
        true
    }

    pub fn freeze(self) -> Restrictions {
        Restrictions {
            by_field: self.by_field,
        }
    }
}

/// Frozen restriction map of a compiled statement.
#[derive(Debug, Clone, Default)]
pub struct Restrictions {
    by_field: AHashMap<FieldId, Restriction>,
}

impl Restrictions {
    pub fn get(&self, field: FieldId) -> Option<&Restriction> {
        self.by_field.get(&field)
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}
