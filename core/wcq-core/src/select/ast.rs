//! Raw SELECT statement — unvalidated output of the parser.

use crate::error::{WcqError, WcqResult};
use crate::operator::Operator;
use crate::schema::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier as written by the caller.
///
/// The text is kept verbatim for output naming; resolution against the
/// schema goes through [`crate::config::SelectConfig::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnIdentifier {
    pub text: String,
    pub quoted: bool,
}

impl ColumnIdentifier {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }
}

impl fmt::Display for ColumnIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

/// Value side of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Literal text, parsed against the field type.
    Literal(String),
    /// `?` marker bound to `variables[index]` at execution.
    Bind(usize),
}

impl Term {
    pub fn literal(text: impl Into<String>) -> Self {
        Term::Literal(text.into())
    }

    /// Binary value of this term for a field of `field_type`.
    pub fn to_bytes(
        &self,
        field: &str,
        field_type: FieldType,
        variables: &[Vec<u8>],
    ) -> WcqResult<Vec<u8>> {
        match self {
            Term::Literal(text) => field_type.from_text(field, text),
            Term::Bind(index) => {
                let value = variables.get(*index).ok_or(WcqError::MissingVariable {
                    index: *index,
                    provided: variables.len(),
                })?;
                field_type.validate(field, value)?;
                Ok(value.clone())
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(text) => write!(f, "'{text}'"),
            Term::Bind(_) => f.write_str("?"),
        }
    }
}

/// One WHERE-clause relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Compare {
        entity: ColumnIdentifier,
        op: Operator,
        value: Term,
    },
    In {
        entity: ColumnIdentifier,
        values: Vec<Term>,
    },
}

impl Relation {
    pub fn new(entity: ColumnIdentifier, op: Operator, value: Term) -> Self {
        Relation::Compare { entity, op, value }
    }

    pub fn eq(entity: &str, value: Term) -> Self {
        Relation::new(ColumnIdentifier::new(entity), Operator::Eq, value)
    }

    pub fn in_list(entity: &str, values: Vec<Term>) -> Self {
        Relation::In {
            entity: ColumnIdentifier::new(entity),
            values,
        }
    }

    pub fn entity(&self) -> &ColumnIdentifier {
        match self {
            Relation::Compare { entity, .. } | Relation::In { entity, .. } => entity,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Compare { entity, op, value } => write!(f, "{entity} {op} {value}"),
            Relation::In { entity, values } => {
                write!(f, "{entity} IN (")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Read consistency requested by the client. Opaque to this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Any,
    #[default]
    One,
    Two,
    Three,
    Quorum,
    LocalQuorum,
    EachQuorum,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    /// As parsed; must be positive.
    pub limit: i64,
    pub consistency: ConsistencyLevel,
    pub reversed: bool,
    pub count: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            limit: 10_000,
            consistency: ConsistencyLevel::default(),
            reversed: false,
            count: false,
        }
    }
}

/// Parsed but unvalidated SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub table: String,
    pub parameters: Parameters,
    /// Empty means `*`. In count mode holds the `COUNT(...)` argument.
    pub select_clause: Vec<ColumnIdentifier>,
    pub where_clause: Vec<Relation>,
}

impl RawStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            parameters: Parameters::default(),
            select_clause: Vec::new(),
            where_clause: Vec::new(),
        }
    }

    pub fn select(mut self, names: &[&str]) -> Self {
        self.select_clause = names.iter().map(|n| ColumnIdentifier::new(*n)).collect();
        self
    }

    pub fn filter(mut self, relation: Relation) -> Self {
        self.where_clause.push(relation);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.parameters.limit = limit;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.parameters.reversed = true;
        self
    }

    /// `SELECT COUNT(arg)`.
    pub fn count(mut self, arg: &str) -> Self {
        self.parameters.count = true;
        self.select_clause = vec![ColumnIdentifier::new(arg)];
        self
    }

    pub fn consistency(mut self, level: ConsistencyLevel) -> Self {
        self.parameters.consistency = level;
        self
    }
}

impl fmt::Display for RawStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let select: Vec<String> = self.select_clause.iter().map(ToString::to_string).collect();
        let filter: Vec<String> = self.where_clause.iter().map(ToString::to_string).collect();
        write!(
            f,
            "SelectRawStatement[table={}, selectClause=[{}], whereClause=[{}], isCount={}, cLevel={:?}, limit={}]",
            self.table,
            select.join(", "),
            filter.join(" AND "),
            self.parameters.count,
            self.parameters.consistency,
            self.parameters.limit
        )
    }
}
