//! Comparison operators shared by relations, composite bounds and index
//! expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    /// Operator for the start side of a range.
    pub fn start(inclusive: bool) -> Self {
        if inclusive { Operator::Gte } else { Operator::Gt }
    }

    /// Operator for the end side of a range.
    pub fn end(inclusive: bool) -> Self {
        if inclusive { Operator::Lte } else { Operator::Lt }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_sides_pick_inclusive_variant() {
        assert_eq!(Operator::start(true), Operator::Gte);
        assert_eq!(Operator::start(false), Operator::Gt);
        assert_eq!(Operator::end(true), Operator::Lte);
        assert_eq!(Operator::end(false), Operator::Lt);
    }
}
