//! Comparison operators for leaf rules.
//!
//! The [`Op`] enum covers the operator vocabulary emitted by UI rule
//! builders. Not all operators are valid for all field types; the rule
//! compiler rejects combinations that cannot match.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Comparison operator for a leaf rule.
///
/// Operators are grouped by the operand they take:
/// - **Nullary**: `IsNull`, `IsNotNull`, `IsEmpty`, `IsNotEmpty` - no operand
/// - **Unary**: equality, ordering, string matching, `Regex`, `Before`, `After`
/// - **Set**: `In`, `NotIn` - a list of candidate values
/// - **Range**: `Between`, `NotBetween` - an inclusive `[low, high]` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Op {
    /// Equal (exact match). Valid for all types.
    Eq,
    /// Not equal. Valid for all types.
    Ne,

    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Inclusive range check.
    Between,
    /// Outside the inclusive range.
    NotBetween,

    /// Value is one of the given set.
    In,
    /// Value is none of the given set.
    NotIn,

    /// String starts with prefix.
    StartsWith,
    /// String does not start with prefix.
    NotStartsWith,
    /// String ends with suffix.
    EndsWith,
    /// String does not end with suffix.
    NotEndsWith,
    /// String contains substring.
    Contains,
    /// String does not contain substring.
    NotContains,
    /// String matches regular expression.
    Regex,

    /// Earlier than (alias for `Lt` on timestamps).
    Before,
    /// Later than (alias for `Gt` on timestamps).
    After,

    /// Field is missing or null.
    IsNull,
    /// Field is present.
    IsNotNull,
    /// Field is missing, null, or an empty string.
    IsEmpty,
    /// Field is a non-empty string or any other present value.
    IsNotEmpty,
}

/// The operand shape an operator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No operand; the rule value is ignored.
    Nullary,
    /// A single scalar operand.
    Unary,
    /// A list of candidate values.
    Set,
    /// Exactly two bounds.
    Range,
}

impl Op {
    /// Every operator, in declaration order.
    pub const ALL: [Op; 23] = [
        Op::Eq,
        Op::Ne,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
        Op::Between,
        Op::NotBetween,
        Op::In,
        Op::NotIn,
        Op::StartsWith,
        Op::NotStartsWith,
        Op::EndsWith,
        Op::NotEndsWith,
        Op::Contains,
        Op::NotContains,
        Op::Regex,
        Op::Before,
        Op::After,
        Op::IsNull,
        Op::IsNotNull,
        Op::IsEmpty,
        Op::IsNotEmpty,
    ];

    /// Returns the operand shape this operator expects.
    pub fn arity(self) -> Arity {
        match self {
            Op::IsNull | Op::IsNotNull | Op::IsEmpty | Op::IsNotEmpty => Arity::Nullary,
            Op::In | Op::NotIn => Arity::Set,
            Op::Between | Op::NotBetween => Arity::Range,
            _ => Arity::Unary,
        }
    }

    /// Returns `true` for operators that only inspect presence.
    pub fn is_presence_op(self) -> bool {
        self.arity() == Arity::Nullary
    }

    /// Returns `true` if this operator requires a string operand.
    pub fn is_string_only(self) -> bool {
        matches!(
            self,
            Op::StartsWith
                | Op::NotStartsWith
                | Op::EndsWith
                | Op::NotEndsWith
                | Op::Contains
                | Op::NotContains
                | Op::Regex
        )
    }

    /// Returns `true` if this operator orders its operand against the field.
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            Op::Gt | Op::Gte | Op::Lt | Op::Lte | Op::Before | Op::After
        )
    }

    /// Returns `true` if this operator is valid for string fields.
    pub fn is_string_op(self) -> bool {
        self.is_string_only()
            || self.is_presence_op()
            || matches!(self, Op::Eq | Op::Ne | Op::In | Op::NotIn)
    }

    /// Returns `true` if this operator is valid for numeric fields.
    pub fn is_number_op(self) -> bool {
        self.is_presence_op()
            || matches!(
                self,
                Op::Eq
                    | Op::Ne
                    | Op::Gt
                    | Op::Gte
                    | Op::Lt
                    | Op::Lte
                    | Op::Between
                    | Op::NotBetween
                    | Op::In
                    | Op::NotIn
            )
    }

    /// Returns `true` if this operator is valid for timestamp fields.
    pub fn is_timestamp_op(self) -> bool {
        self.is_number_op() || matches!(self, Op::Before | Op::After)
    }

    /// Returns `true` if this operator is valid for enum fields.
    pub fn is_enum_op(self) -> bool {
        self.is_presence_op() || matches!(self, Op::Eq | Op::Ne | Op::In | Op::NotIn)
    }

    /// Returns `true` if this operator is valid for boolean fields.
    pub fn is_bool_op(self) -> bool {
        self.is_presence_op() || matches!(self, Op::Eq | Op::Ne)
    }

    /// Whether a field that compares to the operand as `ordering` passes.
    ///
    /// `before` and `after` read as `less` and `greater`. Operators that do
    /// not compare by order never pass.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering.is_eq(),
            Op::Ne => ordering.is_ne(),
            Op::Gt | Op::After => ordering.is_gt(),
            Op::Gte => ordering.is_ge(),
            Op::Lt | Op::Before => ordering.is_lt(),
            Op::Lte => ordering.is_le(),
            _ => false,
        }
    }

    /// Returns the canonical name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "equal",
            Op::Ne => "not_equal",
            Op::Gt => "greater",
            Op::Gte => "greater_or_equal",
            Op::Lt => "less",
            Op::Lte => "less_or_equal",
            Op::Between => "between",
            Op::NotBetween => "not_between",
            Op::In => "in",
            Op::NotIn => "not_in",
            Op::StartsWith => "begins_with",
            Op::NotStartsWith => "not_begins_with",
            Op::EndsWith => "ends_with",
            Op::NotEndsWith => "not_ends_with",
            Op::Contains => "contains",
            Op::NotContains => "not_contains",
            Op::Regex => "regex",
            Op::Before => "before",
            Op::After => "after",
            Op::IsNull => "is_null",
            Op::IsNotNull => "is_not_null",
            Op::IsEmpty => "is_empty",
            Op::IsNotEmpty => "is_not_empty",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Op {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "equal" | "eq" | "=" | "==" => Op::Eq,
            "not_equal" | "ne" | "!=" | "<>" => Op::Ne,
            "greater" | "gt" | ">" => Op::Gt,
            "greater_or_equal" | "gte" | ">=" => Op::Gte,
            "less" | "lt" | "<" => Op::Lt,
            "less_or_equal" | "lte" | "<=" => Op::Lte,
            "between" => Op::Between,
            "not_between" => Op::NotBetween,
            "in" => Op::In,
            "not_in" => Op::NotIn,
            "begins_with" | "startswith" | "starts_with" => Op::StartsWith,
            "not_begins_with" | "not_starts_with" => Op::NotStartsWith,
            "ends_with" | "endswith" => Op::EndsWith,
            "not_ends_with" => Op::NotEndsWith,
            "contains" => Op::Contains,
            "not_contains" => Op::NotContains,
            "regex" | "matches" => Op::Regex,
            "before" => Op::Before,
            "after" => Op::After,
            "is_null" => Op::IsNull,
            "is_not_null" => Op::IsNotNull,
            "is_empty" => Op::IsEmpty,
            "is_not_empty" => Op::IsNotEmpty,
            _ => return Err(RuleError::UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

impl TryFrom<String> for Op {
    type Error = RuleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Op> for &'static str {
    fn from(op: Op) -> Self {
        op.as_str()
    }
}
