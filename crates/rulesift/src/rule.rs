//! Leaf rules and the operation that links them to their siblings.
//!
//! A [`Rule`] represents a single condition: a field name, an operator,
//! and a comparison value. Its [`LogicalOperation`] says how the rule
//! combines with everything accumulated before it in its containing list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::op::Op;
use crate::value::{Number, Timestamp};

/// How an element combines with the predicate accumulated before it.
///
/// The operation belongs to one element and always describes its relation
/// to whatever precedes it in its sibling sequence. For the first element
/// of a list it has no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum LogicalOperation {
    #[default]
    And,
    Or,
}

impl LogicalOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperation::And => "and",
            LogicalOperation::Or => "or",
        }
    }
}

impl fmt::Display for LogicalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperation::And => write!(f, "AND"),
            LogicalOperation::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for LogicalOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "&&" => Ok(LogicalOperation::And),
            "or" | "||" => Ok(LogicalOperation::Or),
            _ => Err(format!("unknown logical operation '{}'", s)),
        }
    }
}

impl TryFrom<String> for LogicalOperation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LogicalOperation> for &'static str {
    fn from(op: LogicalOperation) -> Self {
        op.as_str()
    }
}

/// A single leaf condition.
///
/// # Example
///
/// ```
/// use rulesift::{LogicalOperation, Op, Rule};
///
/// let rule = Rule::new("age", Op::Gt, 18).with_logic(LogicalOperation::Or);
/// assert_eq!(rule.to_string(), "age greater 18");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    #[serde(alias = "op")]
    pub operator: Op,
    /// The value to compare against.
    #[serde(default)]
    pub value: RuleValue,
    /// How this rule joins the rules before it.
    #[serde(default, alias = "condition", alias = "logic")]
    pub logical_operation: LogicalOperation,
}

impl Rule {
    /// Creates a new rule joined with `AND`.
    pub fn new(field: impl Into<String>, operator: Op, value: impl Into<RuleValue>) -> Self {
        Rule {
            field: field.into(),
            operator,
            value: value.into(),
            logical_operation: LogicalOperation::And,
        }
    }

    /// Creates a rule joined to its predecessors with `AND`.
    pub fn and(field: impl Into<String>, operator: Op, value: impl Into<RuleValue>) -> Self {
        Rule::new(field, operator, value)
    }

    /// Creates a rule joined to its predecessors with `OR`.
    pub fn or(field: impl Into<String>, operator: Op, value: impl Into<RuleValue>) -> Self {
        Rule::new(field, operator, value).with_logic(LogicalOperation::Or)
    }

    /// Sets the logical operation.
    pub fn with_logic(mut self, logical_operation: LogicalOperation) -> Self {
        self.logical_operation = logical_operation;
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_presence_op() {
            write!(f, "{} {}", self.field, self.operator)
        } else {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        }
    }
}

/// Owned operand stored in a rule.
///
/// Unlike [`Value`](crate::Value), which borrows from the entity,
/// `RuleValue` owns its data so rule trees can be stored and transmitted.
/// In JSON, timestamps travel as numbers of milliseconds and deserialize
/// as [`RuleValue::Number`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// No operand.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(String),
    /// Candidate values for set operators, or bounds for range operators.
    List(Vec<RuleValue>),
    /// Timestamp value.
    Timestamp(Timestamp),
}

impl RuleValue {
    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            RuleValue::Null => "null",
            RuleValue::Bool(_) => "bool",
            RuleValue::Number(_) => "number",
            RuleValue::String(_) => "string",
            RuleValue::List(_) => "list",
            RuleValue::Timestamp(_) => "timestamp",
        }
    }

    /// Numeric view of the value; timestamps convert to milliseconds.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            RuleValue::Number(n) => Some(*n),
            RuleValue::Timestamp(ts) => Some((*ts).into()),
            _ => None,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RuleValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for the null operand.
    pub fn is_null(&self) -> bool {
        matches!(self, RuleValue::Null)
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Null => write!(f, "null"),
            RuleValue::Bool(b) => write!(f, "{}", b),
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::String(s) => write!(f, "{:?}", s),
            RuleValue::Timestamp(ts) => write!(f, "@{}", ts.as_millis()),
            RuleValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        RuleValue::String(s)
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::String(s.to_string())
    }
}

impl From<bool> for RuleValue {
    fn from(b: bool) -> Self {
        RuleValue::Bool(b)
    }
}

impl From<Number> for RuleValue {
    fn from(n: Number) -> Self {
        RuleValue::Number(n)
    }
}

impl From<Timestamp> for RuleValue {
    fn from(t: Timestamp) -> Self {
        RuleValue::Timestamp(t)
    }
}

impl<V: Into<RuleValue>> From<Vec<V>> for RuleValue {
    fn from(v: Vec<V>) -> Self {
        RuleValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<RuleValue>> From<Option<V>> for RuleValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(RuleValue::Null, Into::into)
    }
}

macro_rules! rule_value_from_number {
    ($($src:ty),+) => {
        $(
            impl From<$src> for RuleValue {
                fn from(n: $src) -> Self {
                    RuleValue::Number(Number::from(n))
                }
            }
        )+
    };
}

rule_value_from_number!(i8, i16, i32, i64, isize);
rule_value_from_number!(u8, u16, u32, u64, usize);
rule_value_from_number!(f32, f64);
