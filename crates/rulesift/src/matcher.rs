//! Compiled leaf comparisons.
//!
//! A [`Matcher`] is a rule's operator and operand, validated and prepared
//! once (regexes compiled, sets flattened) so that testing a field value is
//! allocation-free.

use regex::Regex;

use crate::error::{Result, RuleError};
use crate::op::{Arity, Op};
use crate::rule::{Rule, RuleValue};
use crate::value::{Number, Value};

/// A scalar operand.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    fn from_rule_value(value: &RuleValue) -> Result<Self> {
        match value {
            RuleValue::String(s) => Ok(Scalar::String(s.clone())),
            RuleValue::Bool(b) => Ok(Scalar::Bool(*b)),
            RuleValue::Number(n) => Ok(Scalar::Number(*n)),
            RuleValue::Timestamp(ts) => Ok(Scalar::Number((*ts).into())),
            RuleValue::Null | RuleValue::List(_) => Err(RuleError::TypeMismatch {
                expected: "a scalar value",
                actual: value.type_name(),
            }),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Number(_) => "number",
            Scalar::Bool(_) => "bool",
        }
    }

    fn comparable_with(&self, field: &Value<'_>) -> bool {
        match self {
            Scalar::String(_) => field.as_str().is_some(),
            Scalar::Number(_) => numeric(field).is_some(),
            Scalar::Bool(_) => field.as_bool().is_some(),
        }
    }

    fn equals(&self, field: &Value<'_>) -> bool {
        match (self, field) {
            (Scalar::String(expected), Value::String(actual)) => expected == actual,
            (Scalar::Bool(expected), Value::Bool(actual)) => expected == actual,
            (Scalar::Number(expected), _) => numeric(field)
                .and_then(|actual| actual.compare(*expected))
                .is_some_and(|ordering| ordering.is_eq()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Operand {
    None,
    Scalar(Scalar),
    Regex(Regex),
    Set(Vec<Scalar>),
    Range(Number, Number),
}

/// A rule's comparison, ready to test field values.
///
/// # Example
///
/// ```
/// use rulesift::{Matcher, Op, Rule, Value, Number};
///
/// let matcher = Matcher::compile(&Rule::new("age", Op::Between, vec![18, 65])).unwrap();
/// assert!(matcher.matches(&Value::Number(Number::I64(30))));
/// assert!(!matcher.matches(&Value::Number(Number::I64(70))));
/// assert!(!matcher.matches(&Value::None));
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    op: Op,
    operand: Operand,
}

impl Matcher {
    /// Validates the rule's operator against its value and prepares the operand.
    pub fn compile(rule: &Rule) -> Result<Self> {
        let op = rule.operator;
        let operand = match op.arity() {
            Arity::Nullary => Operand::None,
            Arity::Unary => unary_operand(op, &rule.value)?,
            Arity::Set => set_operand(&rule.value)?,
            Arity::Range => range_operand(op, &rule.value)?,
        };
        Ok(Matcher { op, operand })
    }

    /// The operator this matcher applies.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Scalars the operand is built from; empty for nullary, regex and
    /// range operands.
    pub(crate) fn scalars(&self) -> &[Scalar] {
        match &self.operand {
            Operand::Scalar(s) => std::slice::from_ref(s),
            Operand::Set(set) => set,
            _ => &[],
        }
    }

    /// Tests a field value.
    ///
    /// Missing fields match only `is_null` and `is_empty`. Values of a
    /// different type than the operand never match.
    pub fn matches(&self, field: &Value<'_>) -> bool {
        match self.op {
            Op::IsNull => return field.is_none(),
            Op::IsNotNull => return !field.is_none(),
            Op::IsEmpty => return field.is_empty(),
            Op::IsNotEmpty => return !field.is_empty(),
            _ => {}
        }

        // A missing field never matches a comparison, negated or not
        if field.is_none() {
            return false;
        }

        match &self.operand {
            Operand::Scalar(scalar) => self.match_scalar(scalar, field),
            Operand::Regex(regex) => field.as_str().is_some_and(|s| regex.is_match(s)),
            Operand::Set(set) => {
                // An empty set holds nothing, so only a non-empty one can mismatch
                if !set.is_empty() && !set.iter().any(|s| s.comparable_with(field)) {
                    return false;
                }
                let hit = set.iter().any(|s| s.equals(field));
                match self.op {
                    Op::In => hit,
                    _ => !hit,
                }
            }
            Operand::Range(low, high) => {
                let Some(n) = numeric(field) else {
                    return false;
                };
                let inside = matches!(
                    (n.compare(*low), n.compare(*high)),
                    (Some(lo), Some(hi)) if lo.is_ge() && hi.is_le()
                );
                match self.op {
                    Op::Between => inside,
                    // NaN is neither inside nor outside
                    _ => !inside && n.compare(*low).is_some(),
                }
            }
            Operand::None => false,
        }
    }

    fn match_scalar(&self, scalar: &Scalar, field: &Value<'_>) -> bool {
        match (scalar, field) {
            (Scalar::String(pattern), Value::String(s)) => self.match_string(s, pattern),
            (Scalar::Number(expected), _) => match numeric(field) {
                Some(n) => match n.compare(*expected) {
                    Some(ordering) => self.op.eval_ordering(ordering),
                    None => false, // NaN comparison
                },
                None => false,
            },
            (Scalar::Bool(expected), Value::Bool(actual)) => match self.op {
                Op::Eq => actual == expected,
                Op::Ne => actual != expected,
                _ => false,
            },
            // Type mismatch - doesn't match
            _ => false,
        }
    }

    fn match_string(&self, field: &str, pattern: &str) -> bool {
        match self.op {
            Op::Eq => field == pattern,
            Op::Ne => field != pattern,
            Op::StartsWith => field.starts_with(pattern),
            Op::NotStartsWith => !field.starts_with(pattern),
            Op::EndsWith => field.ends_with(pattern),
            Op::NotEndsWith => !field.ends_with(pattern),
            Op::Contains => field.contains(pattern),
            Op::NotContains => !field.contains(pattern),
            _ => false,
        }
    }
}

/// Numeric view of a field: numbers, timestamps as milliseconds, and enum
/// discriminants.
fn numeric(field: &Value<'_>) -> Option<Number> {
    match field {
        Value::Number(n) => Some(*n),
        Value::Timestamp(ts) => Some((*ts).into()),
        Value::Enum(d) => Some(Number::U64(u64::from(*d))),
        _ => None,
    }
}

fn unary_operand(op: Op, value: &RuleValue) -> Result<Operand> {
    let scalar = Scalar::from_rule_value(value)?;

    if op.is_string_only() {
        let Scalar::String(pattern) = scalar else {
            return Err(RuleError::InvalidOperatorForType {
                op: op.as_str(),
                value_type: scalar.type_name(),
            });
        };
        if op == Op::Regex {
            return Ok(Operand::Regex(Regex::new(&pattern)?));
        }
        return Ok(Operand::Scalar(Scalar::String(pattern)));
    }

    if op.is_ordering_op() && !matches!(scalar, Scalar::Number(_)) {
        return Err(RuleError::InvalidOperatorForType {
            op: op.as_str(),
            value_type: scalar.type_name(),
        });
    }

    Ok(Operand::Scalar(scalar))
}

fn set_operand(value: &RuleValue) -> Result<Operand> {
    let set = match value {
        RuleValue::List(items) => items
            .iter()
            .map(Scalar::from_rule_value)
            .collect::<Result<Vec<_>>>()?,
        RuleValue::Null => {
            return Err(RuleError::TypeMismatch {
                expected: "a list",
                actual: "null",
            })
        }
        scalar => vec![Scalar::from_rule_value(scalar)?],
    };
    Ok(Operand::Set(set))
}

fn range_operand(op: Op, value: &RuleValue) -> Result<Operand> {
    let RuleValue::List(bounds) = value else {
        return Err(RuleError::TypeMismatch {
            expected: "a list of two numbers",
            actual: value.type_name(),
        });
    };
    let [low, high] = bounds.as_slice() else {
        return Err(RuleError::InvalidRange {
            op: op.as_str(),
            len: bounds.len(),
        });
    };
    match (low.as_number(), high.as_number()) {
        (Some(low), Some(high)) => Ok(Operand::Range(low, high)),
        (None, _) => Err(RuleError::TypeMismatch {
            expected: "number",
            actual: low.type_name(),
        }),
        (_, None) => Err(RuleError::TypeMismatch {
            expected: "number",
            actual: high.type_name(),
        }),
    }
}
