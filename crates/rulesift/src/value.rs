//! Runtime value types for field comparison.
//!
//! The [`Value`] enum is what an accessor returns for one field of one
//! entity. Rule operands are owned ([`RuleValue`](crate::RuleValue)); field
//! values borrow from the entity being tested.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Runtime value for comparison, borrowed from the entity.
///
/// # Example
///
/// ```
/// use rulesift::{Value, Number};
///
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// fn accessor<'a>(person: &'a Person, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(&person.name),
///         "age" => Value::Number(Number::U64(person.age as u64)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or unsupported.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` for missing values and empty strings.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::None | Value::String(""))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Enum(_) => "enum",
            Value::Bool(_) => "bool",
            Value::None => "null",
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Comparisons between different variants fall back to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $wide:ty: $($src:ty),+) => {
        $(
            impl From<$src> for Number {
                fn from(n: $src) -> Self {
                    Number::$variant(n as $wide)
                }
            }
        )+
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use rulesift::Timestamp;
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

impl From<Timestamp> for Number {
    fn from(ts: Timestamp) -> Self {
        Number::I64(ts.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));

        // Wrong type returns None
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
    }

    #[test]
    fn value_emptiness() {
        assert!(Value::None.is_empty());
        assert!(Value::String("").is_empty());
        assert!(!Value::String(" ").is_empty());
        assert!(!Value::Bool(false).is_empty());
        assert!(!Value::Number(Number::I64(0)).is_empty());
    }

    #[test]
    fn number_comparisons_same_type() {
        use Number::{F64, I64, U64};

        assert_eq!(I64(5).compare(I64(10)), Some(Ordering::Less));
        assert_eq!(U64(10).compare(U64(5)), Some(Ordering::Greater));
        assert_eq!(F64(5.0).compare(F64(5.0)), Some(Ordering::Equal));
    }

    #[test]
    fn number_comparisons_mixed_types() {
        use Number::{F64, I64, U64};

        assert_eq!(I64(5).compare(U64(10)), Some(Ordering::Less));
        assert_eq!(I64(-1).compare(U64(u64::MAX)), Some(Ordering::Less));
        assert_eq!(U64(3).compare(I64(-3)), Some(Ordering::Greater));
        assert_eq!(I64(5).compare(F64(5.0)), Some(Ordering::Equal));
        assert_eq!(U64(10).compare(F64(5.5)), Some(Ordering::Greater));
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(Number::F64(1.0).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn number_conversions() {
        assert_eq!(Number::from(42i32), Number::I64(42));
        assert_eq!(Number::from(42u32), Number::U64(42));
        assert_eq!(Number::from(42usize), Number::U64(42));
        assert_eq!(Number::from(42.5f64), Number::F64(42.5));
    }

    #[test]
    fn number_deserializes_narrowest_variant() {
        let n: Number = serde_json::from_str("18").unwrap();
        assert_eq!(n, Number::I64(18));
        let n: Number = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(n, Number::U64(u64::MAX));
        let n: Number = serde_json::from_str("2.5").unwrap();
        assert_eq!(n, Number::F64(2.5));
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(1).as_millis(), 1000);
        assert_eq!(Timestamp::from_millis(5000).as_secs(), 5);
        assert_eq!(Number::from(Timestamp(7)), Number::I64(7));
    }
}
