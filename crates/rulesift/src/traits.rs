//! Field access for entities tested by compiled rules.
//!
//! This module provides the [`Filterable`] trait, the default way for the
//! field rule compiler to read a named field from an entity, and an
//! implementation for `serde_json::Value` documents.

use crate::value::{Number, Value};

/// Trait for types whose fields can be read by name.
///
/// # Manual Implementation
///
/// ```
/// use rulesift::{Filterable, Value, Number};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Filterable for Task {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "priority" => Value::Number(Number::U64(self.priority as u64)),
///             _ => Value::None,
///         }
///     }
/// }
///
/// let task = Task { name: "ship".into(), priority: 2 };
/// assert_eq!(Task::accessor(&task, "name"), Value::String("ship"));
/// ```
pub trait Filterable {
    /// Returns the value of a field for rule comparison.
    ///
    /// Unknown or unsupported fields return [`Value::None`].
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Static accessor function compatible with
    /// [`FieldRuleCompiler::new`](crate::FieldRuleCompiler::new).
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.field_value(field)
    }
}

/// JSON documents are addressed by dotted paths.
///
/// A key containing dots is matched verbatim before the path is split.
/// Numeric segments index into arrays. Objects and arrays at the end of a
/// path are not comparable and read as [`Value::None`].
///
/// ```
/// use rulesift::{Filterable, Value, Number};
/// use serde_json::json;
///
/// let doc = json!({"user": {"name": "ada", "tags": ["x", "y"]}, "a.b": 1});
/// assert_eq!(doc.field_value("user.name"), Value::String("ada"));
/// assert_eq!(doc.field_value("user.tags.1"), Value::String("y"));
/// assert_eq!(doc.field_value("a.b"), Value::Number(Number::I64(1)));
/// assert_eq!(doc.field_value("user.missing"), Value::None);
/// ```
impl Filterable for serde_json::Value {
    fn field_value(&self, field: &str) -> Value<'_> {
        if let Some(direct) = self.as_object().and_then(|map| map.get(field)) {
            return json_leaf(direct);
        }

        let mut current = self;
        for segment in field.split('.') {
            let next = match current {
                serde_json::Value::Object(map) => map.get(segment),
                serde_json::Value::Array(items) => {
                    segment.parse::<usize>().ok().and_then(|i| items.get(i))
                }
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Value::None,
            }
        }
        json_leaf(current)
    }
}

fn json_leaf(value: &serde_json::Value) -> Value<'_> {
    match value {
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(Number::I64(i))
            } else if let Some(u) = n.as_u64() {
                Value::Number(Number::U64(u))
            } else {
                n.as_f64()
                    .map_or(Value::None, |f| Value::Number(Number::F64(f)))
            }
        }
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Value::None
        }
    }
}
