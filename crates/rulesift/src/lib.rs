//! Rulesift - compile nested AND/OR rule groups into reusable predicates.
//!
//! Filter definitions built in a UI rule builder are trees: groups of
//! leaf rules, nested inside other groups, each joined to its preceding
//! sibling by AND or OR. Rulesift compiles such a tree once into a
//! [`Predicate`] and applies it to in-memory collections as often as
//! needed, without writing code per filter.
//!
//! - Leaf rules: a field, an operator, and a comparison value
//! - Groups: ordered rules plus ordered child groups, folded left to right
//! - Short-circuit evaluation: the right side runs only when needed
//! - Fail-closed: a rule that cannot compile makes its rule list match nothing
//! - JSON definitions via serde, JSON documents as entities
//!
//! # Quick Start
//!
//! ```rust
//! use rulesift::{parse_groups, FieldRuleCompiler, Filterable, PredicateCompiler, Number, Value};
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Filterable for Person {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "name" => Value::String(&self.name),
//!             "age" => Value::Number(Number::from(self.age)),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let definition = r#"[
//!     {"rules": [{"field": "age", "operator": ">=", "value": 18}]},
//!     {"logical_operation": "or", "rules": [{"field": "name", "operator": "begins_with", "value": "Z"}]}
//! ]"#;
//!
//! let groups = parse_groups(definition).unwrap();
//! let compiler = PredicateCompiler::new(FieldRuleCompiler::<Person, _>::filterable());
//! let predicate = compiler.compile_groups(&groups);
//!
//! let people = vec![
//!     Person { name: "Ada".into(), age: 36 },
//!     Person { name: "Zoe".into(), age: 9 },
//!     Person { name: "Max".into(), age: 12 },
//! ];
//!
//! let names: Vec<&str> = predicate.filter(&people).iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, ["Ada", "Zoe"]);
//! ```
//!
//! # Combination Semantics
//!
//! Every rule and group carries a [`LogicalOperation`] saying how it joins
//! what was accumulated before it among its siblings:
//!
//! ```text
//! rules:  r1, r2 (OR), r3 (AND)     =>  (r1 OR r2) AND r3
//! group:  own rules, children c1..  =>  own <op of c1> (c1 <op of c2> c2 ...)
//! ```
//!
//! An empty rule list matches everything. A group with child groups but no
//! rules is its children alone.
//!
//! # Failures
//!
//! Rule errors ([`RuleError`]) never reach the caller of the tree
//! compiler: the enclosing rule list becomes "match nothing" and the error
//! is logged through `tracing`. Misuse such as compiling an empty
//! top-level group list panics with a contract violation.
//!
//! # Operators
//!
//! | Field type | Operators |
//! |------------|-----------|
//! | String | `equal`, `not_equal`, `begins_with`, `ends_with`, `contains` (and `not_` forms), `regex`, `in`, `not_in` |
//! | Number | `equal`, `not_equal`, `less`, `less_or_equal`, `greater`, `greater_or_equal`, `between`, `not_between`, `in`, `not_in` |
//! | Timestamp | number operators plus `before`, `after` |
//! | Enum | `equal`, `not_equal`, `in`, `not_in` |
//! | Bool | `equal`, `not_equal` |
//! | Any | `is_null`, `is_not_null`, `is_empty`, `is_not_empty` |

mod combinator;
mod compiler;
mod error;
mod group;
mod matcher;
mod op;
mod precondition;
mod predicate;
mod rule;
mod rule_compiler;
mod traits;
mod value;

// Re-export public API
pub use combinator::{and, combine, or};
pub use compiler::PredicateCompiler;
pub use error::{DefinitionError, Result, RuleError};
pub use group::{parse_group, parse_groups, Group};
pub use matcher::Matcher;
pub use op::{Arity, Op};
pub use precondition::require;
pub use predicate::Predicate;
pub use rule::{LogicalOperation, Rule, RuleValue};
pub use rule_compiler::{FieldKind, FieldRuleCompiler, FilterableAccessor, RuleCompiler, Schema};
pub use traits::Filterable;
pub use value::{Number, Timestamp, Value};
