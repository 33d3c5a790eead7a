//! Turning one leaf rule into an elementary predicate.
//!
//! The [`RuleCompiler`] trait is the seam between the tree compiler and
//! whatever knows how to read fields from an entity. [`FieldRuleCompiler`]
//! is the stock implementation: it reads fields through an accessor
//! function and optionally validates rules against a [`Schema`].

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DefinitionError, Result, RuleError};
use crate::matcher::{Matcher, Scalar};
use crate::op::Op;
use crate::predicate::Predicate;
use crate::rule::Rule;
use crate::traits::Filterable;
use crate::value::Value;

/// Compiles a single leaf rule into a predicate over `T`.
///
/// Returned predicates must be free of side effects and safe to call from
/// several threads at once; compiled trees share them.
///
/// Closures of the right shape implement this trait:
///
/// ```
/// use rulesift::{Predicate, PredicateCompiler, Rule, RuleError, Op};
///
/// let compiler = PredicateCompiler::new(|rule: &Rule| -> Result<Predicate<i64>, RuleError> {
///     let limit = rule.value.as_number().map(|n| n.to_f64()).unwrap_or(0.0);
///     Ok(Predicate::new(move |x: &i64| (*x as f64) > limit))
/// });
///
/// let p = compiler.compile_rules(&[Rule::new("x", Op::Gt, 3)]);
/// assert!(p.test(&4));
/// ```
pub trait RuleCompiler<T> {
    fn compile(&self, rule: &Rule) -> Result<Predicate<T>>;
}

impl<T, F> RuleCompiler<T> for F
where
    F: Fn(&Rule) -> Result<Predicate<T>>,
{
    fn compile(&self, rule: &Rule) -> Result<Predicate<T>> {
        self(rule)
    }
}

/// Declared type of a field, used for rule validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum => "enum",
            FieldKind::Bool => "bool",
        }
    }

    /// Returns `true` if `op` can be applied to fields of this kind.
    pub fn accepts(self, op: Op) -> bool {
        match self {
            FieldKind::String => op.is_string_op(),
            FieldKind::Number => op.is_number_op(),
            FieldKind::Timestamp => op.is_timestamp_op(),
            FieldKind::Enum => op.is_enum_op(),
            FieldKind::Bool => op.is_bool_op(),
        }
    }

    fn admits(self, scalar: &Scalar) -> bool {
        matches!(
            (self, scalar),
            (FieldKind::String, Scalar::String(_))
                | (
                    FieldKind::Number | FieldKind::Timestamp | FieldKind::Enum,
                    Scalar::Number(_)
                )
                | (FieldKind::Bool, Scalar::Bool(_))
        )
    }
}

/// The set of fields rules may refer to, with their kinds.
///
/// Reads from JSON as a plain object:
///
/// ```
/// use rulesift::{FieldKind, Schema};
///
/// let schema = Schema::from_json(r#"{"age": "number", "name": "string"}"#).unwrap();
/// assert_eq!(schema.kind("age"), Some(FieldKind::Number));
/// assert_eq!(schema.kind("height"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, FieldKind>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Declares a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    fn check(&self, field: &str, matcher: &Matcher) -> Result<()> {
        let kind = self
            .kind(field)
            .ok_or_else(|| RuleError::UnknownField(field.to_string()))?;

        if !kind.accepts(matcher.op()) {
            return Err(RuleError::InvalidOperatorForType {
                op: matcher.op().as_str(),
                value_type: kind.name(),
            });
        }

        if let Some(scalar) = matcher.scalars().iter().find(|s| !kind.admits(s)) {
            return Err(RuleError::TypeMismatch {
                expected: kind.name(),
                actual: scalar.type_name(),
            });
        }

        Ok(())
    }
}

/// Accessor signature of [`Filterable::accessor`].
pub type FilterableAccessor<T> = for<'a> fn(&'a T, &str) -> Value<'a>;

/// Compiles rules into predicates that read fields through an accessor.
///
/// # Example
///
/// ```
/// use rulesift::{FieldRuleCompiler, RuleCompiler, Rule, Op, Value, Number};
///
/// struct Person {
///     age: u32,
/// }
///
/// let compiler = FieldRuleCompiler::new(|p: &Person, field: &str| match field {
///     "age" => Value::Number(Number::from(p.age)),
///     _ => Value::None,
/// });
///
/// let adult = compiler.compile(&Rule::new("age", Op::Gte, 18)).unwrap();
/// assert!(adult.test(&Person { age: 30 }));
/// assert!(!adult.test(&Person { age: 12 }));
/// ```
pub struct FieldRuleCompiler<T, A> {
    accessor: Arc<A>,
    schema: Option<Schema>,
    _entity: PhantomData<fn(&T)>,
}

impl<T, A> Clone for FieldRuleCompiler<T, A> {
    fn clone(&self) -> Self {
        FieldRuleCompiler {
            accessor: Arc::clone(&self.accessor),
            schema: self.schema.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T, A> FieldRuleCompiler<T, A>
where
    A: for<'a> Fn(&'a T, &str) -> Value<'a> + Send + Sync + 'static,
{
    /// Creates a compiler reading fields through `accessor`.
    pub fn new(accessor: A) -> Self {
        FieldRuleCompiler {
            accessor: Arc::new(accessor),
            schema: None,
            _entity: PhantomData,
        }
    }

    /// Validates every rule against `schema` before compiling it.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}

impl<T: Filterable + 'static> FieldRuleCompiler<T, FilterableAccessor<T>> {
    /// Creates a compiler that reads fields through [`Filterable`].
    pub fn filterable() -> Self {
        FieldRuleCompiler::new(T::accessor as FilterableAccessor<T>)
    }
}

impl<T, A> RuleCompiler<T> for FieldRuleCompiler<T, A>
where
    T: 'static,
    A: for<'a> Fn(&'a T, &str) -> Value<'a> + Send + Sync + 'static,
{
    fn compile(&self, rule: &Rule) -> Result<Predicate<T>> {
        if rule.field.trim().is_empty() {
            return Err(RuleError::EmptyField);
        }

        let matcher = Matcher::compile(rule)?;
        if let Some(schema) = &self.schema {
            schema.check(&rule.field, &matcher)?;
        }

        let accessor = Arc::clone(&self.accessor);
        let field = rule.field.clone();
        let test = move |item: &T| matcher.matches(&(*accessor)(item, &field));
        Ok(Predicate::new(test))
    }
}
