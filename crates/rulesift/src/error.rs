//! Error types for the rulesift crate.

use thiserror::Error;

/// Errors that can occur when compiling a single leaf rule.
///
/// The predicate compiler never surfaces these to its callers: a rule list
/// containing a rule that fails to compile degrades to a predicate that
/// matches nothing. Use [`PredicateCompiler::try_compile_rules`] to observe
/// them directly.
///
/// [`PredicateCompiler::try_compile_rules`]: crate::PredicateCompiler::try_compile_rules
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rule has no field name.
    #[error("rule has an empty field name")]
    EmptyField,

    /// Field is not declared in the schema.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Operator name is not recognized by `Op`'s `FromStr` impl.
    ///
    /// JSON definitions report the same message wrapped in
    /// [`DefinitionError::Json`], since operators are parsed while
    /// deserializing.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Operator is not valid for the given value type.
    #[error("operator '{op}' is not valid for {value_type} values")]
    InvalidOperatorForType {
        op: &'static str,
        value_type: &'static str,
    },

    /// Type mismatch between the operator's expected operand and the rule value.
    #[error("type mismatch: operator expects {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Range operator without exactly two numeric bounds.
    #[error("operator '{op}' expects two numeric bounds, got {len} value(s)")]
    InvalidRange { op: &'static str, len: usize },

    /// Error raised by a caller-supplied rule compiler.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur when reading a filter definition or schema.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Malformed JSON or a document that does not describe a rule tree.
    #[error("invalid filter definition: {0}")]
    Json(#[from] serde_json::Error),

    /// A top-level group list with no groups.
    #[error("filter definition contains no groups")]
    Empty,
}

/// Result type for rule compilation.
pub type Result<T> = std::result::Result<T, RuleError>;
