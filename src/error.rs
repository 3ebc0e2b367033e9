//! Error types for the matcher crate.
//!
//! Errors are split by phase. [`CompileError`] is raised while turning a
//! [`MatcherSpec`](crate::MatcherSpec) into a
//! [`CompiledMatcher`](crate::CompiledMatcher); [`EvalError`] is raised while
//! evaluating a compiled expression or matcher against content.

use crate::expr::ValueKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to compile a matcher specification.
///
/// Every variant carries the offending raw string so callers can point at the
/// exact field that needs fixing. Retrying with the same input always fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("unknown matcher type specified: {0}")]
    UnknownMatcherType(String),

    #[error("could not compile regex: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("could not compile dsl: {expression}: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("could not build word set: {0}")]
    InvalidWords(String),

    #[error("could not decode binary pattern: {value}: {reason}")]
    InvalidBinary { value: String, reason: String },

    #[error("unknown condition specified: {0}")]
    UnknownCondition(String),

    #[error("unknown matcher part specified: {0}")]
    UnknownPart(String),
}

impl CompileError {
    /// Name of the specification field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            CompileError::UnknownMatcherType(_) => "type",
            CompileError::InvalidPattern { .. } => "regex",
            CompileError::InvalidExpression { .. } => "dsl",
            CompileError::InvalidWords(_) => "words",
            CompileError::InvalidBinary { .. } => "binary",
            CompileError::UnknownCondition(_) => "condition",
            CompileError::UnknownPart(_) => "part",
        }
    }

    /// The raw value that failed to compile or resolve.
    pub fn value(&self) -> &str {
        match self {
            CompileError::UnknownMatcherType(value)
            | CompileError::InvalidWords(value)
            | CompileError::UnknownCondition(value)
            | CompileError::UnknownPart(value) => value,
            CompileError::InvalidPattern { pattern, .. } => pattern,
            CompileError::InvalidExpression { expression, .. } => expression,
            CompileError::InvalidBinary { value, .. } => value,
        }
    }
}

/// Failure while evaluating a compiled expression.
///
/// These are authoring bugs surfaced at evaluation time: a helper called with
/// the wrong value kind, a variable the content does not provide, or an
/// operator applied to incompatible operands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("no parameter '{0}' found")]
    UnknownVariable(String),

    #[error("{function}: argument {position} must be {expected}, found {found}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("{function}: expected {expected} arguments, found {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("{function}: declared to return {expected}, returned {found}")]
    ReturnType {
        function: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("operator '{operator}' cannot combine {left} and {right}")]
    TypeMismatch {
        operator: &'static str,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("operator '{operator}' cannot be applied to {found}")]
    InvalidOperand {
        operator: &'static str,
        found: ValueKind,
    },

    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("{function}: {reason}")]
    Decode { function: String, reason: String },

    #[error("expression must evaluate to a boolean, found {0}")]
    NonBoolean(ValueKind),
}

/// Crate-level error covering every phase.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("YAML parsing error: {0}")]
    Yaml(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err.to_string())
    }
}
