//! Embedded boolean/arithmetic expression language.
//!
//! Expressions are compiled once against a [`FunctionLibrary`] and evaluated
//! many times against different [`Variables`]. Compilation resolves every
//! function call to its [`HelperFunction`](crate::functions::HelperFunction)
//! and checks its arity, so a compiled expression never looks anything up by
//! name at evaluation time except variables.
//!
//! ## Grammar
//!
//! ```text
//! expr       := or
//! or         := and ( "||" and )*
//! and        := comparison ( "&&" comparison )*
//! comparison := additive ( ("==" | "!=" | "<" | "<=" | ">" | ">=" | "=~" | "!~") additive )*
//! additive   := term ( ("+" | "-") term )*
//! term       := unary ( ("*" | "/" | "%") unary )*
//! unary      := ("!" | "-") unary | primary
//! primary    := number | string | "true" | "false"
//!             | identifier "(" [ expr ( "," expr )* ] ")"
//!             | identifier
//!             | "(" expr ")"
//! number     := digits [ "." digits ] [ ("e" | "E") [ "+" | "-" ] digits ]
//! ```
//!
//! String literal regexes, whether the right operand of `=~`/`!~` or the
//! pattern argument of a helper such as `regex`, are compiled with the
//! expression under the configured size limits. Computed patterns are held to
//! the same limits when they are compiled during evaluation.
//!
//! ## Example
//!
//! ```rust
//! use probe_matchers::expr::{CompiledExpression, Value, Variables};
//! use probe_matchers::{default_library, CompilerConfig};
//!
//! let expression = CompiledExpression::compile(
//!     r#"contains(tolower(body), "admin") && status_code == 200"#,
//!     &default_library(),
//!     &CompilerConfig::default(),
//! )?;
//!
//! let mut vars = Variables::new();
//! vars.insert("body", "Welcome, Admin");
//! vars.insert("status_code", 200.0);
//!
//! assert_eq!(expression.evaluate(&vars)?, Value::Bool(true));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod eval;
pub(crate) mod parser;

use crate::config::CompilerConfig;
use crate::error::{CompileError, EvalError};
use crate::functions::FunctionLibrary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use parser::Expr;

/// Runtime value flowing through an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
}

/// The kind of a [`Value`], used in helper signatures and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Number,
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => f.write_str("boolean"),
            ValueKind::Number => f.write_str("number"),
            ValueKind::String => f.write_str("string"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            // Integral numbers print without a trailing ".0"
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Named values an expression can reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Import the scalar members of a JSON object.
    ///
    /// Strings, numbers and booleans become variables of the same name.
    /// Nulls, arrays and nested objects have no expression representation and
    /// are skipped, as is everything when `json` is not an object.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let mut vars = Self::new();
        if let serde_json::Value::Object(map) = json {
            for (name, value) in map {
                let value = match value {
                    serde_json::Value::String(s) => Value::String(s.clone()),
                    serde_json::Value::Bool(b) => Value::Bool(*b),
                    serde_json::Value::Number(n) => match n.as_f64() {
                        Some(n) => Value::Number(n),
                        None => continue,
                    },
                    _ => continue,
                };
                vars.values.insert(name.clone(), value);
            }
        }
        vars
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// An expression compiled and bound to a function library.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    root: Expr,
}

impl CompiledExpression {
    /// Compile `source`, resolving its function calls against `library`.
    ///
    /// Syntax errors, unknown functions, arity mismatches, invalid regex
    /// literals and excessive nesting all fail with
    /// [`CompileError::InvalidExpression`] carrying `source`.
    pub fn compile(
        source: &str,
        library: &FunctionLibrary,
        config: &CompilerConfig,
    ) -> Result<Self, CompileError> {
        let tokens = parser::tokenize_expression(source)?;
        let root = parser::parse_tokens(source, &tokens, library, config)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// The raw expression text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `vars`.
    pub fn evaluate(&self, vars: &Variables) -> Result<Value, EvalError> {
        eval::evaluate(&self.root, vars)
    }

    /// Evaluate and require a boolean result.
    pub fn evaluate_bool(&self, vars: &Variables) -> Result<bool, EvalError> {
        match self.evaluate(vars)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::NonBoolean(other.kind())),
        }
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
