//! Helper functions callable from expressions.
//!
//! A [`FunctionLibrary`] maps names to [`HelperFunction`]s. Each helper
//! declares the kind of every argument and of its result. Arity is checked
//! when an expression is compiled; argument kinds are checked on every call,
//! because values only exist at evaluation time. A helper receiving the wrong
//! kind fails with [`EvalError::ArgumentType`]; nothing is coerced. A helper
//! returning a value of a kind other than the one it declared fails with
//! [`EvalError::ReturnType`].
//!
//! Pattern helpers (registered with [`FunctionLibrary::register_pattern`])
//! receive one of their string arguments as a compiled regex. When that
//! argument is a string literal the expression compiler builds the regex
//! once, under the configured size limits.
//!
//! The default library is built once per process and shared through
//! [`default_library`]. It is read-only, so compiled expressions running on
//! many threads can call into it without locking.

pub mod defaults;

use crate::config::RegexLimits;
use crate::error::EvalError;
use crate::expr::{Value, ValueKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Helper implementation signature.
///
/// Receives the already evaluated arguments, in call order. By the time it is
/// invoked the argument count and kinds have been validated against the
/// helper's declared parameters.
///
/// # Example
/// ```rust,ignore
/// let shout: HelperFn = Arc::new(|args| {
///     let s = defaults::string_arg("shout", args, 0)?;
///     Ok(Value::String(format!("{}!", s.to_uppercase())))
/// });
/// ```
pub type HelperFn = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// Pattern helper implementation signature.
///
/// Receives the regex compiled from the pattern argument along with every
/// evaluated argument; the pattern's source string is still in `args`.
pub type PatternFn = Arc<dyn Fn(&Regex, &[Value]) -> Result<Value, EvalError> + Send + Sync>;

#[derive(Clone)]
enum HelperBody {
    Plain(HelperFn),
    Pattern { position: usize, func: PatternFn },
}

/// A named helper with its declared signature.
#[derive(Clone)]
pub struct HelperFunction {
    name: String,
    params: Vec<ValueKind>,
    returns: ValueKind,
    body: HelperBody,
}

impl HelperFunction {
    pub fn new<F>(name: &str, params: &[ValueKind], returns: ValueKind, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            params: params.to_vec(),
            returns,
            body: HelperBody::Plain(Arc::new(func)),
        }
    }

    /// Create a helper whose argument at `position` is a regex pattern.
    pub fn with_pattern<F>(
        name: &str,
        params: &[ValueKind],
        returns: ValueKind,
        position: usize,
        func: F,
    ) -> Self
    where
        F: Fn(&Regex, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            params: params.to_vec(),
            returns,
            body: HelperBody::Pattern {
                position,
                func: Arc::new(func),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn returns(&self) -> ValueKind {
        self.returns
    }

    /// Position of the regex pattern argument, for pattern helpers.
    pub fn pattern_position(&self) -> Option<usize> {
        match self.body {
            HelperBody::Plain(_) => None,
            HelperBody::Pattern { position, .. } => Some(position),
        }
    }

    /// Validate `args` against the declared parameters, then invoke.
    ///
    /// A pattern argument is compiled under the default [`RegexLimits`].
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        self.call_with_limits(args, &RegexLimits::default())
    }

    /// Like [`call`](Self::call), compiling a pattern argument under `limits`.
    pub fn call_with_limits(
        &self,
        args: &[Value],
        limits: &RegexLimits,
    ) -> Result<Value, EvalError> {
        self.check_args(args)?;

        let value = match &self.body {
            HelperBody::Plain(func) => func(args)?,
            HelperBody::Pattern { position, func } => {
                let pattern = defaults::string_arg(&self.name, args, *position)?;
                let regex = limits.build(pattern).map_err(|e| EvalError::InvalidRegex {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                func(&regex, args)?
            }
        };

        self.check_return(value)
    }

    /// Like [`call`](Self::call), with the pattern argument already compiled.
    ///
    /// Plain helpers ignore `regex`.
    pub fn call_with_regex(&self, regex: &Regex, args: &[Value]) -> Result<Value, EvalError> {
        self.check_args(args)?;

        let value = match &self.body {
            HelperBody::Plain(func) => func(args)?,
            HelperBody::Pattern { func, .. } => func(regex, args)?,
        };

        self.check_return(value)
    }

    fn check_args(&self, args: &[Value]) -> Result<(), EvalError> {
        if args.len() != self.params.len() {
            return Err(EvalError::Arity {
                function: self.name.clone(),
                expected: self.params.len(),
                found: args.len(),
            });
        }

        for (position, (arg, expected)) in args.iter().zip(&self.params).enumerate() {
            if arg.kind() != *expected {
                return Err(EvalError::ArgumentType {
                    function: self.name.clone(),
                    position,
                    expected: *expected,
                    found: arg.kind(),
                });
            }
        }

        Ok(())
    }

    fn check_return(&self, value: Value) -> Result<Value, EvalError> {
        if value.kind() != self.returns {
            return Err(EvalError::ReturnType {
                function: self.name.clone(),
                expected: self.returns,
                found: value.kind(),
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for HelperFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("pattern", &self.pattern_position())
            .finish_non_exhaustive()
    }
}

/// Registry of helpers available to compiled expressions.
///
/// # Example
/// ```rust
/// use probe_matchers::expr::{Value, ValueKind};
/// use probe_matchers::functions::FunctionLibrary;
///
/// let mut library = FunctionLibrary::new();
/// library.register("double", &[ValueKind::Number], ValueKind::Number, |args| {
///     Ok(Value::Number(args[0].as_number().unwrap_or_default() * 2.0))
/// });
///
/// assert!(library.contains("double"));
/// assert!(library.contains("md5"));
/// ```
#[derive(Clone, Debug)]
pub struct FunctionLibrary {
    functions: HashMap<String, Arc<HelperFunction>>,
}

impl FunctionLibrary {
    /// Create a library holding the default helpers.
    pub fn new() -> Self {
        let mut library = Self::empty();
        defaults::register_defaults(&mut library);
        library
    }

    /// Create a library with no helpers at all.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register a helper, replacing any previous helper of the same name.
    pub fn register<F>(
        &mut self,
        name: &str,
        params: &[ValueKind],
        returns: ValueKind,
        func: F,
    ) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.to_string(),
            Arc::new(HelperFunction::new(name, params, returns, func)),
        );
        self
    }

    /// Register a pattern helper, replacing any previous helper of the same name.
    ///
    /// The argument at `position` must be declared as a string.
    pub fn register_pattern<F>(
        &mut self,
        name: &str,
        params: &[ValueKind],
        returns: ValueKind,
        position: usize,
        func: F,
    ) -> &mut Self
    where
        F: Fn(&Regex, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(
            name.to_string(),
            Arc::new(HelperFunction::with_pattern(name, params, returns, position, func)),
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<HelperFunction>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered helper names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionLibrary {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_LIBRARY: Lazy<Arc<FunctionLibrary>> = Lazy::new(|| Arc::new(FunctionLibrary::new()));

/// The process-wide default library.
pub fn default_library() -> Arc<FunctionLibrary> {
    Arc::clone(&DEFAULT_LIBRARY)
}
