//! Matcher compiler.
//!
//! Turns [`MatcherSpec`]s into [`CompiledMatcher`]s. Compilation is
//! all-or-nothing and fail-fast: the first invalid field aborts with a
//! [`CompileError`] and nothing partially compiled escapes.
//!
//! # Examples
//!
//! ```rust
//! use probe_matchers::{Condition, MatcherCompiler, MatcherSpec, MatcherType, Part};
//!
//! let compiler = MatcherCompiler::new();
//! let matcher = compiler.compile(
//!     &MatcherSpec::new("regex").with_patterns(["admin", "login"]),
//! )?;
//!
//! assert_eq!(matcher.kind(), MatcherType::Regex);
//! assert_eq!(matcher.condition(), Condition::Or);
//! assert_eq!(matcher.part(), Part::Body);
//! assert_eq!(matcher.patterns().len(), 2);
//! # Ok::<(), probe_matchers::CompileError>(())
//! ```
//!
//! With a custom helper library:
//! ```rust
//! use probe_matchers::expr::{Value, ValueKind};
//! use probe_matchers::functions::FunctionLibrary;
//! use probe_matchers::{MatcherCompiler, MatcherSpec};
//! use std::sync::Arc;
//!
//! let mut library = FunctionLibrary::new();
//! library.register("is_teapot", &[ValueKind::Number], ValueKind::Bool, |args| {
//!     Ok(Value::Bool(args[0].as_number() == Some(418.0)))
//! });
//!
//! let compiler = MatcherCompiler::with_library(Arc::new(library));
//! let matcher = compiler.compile(
//!     &MatcherSpec::new("dsl").with_expressions(["is_teapot(status_code)"]),
//! )?;
//! assert_eq!(matcher.expressions().len(), 1);
//! # Ok::<(), probe_matchers::CompileError>(())
//! ```

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::expr::CompiledExpression;
use crate::functions::{default_library, FunctionLibrary};
use crate::matcher::literals::LiteralSet;
use crate::matcher::{CompiledMatcher, MatcherSpec};
use crate::registry::{Condition, MatcherType, Part};

use rayon::prelude::*;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, trace};

/// Compiles matcher specifications.
///
/// Holds only a shared, read-only function library and a configuration, so
/// a single compiler can be used from many threads at once.
#[derive(Debug, Clone)]
pub struct MatcherCompiler {
    library: Arc<FunctionLibrary>,
    config: CompilerConfig,
}

impl MatcherCompiler {
    /// Create a compiler with the default function library and configuration.
    pub fn new() -> Self {
        Self {
            library: default_library(),
            config: CompilerConfig::default(),
        }
    }

    /// Create a compiler that resolves expression calls against `library`.
    pub fn with_library(library: Arc<FunctionLibrary>) -> Self {
        Self {
            library,
            config: CompilerConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn library(&self) -> &FunctionLibrary {
        &self.library
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a single matcher.
    ///
    /// Fields are validated in this order, and the first failure is returned:
    /// type, patterns, expressions, words, binary, condition, part.
    pub fn compile(&self, spec: &MatcherSpec) -> Result<CompiledMatcher, CompileError> {
        match self.compile_inner(spec) {
            Ok(matcher) => {
                debug!(
                    matcher = spec.name.as_deref().unwrap_or(""),
                    kind = %matcher.kind,
                    patterns = matcher.patterns.len(),
                    expressions = matcher.expressions.len(),
                    words = matcher.words.as_ref().map_or(0, LiteralSet::len),
                    condition = %matcher.condition,
                    part = %matcher.part,
                    "compiled matcher"
                );
                Ok(matcher)
            }
            Err(err) => {
                debug!(
                    matcher = spec.name.as_deref().unwrap_or(""),
                    field = err.field(),
                    error = %err,
                    "matcher compilation failed"
                );
                Err(err)
            }
        }
    }

    /// Compile a batch of matchers.
    ///
    /// Output order matches input order. If any spec fails, the error of the
    /// earliest failing spec is returned. Batches of at least
    /// [`CompilerConfig::parallel_threshold`] specs are compiled on the rayon
    /// thread pool.
    pub fn compile_all(&self, specs: &[MatcherSpec]) -> Result<Vec<CompiledMatcher>, CompileError> {
        if specs.len() >= self.config.parallel_threshold {
            let results: Vec<Result<CompiledMatcher, CompileError>> =
                specs.par_iter().map(|spec| self.compile(spec)).collect();
            results.into_iter().collect()
        } else {
            specs.iter().map(|spec| self.compile(spec)).collect()
        }
    }

    fn compile_inner(&self, spec: &MatcherSpec) -> Result<CompiledMatcher, CompileError> {
        let kind: MatcherType = spec.matcher_type.parse()?;
        let patterns = self.compile_patterns(&spec.patterns)?;
        let expressions = self.compile_expressions(&spec.expressions)?;

        let words = LiteralSet::build(&spec.words)
            .map_err(|e| CompileError::InvalidWords(e.to_string()))?;
        let binary = compile_binary(&spec.binary)?;

        let condition = if spec.condition.is_empty() {
            Condition::default()
        } else {
            spec.condition.parse()?
        };
        let part = if spec.part.is_empty() {
            Part::default()
        } else {
            spec.part.parse()?
        };

        Ok(CompiledMatcher {
            name: spec.name.clone(),
            kind,
            condition,
            part,
            negative: spec.negative,
            patterns,
            expressions,
            words,
            binary,
            status: spec.status.clone(),
            size: spec.size.clone(),
        })
    }

    fn compile_patterns(&self, patterns: &[String]) -> Result<Vec<Regex>, CompileError> {
        patterns
            .iter()
            .map(|pattern| {
                self.config
                    .build_regex(pattern)
                    .map_err(|e| CompileError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    fn compile_expressions(
        &self,
        expressions: &[String],
    ) -> Result<Vec<CompiledExpression>, CompileError> {
        expressions
            .iter()
            .map(|source| {
                trace!(expression = %source, "compiling expression");
                CompiledExpression::compile(source, &self.library, &self.config)
            })
            .collect()
    }
}

impl Default for MatcherCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode hex needles and build their literal set.
fn compile_binary(values: &[String]) -> Result<Option<LiteralSet>, CompileError> {
    let needles = values
        .iter()
        .map(|value| {
            hex::decode(value).map_err(|e| CompileError::InvalidBinary {
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<Vec<u8>>, CompileError>>()?;

    LiteralSet::build(&needles).map_err(|e| CompileError::InvalidBinary {
        value: values.join(","),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_defaults() {
        let compiler = MatcherCompiler::new();
        let matcher = compiler.compile(&MatcherSpec::new("word")).unwrap();

        assert_eq!(matcher.kind(), MatcherType::Word);
        assert_eq!(matcher.condition(), Condition::Or);
        assert_eq!(matcher.part(), Part::Body);
        assert!(matcher.patterns().is_empty());
        assert!(matcher.expressions().is_empty());
        assert!(!matcher.is_negative());
    }

    #[test]
    fn test_compile_preserves_order() {
        let compiler = MatcherCompiler::new();
        let matcher = compiler
            .compile(
                &MatcherSpec::new("dsl")
                    .with_patterns(["z+", "a+", "m+"])
                    .with_expressions(["true", "1 == 1", "false"]),
            )
            .unwrap();

        let patterns: Vec<&str> = matcher.patterns().iter().map(|re| re.as_str()).collect();
        assert_eq!(patterns, ["z+", "a+", "m+"]);

        let expressions: Vec<&str> = matcher.expressions().iter().map(|e| e.source()).collect();
        assert_eq!(expressions, ["true", "1 == 1", "false"]);
    }

    #[test]
    fn test_unknown_type() {
        let err = MatcherCompiler::new()
            .compile(&MatcherSpec::new("xpath"))
            .unwrap_err();
        assert_eq!(err, CompileError::UnknownMatcherType("xpath".to_string()));
        assert_eq!(err.field(), "type");
    }

    #[test]
    fn test_invalid_pattern_reports_first_failure() {
        let err = MatcherCompiler::new()
            .compile(&MatcherSpec::new("regex").with_patterns(["ok", "(", "["]))
            .unwrap_err();
        match err {
            CompileError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "("),
            other => panic!("Expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_expression() {
        let err = MatcherCompiler::new()
            .compile(&MatcherSpec::new("dsl").with_expressions(["nosuchfn(body)"]))
            .unwrap_err();
        match err {
            CompileError::InvalidExpression { expression, reason } => {
                assert_eq!(expression, "nosuchfn(body)");
                assert!(reason.contains("unknown function"));
            }
            other => panic!("Expected InvalidExpression, got {other:?}"),
        }
    }

    #[test]
    fn test_pattern_checked_before_type_specific_fields() {
        // Type is resolved first, then patterns, then expressions
        let spec = MatcherSpec::new("regex")
            .with_patterns(["("])
            .with_expressions(["len("])
            .with_condition("xor");
        assert!(matches!(
            MatcherCompiler::new().compile(&spec),
            Err(CompileError::InvalidPattern { .. })
        ));

        let spec = MatcherSpec::new("bogus").with_patterns(["("]);
        assert!(matches!(
            MatcherCompiler::new().compile(&spec),
            Err(CompileError::UnknownMatcherType(_))
        ));
    }

    #[test]
    fn test_invalid_binary() {
        let err = MatcherCompiler::new()
            .compile(&MatcherSpec::new("binary").with_binary(["504b", "zz"]))
            .unwrap_err();
        match err {
            CompileError::InvalidBinary { value, .. } => assert_eq!(value, "zz"),
            other => panic!("Expected InvalidBinary, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_condition_and_part() {
        let compiler = MatcherCompiler::new();

        let err = compiler
            .compile(&MatcherSpec::new("word").with_condition("AND"))
            .unwrap_err();
        assert_eq!(err, CompileError::UnknownCondition("AND".to_string()));

        let err = compiler
            .compile(&MatcherSpec::new("word").with_part("cookie"))
            .unwrap_err();
        assert_eq!(err, CompileError::UnknownPart("cookie".to_string()));
        assert_eq!(err.value(), "cookie");
    }

    #[test]
    fn test_regex_size_limit_applies() {
        let compiler =
            MatcherCompiler::new().with_config(CompilerConfig::default().with_regex_size_limit(16));
        let err = compiler
            .compile(&MatcherSpec::new("regex").with_patterns([r"\w{100}"]))
            .unwrap_err();
        assert_eq!(err.field(), "regex");
    }

    #[test]
    fn test_compile_all_sequential_and_parallel_agree() {
        let specs: Vec<MatcherSpec> = (0..10)
            .map(|i| MatcherSpec::new("regex").with_patterns([format!("item{i}")]))
            .collect();

        let sequential = MatcherCompiler::new().compile_all(&specs).unwrap();
        let parallel = MatcherCompiler::new()
            .with_config(CompilerConfig::default().with_parallel_threshold(1))
            .compile_all(&specs)
            .unwrap();

        assert_eq!(sequential.len(), 10);
        for (i, (a, b)) in sequential.iter().zip(&parallel).enumerate() {
            let expected = format!("item{i}");
            assert_eq!(a.patterns()[0].as_str(), expected);
            assert_eq!(b.patterns()[0].as_str(), expected);
        }
    }

    #[test]
    fn test_compile_all_reports_earliest_error() {
        let mut specs: Vec<MatcherSpec> = (0..20).map(|_| MatcherSpec::new("status")).collect();
        specs[7] = MatcherSpec::new("regex").with_patterns(["("]);
        specs[15] = MatcherSpec::new("nope");

        let compiler = MatcherCompiler::new()
            .with_config(CompilerConfig::default().with_parallel_threshold(1));
        assert!(matches!(
            compiler.compile_all(&specs),
            Err(CompileError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_compiler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MatcherCompiler>();
    }
}
