//! Compiler configuration.
//!
//! The compiler has no timeout concept. Pathological input is bounded by the
//! regex size limits and the expression nesting limit configured here; callers
//! that need wall-clock bounds must enforce them outside this crate.

/// Configuration for [`MatcherCompiler`](crate::MatcherCompiler).
///
/// # Examples
///
/// ```rust
/// use probe_matchers::CompilerConfig;
///
/// // Tighter limits for untrusted templates
/// let config = CompilerConfig::default()
///     .with_regex_size_limit(1024 * 1024)
///     .with_max_expression_depth(16);
/// assert_eq!(config.max_expression_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Upper bound on the compiled size of each regex, in bytes.
    ///
    /// Applies to matcher patterns and to regex literals inside expressions.
    ///
    /// **Default**: 10MB (the `regex` crate default)
    pub regex_size_limit: usize,

    /// Upper bound on the lazy DFA cache of each regex, in bytes.
    ///
    /// **Default**: 2MB
    pub regex_dfa_size_limit: usize,

    /// Maximum nesting depth of a single expression.
    ///
    /// Parenthesised groups, unary operators and call arguments each add one
    /// level. Deeper expressions fail with `InvalidExpression`.
    ///
    /// **Default**: 64
    pub max_expression_depth: usize,

    /// Minimum batch size at which `compile_all` switches to parallel compilation.
    ///
    /// **Default**: 64
    pub parallel_threshold: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            regex_size_limit: 10 * (1 << 20),
            regex_dfa_size_limit: 2 * (1 << 20),
            max_expression_depth: 64,
            parallel_threshold: 64,
        }
    }
}

impl CompilerConfig {
    pub fn with_regex_size_limit(mut self, limit: usize) -> Self {
        self.regex_size_limit = limit;
        self
    }

    pub fn with_regex_dfa_size_limit(mut self, limit: usize) -> Self {
        self.regex_dfa_size_limit = limit;
        self
    }

    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// The regex size limits, detached from the rest of the configuration.
    pub fn regex_limits(&self) -> RegexLimits {
        RegexLimits {
            size_limit: self.regex_size_limit,
            dfa_size_limit: self.regex_dfa_size_limit,
        }
    }

    /// Compile a regex under the configured size limits.
    pub(crate) fn build_regex(&self, pattern: &str) -> Result<regex::Regex, regex::Error> {
        self.regex_limits().build(pattern)
    }
}

/// Size limits applied to every regex the crate compiles.
///
/// Compiled expressions carry a copy so patterns computed at evaluation time
/// are held to the same bounds as patterns compiled up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexLimits {
    pub size_limit: usize,
    pub dfa_size_limit: usize,
}

impl Default for RegexLimits {
    fn default() -> Self {
        CompilerConfig::default().regex_limits()
    }
}

impl RegexLimits {
    pub fn build(&self, pattern: &str) -> Result<regex::Regex, regex::Error> {
        regex::RegexBuilder::new(pattern)
            .size_limit(self.size_limit)
            .dfa_size_limit(self.dfa_size_limit)
            .build()
    }
}
