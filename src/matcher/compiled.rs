//! Compiled matchers.

use super::literals::LiteralSet;
use super::response::Response;
use crate::error::EvalError;
use crate::expr::{CompiledExpression, Variables};
use crate::registry::{Condition, MatcherType, Part};
use regex::Regex;
use tracing::warn;

/// A validated, ready-to-evaluate matcher.
///
/// Produced only by [`MatcherCompiler`](crate::MatcherCompiler). Every regex
/// and expression has been compiled, and the type, condition and part are
/// resolved to their enum values, so evaluation never re-parses anything.
///
/// A `CompiledMatcher` is immutable and `Send + Sync`. Share it across
/// threads behind an `Arc` and evaluate concurrently.
///
/// # Example
/// ```rust
/// use probe_matchers::{MatcherCompiler, MatcherSpec, Response};
///
/// let compiler = MatcherCompiler::new();
/// let matcher = compiler.compile(
///     &MatcherSpec::new("word").with_words(["Index of /"]).with_part("body"),
/// )?;
///
/// let response = Response::new(200).with_body("<title>Index of /backup</title>");
/// assert!(matcher.matches(&response));
/// # Ok::<(), probe_matchers::CompileError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    pub(crate) name: Option<String>,
    pub(crate) kind: MatcherType,
    pub(crate) condition: Condition,
    pub(crate) part: Part,
    pub(crate) negative: bool,
    pub(crate) patterns: Vec<Regex>,
    pub(crate) expressions: Vec<CompiledExpression>,
    pub(crate) words: Option<LiteralSet>,
    pub(crate) binary: Option<LiteralSet>,
    pub(crate) status: Vec<u16>,
    pub(crate) size: Vec<usize>,
}

impl CompiledMatcher {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> MatcherType {
        self.kind
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn part(&self) -> Part {
        self.part
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Compiled regexes, in the order they were written.
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Compiled expressions, in the order they were written.
    pub fn expressions(&self) -> &[CompiledExpression] {
        &self.expressions
    }

    pub fn status(&self) -> &[u16] {
        &self.status
    }

    pub fn size(&self) -> &[usize] {
        &self.size
    }

    /// Indices of the patterns that match `content`, in ascending order.
    pub fn matching_patterns(&self, content: &str) -> Vec<usize> {
        self.patterns
            .iter()
            .enumerate()
            .filter(|(_, re)| re.is_match(content))
            .map(|(index, _)| index)
            .collect()
    }

    /// Evaluate against a response.
    ///
    /// The result already accounts for `negative`. Only `dsl` matchers can
    /// fail; the other kinds always return `Ok`.
    pub fn evaluate(&self, response: &Response) -> Result<bool, EvalError> {
        let matched = match self.kind {
            MatcherType::Status => self
                .condition
                .combine(self.status.iter().map(|code| *code == response.status_code)),
            MatcherType::Size => {
                let length = response.part(self.part).len();
                self.condition
                    .combine(self.size.iter().map(|size| *size == length))
            }
            MatcherType::Word => self.literal_match(self.words.as_ref(), response),
            MatcherType::Binary => self.literal_match(self.binary.as_ref(), response),
            MatcherType::Regex => {
                let content = response.part_text(self.part);
                self.condition
                    .combine(self.patterns.iter().map(|re| re.is_match(&content)))
            }
            MatcherType::Dsl => self.evaluate_expressions(&response.variables())?,
        };

        Ok(matched != self.negative)
    }

    /// Combine the expressions over caller-supplied variables.
    ///
    /// Unlike [`evaluate`](Self::evaluate) this ignores `negative` and the
    /// matcher type.
    pub fn evaluate_expressions(&self, vars: &Variables) -> Result<bool, EvalError> {
        self.condition
            .try_combine(self.expressions.iter().map(|expr| expr.evaluate_bool(vars)))
    }

    /// Like [`evaluate`](Self::evaluate), with evaluation failures reported
    /// as a non-match.
    pub fn matches(&self, response: &Response) -> bool {
        match self.evaluate(response) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(
                    matcher = self.name.as_deref().unwrap_or(""),
                    kind = %self.kind,
                    error = %err,
                    "matcher evaluation failed"
                );
                false
            }
        }
    }

    fn literal_match(&self, literals: Option<&LiteralSet>, response: &Response) -> bool {
        match literals {
            Some(set) => set.matches(&response.part(self.part), self.condition),
            None => false,
        }
    }
}
