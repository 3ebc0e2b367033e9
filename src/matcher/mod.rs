//! Matcher specifications, compiled matchers and the content they run against.
//!
//! ## Lifecycle
//!
//! - [`MatcherSpec`] - raw matcher as written in a template, usually loaded from YAML
//! - [`MatcherCompiler`](crate::MatcherCompiler) - validates a spec and compiles its regexes and expressions
//! - [`CompiledMatcher`] - immutable result, evaluated against a [`Response`]
//!
//! ## Matcher Types
//!
//! | type | list | compared against |
//! |------|------|------------------|
//! | `status` | `status` | response status code |
//! | `size` | `size` | byte length of the selected part |
//! | `word` | `words` | literal substrings of the selected part |
//! | `binary` | `binary` | hex-decoded byte sequences in the selected part |
//! | `regex` | `regex` | regular expressions over a lossy UTF-8 view of the selected part |
//! | `dsl` | `dsl` | boolean expressions over response variables |
//!
//! The per-item results are combined with the matcher's condition (`or` by
//! default). An empty list never matches. `negative: true` inverts the final
//! result.

pub mod compiled;
pub(crate) mod literals;
pub mod response;
pub mod spec;

pub use compiled::CompiledMatcher;
pub use response::Response;
pub use spec::MatcherSpec;
