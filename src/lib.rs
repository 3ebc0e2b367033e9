//! # Probe Matchers
//!
//! Compiles declarative response matchers, as written in scanning templates,
//! into validated, immutable objects that can be evaluated many times against
//! response content.
//!
//! A matcher names a type (`status`, `size`, `word`, `regex`, `binary`,
//! `dsl`), a list of items to test, a condition (`and`/`or`) combining the
//! per-item results, and the part of the response (`body`, `header`, `all`)
//! to look at. Compilation validates all of it up front: an invalid regex,
//! an expression calling an unknown helper or an unknown part name fails at
//! load time instead of silently never matching during a scan.
//!
//! ## Quick Start
//!
//! ```rust
//! use probe_matchers::{MatcherCompiler, MatcherSpec, Response};
//!
//! let specs = MatcherSpec::list_from_yaml(
//!     r#"
//! - type: status
//!   status: [200]
//! - type: dsl
//!   dsl:
//!     - 'contains(tolower(body), "phpinfo()")'
//!     - 'server =~ "Apache"'
//!   condition: and
//! "#,
//! )?;
//!
//! let compiler = MatcherCompiler::new();
//! let matchers = compiler.compile_all(&specs)?;
//!
//! let response = Response::new(200)
//!     .with_header("Server", "Apache/2.4.41")
//!     .with_body("<title>PHPINFO()</title>");
//!
//! assert!(matchers.iter().all(|m| m.matches(&response)));
//! # Ok::<(), probe_matchers::Error>(())
//! ```
//!
//! ### Configuration
//!
//! ```rust
//! use probe_matchers::{CompilerConfig, MatcherCompiler, MatcherSpec};
//!
//! let compiler = MatcherCompiler::new().with_config(
//!     CompilerConfig::default()
//!         .with_regex_size_limit(64 * 1024)
//!         .with_max_expression_depth(8),
//! );
//!
//! let err = compiler
//!     .compile(&MatcherSpec::new("regex").with_patterns(["("]))
//!     .unwrap_err();
//! assert_eq!(err.field(), "regex");
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` for every compiled or rejected
//! matcher, `trace` per expression, and `warn` when
//! [`CompiledMatcher::matches`] turns an evaluation error into a non-match.
//! No subscriber is installed.

pub mod compiler;
pub mod config;
pub mod error;
pub mod expr;
pub mod functions;
pub mod matcher;
pub mod registry;

// Compiler and configuration
pub use compiler::MatcherCompiler;
pub use config::CompilerConfig;

// Core types and errors
pub use error::{CompileError, Error, EvalError, Result};
pub use registry::{Condition, MatcherType, Part};

// Matchers
pub use matcher::{CompiledMatcher, MatcherSpec, Response};

// Expression helpers
pub use functions::{default_library, FunctionLibrary};
