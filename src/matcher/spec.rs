//! Matcher specifications as authored in templates.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A raw, uncompiled matcher.
///
/// All fields are plain data; nothing is validated until the spec is handed
/// to [`MatcherCompiler::compile`](crate::MatcherCompiler::compile). Field
/// names follow the template format, so a spec deserializes directly from
/// YAML:
///
/// ```rust
/// use probe_matchers::MatcherSpec;
///
/// let spec = MatcherSpec::from_yaml(
///     r#"
/// type: regex
/// part: header
/// condition: and
/// regex:
///   - "Server: nginx"
///   - "X-Powered-By: PHP/[0-9.]+"
/// "#,
/// )?;
///
/// assert_eq!(spec.matcher_type, "regex");
/// assert_eq!(spec.patterns.len(), 2);
/// # Ok::<(), probe_matchers::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSpec {
    /// Optional label used in logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Matcher type identifier (`status`, `size`, `word`, `regex`, `binary`, `dsl`).
    #[serde(rename = "type")]
    pub matcher_type: String,

    /// Regular expressions, in order.
    #[serde(rename = "regex", alias = "patterns", skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,

    /// DSL expressions, in order.
    #[serde(rename = "dsl", alias = "expressions", skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<String>,

    /// Literal words.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<String>,

    /// Hex-encoded byte sequences.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub binary: Vec<String>,

    /// Accepted status codes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<u16>,

    /// Accepted content sizes in bytes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub size: Vec<usize>,

    /// `and` / `or`; empty means `or`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub condition: String,

    /// `body` / `header` / `all`; empty means `body`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub part: String,

    /// Invert the final result.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub negative: bool,
}

impl MatcherSpec {
    pub fn new(matcher_type: &str) -> Self {
        Self {
            matcher_type: matcher_type.to_string(),
            ..Self::default()
        }
    }

    /// Parse a single matcher from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a YAML sequence of matchers.
    pub fn list_from_yaml(yaml: &str) -> Result<Vec<Self>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expressions<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expressions = expressions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_binary<I, S>(mut self, binary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary = binary.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: &[u16]) -> Self {
        self.status = status.to_vec();
        self
    }

    pub fn with_size(mut self, size: &[usize]) -> Self {
        self.size = size.to_vec();
        self
    }

    pub fn with_condition(mut self, condition: &str) -> Self {
        self.condition = condition.to_string();
        self
    }

    pub fn with_part(mut self, part: &str) -> Self {
        self.part = part.to_string();
        self
    }

    pub fn negative(mut self) -> Self {
        self.negative = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_builder() {
        let spec = MatcherSpec::new("regex")
            .with_name("nginx")
            .with_patterns(["a", "b"])
            .with_condition("and")
            .with_part("header");

        assert_eq!(spec.matcher_type, "regex");
        assert_eq!(spec.name.as_deref(), Some("nginx"));
        assert_eq!(spec.patterns, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(spec.condition, "and");
        assert_eq!(spec.part, "header");
        assert!(spec.expressions.is_empty());
        assert!(!spec.negative);
    }

    #[test]
    fn test_from_yaml_template_keys() {
        let spec = MatcherSpec::from_yaml(
            r#"
type: dsl
dsl:
  - "status_code == 200"
  - 'contains(body, "admin")'
"#,
        )
        .unwrap();

        assert_eq!(spec.matcher_type, "dsl");
        assert_eq!(spec.expressions.len(), 2);
        assert_eq!(spec.expressions[1], r#"contains(body, "admin")"#);
        assert!(spec.condition.is_empty());
        assert!(spec.part.is_empty());
    }

    #[test]
    fn test_from_yaml_aliases() {
        let spec = MatcherSpec::from_yaml(
            r#"
type: regex
patterns: ["a.*"]
expressions: ["true"]
"#,
        )
        .unwrap();
        assert_eq!(spec.patterns, vec!["a.*".to_string()]);
        assert_eq!(spec.expressions, vec!["true".to_string()]);
    }

    #[test]
    fn test_list_from_yaml() {
        let specs = MatcherSpec::list_from_yaml(
            r#"
- type: status
  status: [200, 302]
- type: word
  words: ["admin", "login"]
  negative: true
"#,
        )
        .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].status, vec![200, 302]);
        assert_eq!(specs[1].words.len(), 2);
        assert!(specs[1].negative);
    }

    #[test]
    fn test_from_yaml_error() {
        let err = MatcherSpec::from_yaml("type: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let spec = MatcherSpec::new("word").with_words(["x"]);
        let yaml = serde_yaml::to_string(&spec).unwrap();
        assert!(yaml.contains("type: word"));
        assert!(yaml.contains("words:"));
        assert!(!yaml.contains("regex"));
        assert!(!yaml.contains("negative"));

        let round_trip = MatcherSpec::from_yaml(&yaml).unwrap();
        assert_eq!(round_trip, spec);
    }
}
