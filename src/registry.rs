//! Closed registries for matcher type, combination condition and target part.
//!
//! Each registry is a plain enum with a case-sensitive [`lookup`] from its
//! textual identifier. Lookups never fail; they return `None` for unknown
//! identifiers and leave error construction to the caller (see the `FromStr`
//! impls, which map misses onto the matching [`CompileError`]).
//!
//! [`lookup`]: MatcherType::lookup

use crate::error::CompileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Matching strategy selected by a matcher's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherType {
    /// Match on the response status code.
    Status,
    /// Match on the byte length of the selected part.
    Size,
    /// Match literal words.
    Word,
    /// Match regular expressions.
    Regex,
    /// Match hex-encoded byte sequences.
    Binary,
    /// Match boolean DSL expressions.
    Dsl,
}

impl MatcherType {
    pub const ALL: [MatcherType; 6] = [
        MatcherType::Status,
        MatcherType::Size,
        MatcherType::Word,
        MatcherType::Regex,
        MatcherType::Binary,
        MatcherType::Dsl,
    ];

    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "status" => Some(MatcherType::Status),
            "size" => Some(MatcherType::Size),
            "word" => Some(MatcherType::Word),
            "regex" => Some(MatcherType::Regex),
            "binary" => Some(MatcherType::Binary),
            "dsl" => Some(MatcherType::Dsl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatcherType::Status => "status",
            MatcherType::Size => "size",
            MatcherType::Word => "word",
            MatcherType::Regex => "regex",
            MatcherType::Binary => "binary",
            MatcherType::Dsl => "dsl",
        }
    }
}

/// How the individual results inside one matcher combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Every entry has to match.
    And,
    /// At least one entry has to match.
    #[default]
    Or,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::And, Condition::Or];

    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Condition::And),
            "or" => Some(Condition::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::And => "and",
            Condition::Or => "or",
        }
    }

    /// Combine a sequence of results, stopping at the first decisive one.
    ///
    /// An empty sequence never matches, for either condition.
    pub fn combine<I>(self, results: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut seen_any = false;
        for result in results {
            seen_any = true;
            match (self, result) {
                (Condition::Or, true) => return true,
                (Condition::And, false) => return false,
                _ => {}
            }
        }
        seen_any && self == Condition::And
    }

    /// Fallible variant of [`Condition::combine`]; the first error aborts.
    pub fn try_combine<I, E>(self, results: I) -> Result<bool, E>
    where
        I: IntoIterator<Item = Result<bool, E>>,
    {
        let mut seen_any = false;
        for result in results {
            seen_any = true;
            match (self, result?) {
                (Condition::Or, true) => return Ok(true),
                (Condition::And, false) => return Ok(false),
                _ => {}
            }
        }
        Ok(seen_any && self == Condition::And)
    }
}

/// Slice of the target content a matcher inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    /// The response body.
    #[default]
    Body,
    /// The raw header block.
    Header,
    /// Headers followed by the body.
    All,
}

impl Part {
    pub const ALL: [Part; 3] = [Part::Body, Part::Header, Part::All];

    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "body" => Some(Part::Body),
            "header" => Some(Part::Header),
            "all" => Some(Part::All),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Part::Body => "body",
            Part::Header => "header",
            Part::All => "all",
        }
    }
}

impl FromStr for MatcherType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| CompileError::UnknownMatcherType(s.to_string()))
    }
}

impl FromStr for Condition {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| CompileError::UnknownCondition(s.to_string()))
    }
}

impl FromStr for Part {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| CompileError::UnknownPart(s.to_string()))
    }
}

impl fmt::Display for MatcherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
