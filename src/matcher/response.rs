//! Response content handed to a compiled matcher.
//!
//! The body is kept as raw bytes so `binary` needles can match content that
//! is not valid UTF-8. Text consumers (regexes, DSL variables) see a lossy
//! UTF-8 view.

use crate::expr::Variables;
use crate::registry::Part;
use std::borrow::Cow;

/// The content a matcher is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    /// Headers in received order; names keep their original case.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Raw header block, one `Name: value\r\n` line per header.
    pub fn header_block(&self) -> String {
        let mut block = String::new();
        for (name, value) in &self.headers {
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
        block
    }

    /// The body as text, with invalid UTF-8 sequences replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The bytes selected by `part`.
    pub fn part(&self, part: Part) -> Cow<'_, [u8]> {
        match part {
            Part::Body => Cow::Borrowed(&self.body),
            Part::Header => Cow::Owned(self.header_block().into_bytes()),
            Part::All => {
                let mut content = self.header_block().into_bytes();
                content.extend_from_slice(&self.body);
                Cow::Owned(content)
            }
        }
    }

    /// Lossy UTF-8 view of [`part`](Self::part).
    pub fn part_text(&self, part: Part) -> Cow<'_, str> {
        match part {
            Part::Body => self.body_text(),
            Part::Header => Cow::Owned(self.header_block()),
            Part::All => Cow::Owned(self.header_block() + &self.body_text()),
        }
    }

    /// Variables exposed to DSL expressions.
    ///
    /// - `body` (lossy UTF-8), `all_headers`, `status_code`
    /// - `content_length`: the `Content-Length` header when it parses, else the body length in bytes
    /// - one variable per header, lower-cased with `-` replaced by `_`;
    ///   repeated headers are joined with a space
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();

        for (name, value) in &self.headers {
            let key = name.to_lowercase().replace('-', "_");
            let joined = match vars.get(&key).and_then(|v| v.as_str()) {
                Some(existing) => format!("{existing} {value}"),
                None => value.clone(),
            };
            vars.insert(key, joined);
        }

        let content_length = self
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(self.body.len());

        vars.insert("body", self.body_text().into_owned())
            .insert("all_headers", self.header_block())
            .insert("status_code", self.status_code)
            .insert("content_length", content_length);
        vars
    }
}
