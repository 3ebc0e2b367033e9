//! Multi-literal search used by `word` and `binary` matchers.
//!
//! Every literal of a matcher goes into one AhoCorasick automaton so the
//! content is scanned once regardless of how many literals there are.
//! Duplicates are dropped at build time; the `and` condition only needs each
//! distinct literal to appear once.

use crate::registry::Condition;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, BuildError, MatchKind};

#[derive(Debug, Clone)]
pub(crate) struct LiteralSet {
    automaton: AhoCorasick,
    /// Number of distinct literals in the automaton
    count: usize,
}

impl LiteralSet {
    /// Build a set from `literals`, or `None` if there are none.
    pub(crate) fn build<I, P>(literals: I) -> Result<Option<Self>, BuildError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut unique: Vec<Vec<u8>> = Vec::new();
        for literal in literals {
            let literal = literal.as_ref();
            if !unique.iter().any(|seen| seen.as_slice() == literal) {
                unique.push(literal.to_vec());
            }
        }

        if unique.is_empty() {
            return Ok(None);
        }

        // Overlapping search requires standard match semantics
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&unique)?;

        Ok(Some(Self {
            automaton,
            count: unique.len(),
        }))
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// Whether `haystack` contains any (`or`) or all (`and`) of the literals.
    pub(crate) fn matches(&self, haystack: &[u8], condition: Condition) -> bool {
        match condition {
            Condition::Or => self.automaton.is_match(haystack),
            Condition::And => {
                let mut seen = vec![false; self.count];
                let mut remaining = self.count;
                for found in self.automaton.find_overlapping_iter(haystack) {
                    let index = found.pattern().as_usize();
                    if !seen[index] {
                        seen[index] = true;
                        remaining -= 1;
                        if remaining == 0 {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }
}
