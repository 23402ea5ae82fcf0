use regex::Regex;
use tracing::debug;

use crate::error::{Result, TraceError};

/// Compiled regular expression over an atom identifier
/// (`chain:residue_name:residue_number:atom_name`).
///
/// Matching succeeds when the expression matches at the start of the
/// identifier; it does not have to consume the whole string, so `A:GLU:143:O`
/// also selects `A:GLU:143:OE1`.
#[derive(Debug, Clone)]
pub struct AtomSelector {
    pattern: String,
    regex: Regex,
}

impl AtomSelector {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            TraceError::InvalidSelector {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, atom: &str) -> bool {
        self.regex.is_match(atom)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// A pair of selectors describing one interaction of interest
#[derive(Debug, Clone)]
pub struct InteractionPattern {
    pub selector_a: AtomSelector,
    pub selector_b: AtomSelector,
}

impl InteractionPattern {
    /// Compile a raw `"<selector_a> <selector_b>"` string.
    pub fn parse(raw: &str) -> Result<Self> {
        let (a, b) = split_pair(raw)?;
        Ok(Self {
            selector_a: AtomSelector::new(a)?,
            selector_b: AtomSelector::new(b)?,
        })
    }

    /// True if the selectors match the two atoms in either orientation.
    pub fn matches(&self, atom_0: &str, atom_1: &str) -> bool {
        (self.selector_a.is_match(atom_0) && self.selector_b.is_match(atom_1))
            || (self.selector_a.is_match(atom_1) && self.selector_b.is_match(atom_0))
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    match tokens.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(TraceError::MalformedPattern {
            pattern: raw.to_string(),
            tokens: tokens.len(),
        }),
    }
}

pub struct PatternSet;

impl PatternSet {
    /// Compile every raw pattern, preserving input order.
    ///
    /// All token counts are validated before any expression is compiled, so
    /// a malformed entry anywhere in the list is reported first.
    pub fn compile<S: AsRef<str>>(raw_patterns: &[S]) -> Result<Vec<InteractionPattern>> {
        for raw in raw_patterns {
            split_pair(raw.as_ref())?;
        }
        let patterns = raw_patterns
            .iter()
            .map(|raw| InteractionPattern::parse(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = patterns.len(), "Compiled interaction patterns.");
        Ok(patterns)
    }
}
