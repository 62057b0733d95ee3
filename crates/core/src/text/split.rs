//! Word splitting ahead of BPE.
//!
//! Words are whitespace-delimited. Special-token literals are cut out of
//! the text even when glued to a neighbour (`रामः<DANDA>`), so they always
//! reach the trainer and the tokenizer as standalone atomic words.

use crate::error::{Result, ShabdaError};
use regex::Regex;

/// Splits text into words, isolating special-token literals.
#[derive(Debug, Clone)]
pub struct WordSplitter {
    specials: Option<Regex>,
}

impl WordSplitter {
    /// Build a splitter that isolates the given literals.
    pub fn new<'a, I>(specials: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut literals: Vec<&str> = specials.into_iter().filter(|s| !s.is_empty()).collect();
        if literals.is_empty() {
            return Ok(Self::whitespace());
        }

        // Longest literal first so a literal that prefixes another never wins.
        literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        literals.dedup();

        let pattern = literals
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&pattern)
            .map_err(|e| ShabdaError::InvalidConfig(format!("special token pattern: {}", e)))?;

        Ok(Self { specials: Some(re) })
    }

    /// Plain whitespace splitting.
    pub fn whitespace() -> Self {
        Self { specials: None }
    }

    /// Split `text` into words borrowed from it.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut words = Vec::new();

        for chunk in text.split_whitespace() {
            match &self.specials {
                None => words.push(chunk),
                Some(re) => {
                    let mut last = 0;
                    for m in re.find_iter(chunk) {
                        if m.start() > last {
                            words.push(&chunk[last..m.start()]);
                        }
                        words.push(m.as_str());
                        last = m.end();
                    }
                    if last < chunk.len() {
                        words.push(&chunk[last..]);
                    }
                }
            }
        }

        words
    }
}

impl Default for WordSplitter {
    fn default() -> Self {
        Self::whitespace()
    }
}
