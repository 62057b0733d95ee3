//! Special-token literals.
//!
//! Every literal is a bracketed ASCII string, so none of them can be produced
//! by segmenting Devanagari text. Special tokens are atomic: they are never
//! grapheme-segmented, never sandhi-split and never merged with neighbours.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Marks a single danda (`।`), a verse-line break.
pub const DANDA_TOKEN: &str = "<DANDA>";
/// Marks a double danda (`॥`), the end of a verse.
pub const DOUBLE_DANDA_TOKEN: &str = "<DANDA2>";
/// Appended to every word's initial segmentation.
pub const EOS_MARKER: &str = "</M>";
pub const PAD_TOKEN: &str = "<PAD>";
pub const UNK_TOKEN: &str = "<UNK>";

/// Markers inserted into verses by preprocessing.
pub const VERSE_MARKERS: [&str; 2] = [DANDA_TOKEN, DOUBLE_DANDA_TOKEN];

/// Declared special-token order. Ids `0..5` go to these, in this order.
pub const DEFAULT_SPECIAL_TOKENS: [&str; 5] = [
    DANDA_TOKEN,
    DOUBLE_DANDA_TOKEN,
    EOS_MARKER,
    PAD_TOKEN,
    UNK_TOKEN,
];

/// The special tokens of one model, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// End-of-morpheme marker
    pub eos_marker: CompactString,
    /// Declared special tokens (may or may not list the marker itself)
    pub tokens: Vec<CompactString>,
    /// Stands in for symbols missing from the vocabulary
    #[serde(default = "default_unk_token")]
    pub unk_token: CompactString,
}

fn default_unk_token() -> CompactString {
    CompactString::new(UNK_TOKEN)
}

impl SpecialTokens {
    pub fn new<I, S>(eos_marker: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            eos_marker: CompactString::new(eos_marker),
            tokens: tokens
                .into_iter()
                .map(|t| CompactString::new(t.as_ref()))
                .collect(),
            unk_token: default_unk_token(),
        }
    }

    pub fn with_unk_token(mut self, unk_token: &str) -> Self {
        self.unk_token = CompactString::new(unk_token);
        self
    }

    /// Whether `token` is one of the declared literals.
    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t.as_str() == token)
    }

    #[inline]
    pub fn is_eos(&self, token: &str) -> bool {
        self.eos_marker == token
    }

    /// Special tokens that stand alone as words, i.e. everything but the marker.
    pub fn atomic(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens
            .iter()
            .map(|t| t.as_str())
            .filter(move |t| self.eos_marker != *t)
    }

    /// Whether `token` is an atomic special token (declared and not the marker).
    #[inline]
    pub fn is_atomic(&self, token: &str) -> bool {
        !self.is_eos(token) && self.contains(token)
    }

    /// Declared tokens with duplicates removed, first occurrence kept.
    pub fn deduplicated(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            if !out.contains(&token.as_str()) {
                out.push(token.as_str());
            }
        }
        out
    }
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self::new(EOS_MARKER, DEFAULT_SPECIAL_TOKENS)
    }
}
