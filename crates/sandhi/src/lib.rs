//! Shabda-sandhi - reverse sandhi splitting for Sanskrit verses
//!
//! Sandhi fuses sounds across word boundaries. This crate proposes
//! plausible reversals from a fixed phonological rule table and expands a
//! verse into every combination of proposed splits, giving the tokenizer
//! trainer cleaner morpheme boundaries to learn from.
//!
//! # Example
//!
//! ```rust
//! use shabda_sandhi::{SandhiCandidateGenerator, SplitCandidate};
//!
//! let generator = SandhiCandidateGenerator::default();
//! let candidates = generator.generate("रामःचवन");
//!
//! assert_eq!(candidates.len(), 3);
//! assert_eq!(candidates[0], SplitCandidate::new("राम", "चवन"));
//! ```

pub mod candidates;
pub mod expand;
pub mod rules;
pub mod verse;

pub use candidates::{is_eligible, SandhiCandidateGenerator};
pub use expand::{MorphemeOptions, SplitCombinations, VerseSplitExpander};
pub use rules::{Boundary, RuleKind, SandhiRule, SandhiRuleSet, SplitCandidate};
pub use verse::{
    insert_special_tokens, morphemes_from_verse, normalize_verse, sanitize_verse,
    split_verse_by_special_tokens, PreprocessConfig, VersePreprocessor,
};
