//! Shabda-core - shared building blocks for Sanskrit subword tokenization
//!
//! This crate provides the data structures used by both the sandhi
//! splitter and the grapheme-level BPE engine, independent of training
//! or inference.
//!
//! # Features
//!
//! - Devanagari script boundary and special-token literals
//! - Lossless grapheme-cluster segmentation over combining marks
//! - NFC normalization and special-token-aware word splitting
//! - Ordered merge rules, dense token vocabulary and the trained model type
//! - Deterministic priority queue for training
//!
//! # Example
//!
//! ```rust
//! use shabda_core::text::graphemes;
//!
//! assert_eq!(graphemes("नमः"), vec!["न", "मः"]);
//! ```

pub mod error;
pub use error::{Result, ShabdaError};

// Text handling
pub mod text;
pub use text::{
    GraphemeSegmenter, NormalizationForm, Normalizer, SegmentationMode, SpecialTokens,
    WordSplitter,
};

// Core BPE data structures
pub mod core;
pub use crate::core::{
    BpeModel, MergeCandidate, MergeRules, ModelConfig, Pair, PairPriorityQueue, SymbolTable,
    Vocabulary,
};
