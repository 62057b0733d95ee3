//! Shabda-tokenizer - grapheme-level BPE tokenizer for Sanskrit
//!
//! This crate turns a trained [`BpeModel`] into a tokenizer: it replays
//! the learned merges over grapheme clusters to encode text into ids,
//! decodes ids back into words, and reads and writes model files.
//!
//! # Features
//!
//! - Rank-ordered merge replay, identical to the training segmentation
//! - End-of-morpheme separators and atomic special tokens
//! - Configurable handling of symbols missing from the vocabulary
//! - Per-word encoding memo
//! - JSON model persistence
//!
//! # Example
//!
//! ```rust,no_run
//! use shabda_tokenizer::BpeTokenizer;
//! use std::path::Path;
//!
//! let mut tokenizer = BpeTokenizer::load(Path::new("model.json"))?;
//!
//! let ids = tokenizer.encode("रामः वनं गच्छति <DANDA>")?;
//! println!("{}", tokenizer.decode(&ids));
//! # Ok::<(), shabda_tokenizer::ShabdaError>(())
//! ```

// Re-export core types
pub use shabda_core::{BpeModel, Result, ShabdaError};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{BpeTokenizer, TokenizerBuilder, TokenizerConfig, UnknownPolicy};

// IO/Serialization
pub mod io;
pub use io::{ModelLoader, ModelSaver, SerializedModel};

// Utilities
pub mod utils;
pub use utils::{CacheStats, EncodingCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
