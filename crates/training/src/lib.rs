//! Shabda-training - BPE vocabulary training
//!
//! This crate learns an ordered list of BPE merge rules over grapheme
//! clusters, then assigns dense token ids.
//!
//! # Features
//!
//! - Word deduplication with weighted pair counting, optionally parallel
//! - Lazy-deletion priority queue with a string-ordered tie-break
//! - Frequency floor, target vocabulary and merge-cap stop conditions
//!
//! # Example
//!
//! ```rust
//! use shabda_training::{BpeVocabTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::default()
//!     .with_target_vocab_size(6)
//!     .with_min_pair_frequency(2);
//!
//! let output = BpeVocabTrainer::new(config).train(["कखग कखघ"])?;
//! assert_eq!(output.model.merges().len(), 1);
//! assert_eq!(output.model.merges().rank("क", "ख"), Some(0));
//! # Ok::<(), shabda_training::ShabdaError>(())
//! ```

pub use shabda_core::{Result, ShabdaError};

// Training infrastructure
pub mod training;
pub use training::{
    BpeVocabTrainer, MergeOutcome, PairCounter, StopReason, TrainingConfig, TrainingOutput,
    TrainingStats,
};
