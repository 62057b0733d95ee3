//! Training infrastructure for grapheme-level BPE.

pub mod counter;
pub mod trainer;

pub use counter::{MergeOutcome, PairCounter};
pub use trainer::{
    BpeVocabTrainer, StopReason, TrainingConfig, TrainingOutput, TrainingStats,
    LOG_INTERVAL_MERGES,
};
