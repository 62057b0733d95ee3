//! Core BPE data structures.
//!
//! Symbol interning, ordered merge rules, the dense token vocabulary, the
//! training priority queue and the model that bundles them.

pub mod merges;
pub mod model;
pub mod priority;
pub mod symbols;
pub mod vocab;

pub use merges::{MergeMap, MergeRules, Pair};
pub use model::{BpeModel, ModelConfig};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use symbols::SymbolTable;
pub use vocab::{Vocab, Vocabulary};
