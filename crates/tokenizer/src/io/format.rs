//! Persisted model format.
//!
//! ```json
//! {
//!   "merges": [["क", "ख"], ...],
//!   "token2id": { "<DANDA>": 0, ... },
//!   "config": { "eos_marker": "</M>", "special_tokens": [...], ... }
//! }
//! ```

use serde::{Deserialize, Serialize};
use shabda_core::{BpeModel, MergeRules, ModelConfig, Result, ShabdaError, Vocabulary};
use std::collections::BTreeMap;

/// Model file contents.
///
/// `merges` is in learned order (rank 0 first). `token2id` is a sorted map
/// so the written file is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    pub merges: Vec<(String, String)>,
    pub token2id: BTreeMap<String, u32>,
    pub config: ModelConfig,
}

impl SerializedModel {
    pub fn from_model(model: &BpeModel) -> Self {
        let merges = model
            .merges()
            .pairs()
            .iter()
            .map(|(left, right)| (left.to_string(), right.to_string()))
            .collect();

        let token2id = model
            .vocab()
            .iter()
            .map(|(token, id)| (token.to_string(), id))
            .collect();

        Self {
            merges,
            token2id,
            config: model.config().clone(),
        }
    }

    /// Validate and rebuild the model. Every structural problem is
    /// [`ShabdaError::ModelCorrupt`].
    pub fn into_model(self) -> Result<BpeModel> {
        if self.config.eos_marker.is_empty() {
            return Err(ShabdaError::ModelCorrupt(
                "config.eos_marker is empty".to_string(),
            ));
        }

        if let Some((rank, (left, right))) = self
            .merges
            .iter()
            .enumerate()
            .find(|(_, (left, right))| left.is_empty() || right.is_empty())
        {
            return Err(ShabdaError::ModelCorrupt(format!(
                "merge #{} has an empty side: ({:?}, {:?})",
                rank, left, right
            )));
        }

        let special = self.config.special();
        let vocab = Vocabulary::from_token2id(self.token2id, special)?;
        let merges = MergeRules::from_pairs(self.merges);

        BpeModel::new(merges, vocab, self.config)
            .map_err(|e| ShabdaError::ModelCorrupt(e.to_string()))
    }
}
