//! A trained grapheme-level BPE model.

use super::merges::MergeRules;
use super::vocab::Vocabulary;
use crate::error::{Result, ShabdaError};
use crate::text::special::{SpecialTokens, UNK_TOKEN};
use serde::{Deserialize, Serialize};

/// Model configuration persisted next to the merges and ids.
///
/// `eos_marker` and `special_tokens` are required; the training parameters
/// are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub eos_marker: String,
    pub special_tokens: Vec<String>,
    #[serde(default = "default_unk_token")]
    pub unk_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_vocab: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_freq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_merges_cap: Option<usize>,
}

impl ModelConfig {
    pub fn special(&self) -> SpecialTokens {
        SpecialTokens::new(&self.eos_marker, &self.special_tokens).with_unk_token(&self.unk_token)
    }
}

fn default_unk_token() -> String {
    UNK_TOKEN.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        let special = SpecialTokens::default();
        Self {
            eos_marker: special.eos_marker.to_string(),
            special_tokens: special.tokens.iter().map(|t| t.to_string()).collect(),
            unk_token: special.unk_token.to_string(),
            target_vocab: None,
            min_freq: None,
            max_merges_cap: None,
        }
    }
}

/// Ordered merge rules plus the token -> id table. Immutable once built.
#[derive(Debug, Clone)]
pub struct BpeModel {
    merges: MergeRules,
    vocab: Vocabulary,
    config: ModelConfig,
}

impl BpeModel {
    /// Assemble a model, checking that the vocabulary and the config agree
    /// on the special tokens.
    pub fn new(merges: MergeRules, vocab: Vocabulary, config: ModelConfig) -> Result<Self> {
        if *vocab.special() != config.special() {
            return Err(ShabdaError::InvalidConfig(
                "vocabulary special tokens differ from model config".to_string(),
            ));
        }
        Ok(Self {
            merges,
            vocab,
            config,
        })
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn special(&self) -> &SpecialTokens {
        self.vocab.special()
    }

    pub fn eos_marker(&self) -> &str {
        &self.config.eos_marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_requires_matching_specials() {
        let config = ModelConfig::default();
        let vocab = Vocabulary::from_ordered(
            ["<DANDA>", "<DANDA2>", "</M>", "<PAD>", "<UNK>"],
            config.special(),
        )
        .unwrap();
        assert!(BpeModel::new(MergeRules::new(), vocab.clone(), config.clone()).is_ok());

        let other = ModelConfig {
            eos_marker: "<EOW>".to_string(),
            ..config
        };
        assert!(matches!(
            BpeModel::new(MergeRules::new(), vocab, other),
            Err(ShabdaError::InvalidConfig(_))
        ));
    }
}
