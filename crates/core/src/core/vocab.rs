//! Token vocabulary: the dense token <-> id mapping.
//!
//! Ids always form the range `[0, N)`. The declared special tokens occupy
//! the lowest ids in declared order and the end-of-morpheme marker is
//! always present.

use crate::error::{Result, ShabdaError};
use crate::text::special::SpecialTokens;
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// token -> id
    vocab: Vocab,
    /// id -> token, indexed by id
    vocab_r: Vec<CompactString>,
    special: SpecialTokens,
    /// Cached id of the end-of-morpheme marker
    eos_id: u32,
    /// Cached id of the unknown token, when the vocabulary has one
    unk_id: Option<u32>,
}

impl Vocabulary {
    /// Build a vocabulary whose ids are the positions in `tokens`.
    ///
    /// Fails if a token repeats, the marker is missing, or the declared
    /// special tokens do not occupy the lowest ids in order.
    pub fn from_ordered<I, S>(tokens: I, special: SpecialTokens) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocab_r: Vec<CompactString> = tokens
            .into_iter()
            .map(|t| CompactString::new(t.as_ref()))
            .collect();

        Self::from_dense(vocab_r, special).map_err(ShabdaError::InvalidConfig)
    }

    /// Build a vocabulary from a persisted token -> id map.
    ///
    /// Any structural problem (duplicate or sparse ids, missing marker,
    /// misplaced special tokens) is reported as [`ShabdaError::ModelCorrupt`].
    pub fn from_token2id<I, S>(entries: I, special: SpecialTokens) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let entries: Vec<(S, u32)> = entries.into_iter().collect();
        let mut slots: Vec<Option<CompactString>> = vec![None; entries.len()];

        for (token, id) in entries {
            let slot = slots.get_mut(id as usize).ok_or_else(|| {
                ShabdaError::ModelCorrupt(format!(
                    "token id {} out of dense range for {:?}",
                    id,
                    token.as_ref()
                ))
            })?;
            if slot.is_some() {
                return Err(ShabdaError::ModelCorrupt(format!("token id {} assigned twice", id)));
            }
            *slot = Some(CompactString::new(token.as_ref()));
        }

        // Every slot is filled: n entries, n distinct ids, all below n.
        let vocab_r: Vec<CompactString> = slots.into_iter().flatten().collect();

        Self::from_dense(vocab_r, special).map_err(ShabdaError::ModelCorrupt)
    }

    fn from_dense(vocab_r: Vec<CompactString>, special: SpecialTokens) -> std::result::Result<Self, String> {
        let mut vocab = Vocab::with_capacity(vocab_r.len());

        for (id, token) in vocab_r.iter().enumerate() {
            if vocab.insert(token.clone(), id as u32).is_some() {
                return Err(format!("token {:?} appears twice", token));
            }
        }

        for (expected, declared) in special.deduplicated().into_iter().enumerate() {
            match vocab.get(declared) {
                Some(&id) if id as usize == expected => {}
                Some(&id) => {
                    return Err(format!(
                        "special token {:?} has id {}, expected {}",
                        declared, id, expected
                    ))
                }
                None => return Err(format!("special token {:?} missing", declared)),
            }
        }

        let eos_id = vocab
            .get(special.eos_marker.as_str())
            .copied()
            .ok_or_else(|| format!("end-of-morpheme marker {:?} missing", special.eos_marker))?;
        let unk_id = vocab.get(special.unk_token.as_str()).copied();

        Ok(Self {
            vocab,
            vocab_r,
            special,
            eos_id,
            unk_id,
        })
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(id as usize).map(|s| s.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }

    pub fn special(&self) -> &SpecialTokens {
        &self.special
    }

    #[inline]
    pub fn eos_id(&self) -> u32 {
        self.eos_id
    }

    #[inline]
    pub fn unk_id(&self) -> Option<u32> {
        self.unk_id
    }

    /// Whether `id` belongs to a declared special token (marker included).
    #[inline]
    pub fn is_special_id(&self, id: u32) -> bool {
        self.get_token(id)
            .map_or(false, |token| self.special.contains(token))
    }

    /// Tokens in id order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, u32)> + '_ {
        self.vocab_r
            .iter()
            .enumerate()
            .map(|(id, token)| (token.as_str(), id as u32))
    }
}
