//! Main tokenizer implementation.
//!
//! `BpeTokenizer` replays learned merges over the grapheme clusters of each
//! word, lowest rank first, so a word seen in training encodes to exactly
//! the symbols it ended training with.

use crate::io::{ModelLoader, ModelSaver};
use crate::utils::{CacheStats, EncodingCache};
use compact_str::CompactString;
use shabda_core::{
    BpeModel, GraphemeSegmenter, NormalizationForm, Normalizer, Result, SegmentationMode,
    ShabdaError, WordSplitter,
};
use std::path::Path;

/// What to do with a final symbol that has no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Use the unknown-token id; fail if the vocabulary has none
    #[default]
    Substitute,
    /// Always fail with [`ShabdaError::SymbolUnknown`]
    Reject,
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    pub unknown: UnknownPolicy,
    /// Encode memo capacity; `None` keeps every word for the tokenizer's lifetime
    pub cache_capacity: Option<usize>,
    /// Must match the segmentation used in training
    pub segmentation: SegmentationMode,
    pub normalization: NormalizationForm,
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    model: Option<BpeModel>,
}

impl TokenizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: BpeModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn unknown_policy(mut self, policy: UnknownPolicy) -> Self {
        self.config.unknown = policy;
        self
    }

    pub fn cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn segmentation(mut self, mode: SegmentationMode) -> Self {
        self.config.segmentation = mode;
        self
    }

    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.config.normalization = form;
        self
    }

    pub fn build(self) -> Result<BpeTokenizer> {
        let model = self.model.ok_or_else(|| {
            ShabdaError::InvalidConfig("tokenizer builder needs a model".to_string())
        })?;
        BpeTokenizer::with_config(model, self.config)
    }
}

/// A symbol during merging: its text and, if it takes part in any merge
/// rule, its id in the merge table.
#[derive(Debug, Clone)]
struct Piece {
    id: Option<u32>,
    text: CompactString,
}

/// Applies merge rules to single words. Stateless.
#[derive(Debug, Clone)]
struct WordEncoder {
    model: BpeModel,
    segmenter: GraphemeSegmenter,
    normalizer: Normalizer,
}

impl WordEncoder {
    fn piece(&self, text: &str) -> Piece {
        Piece {
            id: self.model.merges().symbol_id(text),
            text: CompactString::new(text),
        }
    }

    fn initial_pieces(&self, word: &str) -> Vec<Piece> {
        let special = self.model.special();
        let mut pieces: Vec<Piece> = if special.contains(word) {
            vec![self.piece(word)]
        } else {
            self.segmenter
                .segment(word)
                .into_iter()
                .map(|cluster| self.piece(cluster))
                .collect()
        };
        pieces.push(self.piece(self.model.eos_marker()));
        pieces
    }

    /// Final symbols for one word, trailing standalone marker dropped.
    fn symbols(&self, word: &str) -> Vec<CompactString> {
        let normalized = self.normalizer.normalize(word);
        let merges = self.model.merges();
        let mut pieces = self.initial_pieces(&normalized);

        loop {
            let best = pieces
                .windows(2)
                .filter_map(|w| match (w[0].id, w[1].id) {
                    (Some(a), Some(b)) => merges
                        .get((a, b))
                        .map(|(rank, merged)| (rank, (a, b), merged)),
                    _ => None,
                })
                .min_by_key(|&(rank, _, _)| rank);

            let Some((_, pair, merged_id)) = best else {
                break;
            };
            pieces = splice(pieces, pair, merged_id);
        }

        let mut symbols: Vec<CompactString> = pieces.into_iter().map(|p| p.text).collect();
        if symbols.last().map_or(false, |s| s.as_str() == self.model.eos_marker()) {
            symbols.pop();
        }
        symbols
    }
}

/// Merge every occurrence of `pair`, scanning left to right.
fn splice(pieces: Vec<Piece>, pair: (u32, u32), merged_id: u32) -> Vec<Piece> {
    let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
    let mut iter = pieces.into_iter().peekable();

    while let Some(piece) = iter.next() {
        let joins = piece.id == Some(pair.0)
            && iter.peek().map_or(false, |next| next.id == Some(pair.1));
        if joins {
            if let Some(next) = iter.next() {
                let mut text = piece.text;
                text.push_str(&next.text);
                out.push(Piece {
                    id: Some(merged_id),
                    text,
                });
                continue;
            }
        }
        out.push(piece);
    }

    out
}

/// Grapheme-level BPE tokenizer.
///
/// Encoding takes `&mut self` because of the per-word memo; decoding does
/// not touch it.
#[derive(Debug, Clone)]
pub struct BpeTokenizer {
    encoder: WordEncoder,
    splitter: WordSplitter,
    cache: EncodingCache,
    config: TokenizerConfig,
}

impl BpeTokenizer {
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Tokenizer with default configuration.
    pub fn new(model: BpeModel) -> Result<Self> {
        Self::with_config(model, TokenizerConfig::default())
    }

    pub fn with_config(model: BpeModel, config: TokenizerConfig) -> Result<Self> {
        let special = model.special();
        let splitter = WordSplitter::new(
            special
                .tokens
                .iter()
                .map(|t| t.as_str())
                .chain(std::iter::once(special.eos_marker.as_str())),
        )?;

        Ok(Self {
            encoder: WordEncoder {
                model,
                segmenter: GraphemeSegmenter::new(config.segmentation),
                normalizer: Normalizer::new(config.normalization),
            },
            splitter,
            cache: EncodingCache::from_capacity(config.cache_capacity),
            config,
        })
    }

    /// Load a model file and build a tokenizer over it.
    pub fn load(path: &Path) -> Result<Self> {
        Self::new(ModelLoader::load(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        ModelSaver::new(self.model()).save(path)
    }

    pub fn model(&self) -> &BpeModel {
        &self.encoder.model
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Final BPE symbols of one word, memoized by the word as given.
    pub fn encode_word(&mut self, word: &str) -> Vec<CompactString> {
        let encoder = &self.encoder;
        self.cache.get_or_encode(word, |w| encoder.symbols(w))
    }

    /// Symbols per word.
    pub fn encode_symbols(&mut self, text: &str) -> Vec<Vec<CompactString>> {
        let words = self.splitter.split(text);
        words.into_iter().map(|word| self.encode_word(word)).collect()
    }

    /// Flat id sequence with word boundaries.
    ///
    /// After each word the marker id is emitted as a separator, unless the
    /// word's last symbol already carries the marker or the word is a
    /// special token.
    pub fn encode(&mut self, text: &str) -> Result<Vec<u32>> {
        self.encode_with_unknowns(text)?
            .into_iter()
            .map(|(id, symbol)| match id {
                Some(id) => Ok(id),
                None => self.resolve_unknown(&symbol),
            })
            .collect()
    }

    /// Like [`encode`](Self::encode) but leaves unknown symbols as `None`
    /// alongside their text instead of applying the unknown policy.
    pub fn encode_with_unknowns(&mut self, text: &str) -> Result<Vec<(Option<u32>, CompactString)>> {
        let eos_marker = CompactString::new(self.model().eos_marker());
        let eos_id = self.model().vocab().eos_id();
        let mut out = Vec::new();

        for symbols in self.encode_symbols(text) {
            let separate = match symbols.last() {
                Some(last) => {
                    !last.ends_with(eos_marker.as_str()) && !self.model().special().contains(last)
                }
                None => true,
            };

            for symbol in symbols {
                out.push((self.token_to_id(&symbol), symbol));
            }
            if separate {
                out.push((Some(eos_id), eos_marker.clone()));
            }
        }

        Ok(out)
    }

    /// Ids per word, without separators.
    pub fn encode_words(&mut self, text: &str) -> Result<Vec<Vec<u32>>> {
        self.encode_symbols(text)
            .into_iter()
            .map(|symbols| {
                symbols
                    .iter()
                    .map(|symbol| match self.token_to_id(symbol) {
                        Some(id) => Ok(id),
                        None => self.resolve_unknown(symbol),
                    })
                    .collect()
            })
            .collect()
    }

    fn resolve_unknown(&self, symbol: &str) -> Result<u32> {
        match (self.config.unknown, self.model().vocab().unk_id()) {
            (UnknownPolicy::Substitute, Some(unk)) => {
                log::trace!(
                    "substituting {} for unknown symbol {:?}",
                    self.model().special().unk_token,
                    symbol
                );
                Ok(unk)
            }
            _ => Err(ShabdaError::SymbolUnknown(symbol.to_string())),
        }
    }

    fn id_text(&self, id: u32) -> &str {
        let vocab = self.model().vocab();
        match vocab.get_token(id) {
            Some(token) => token,
            None if vocab.unk_id().is_some() => self.model().special().unk_token.as_str(),
            None => "",
        }
    }

    /// Decode a flat id sequence into space-separated words.
    ///
    /// The marker, a token ending with the marker, and any special token
    /// close the current word; a special token is also a word of its own.
    pub fn decode(&self, ids: &[u32]) -> String {
        let special = self.model().special();
        let eos = self.model().eos_marker();

        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();

        fn flush(words: &mut Vec<String>, current: &mut String) {
            if !current.is_empty() {
                words.push(std::mem::take(current));
            }
        }

        for &id in ids {
            let token = self.id_text(id);

            if special.is_atomic(token) {
                flush(&mut words, &mut current);
                words.push(token.to_string());
            } else if token == eos {
                flush(&mut words, &mut current);
            } else if let Some(stem) = token.strip_suffix(eos) {
                current.push_str(stem);
                flush(&mut words, &mut current);
            } else {
                current.push_str(token);
            }
        }
        flush(&mut words, &mut current);

        words.join(" ")
    }

    /// Decode per-word id lists, dropping the marker.
    pub fn decode_words(&self, words: &[Vec<u32>]) -> Vec<String> {
        let eos = self.model().eos_marker();
        words
            .iter()
            .map(|ids| {
                ids.iter()
                    .map(|&id| self.id_text(id))
                    .map(|token| token.strip_suffix(eos).unwrap_or(token))
                    .collect()
            })
            .collect()
    }

    #[inline]
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.model().vocab().get_id(token)
    }

    #[inline]
    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.model().vocab().get_token(id)
    }

    pub fn vocab_size(&self) -> usize {
        self.model().vocab().len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shabda_core::{MergeRules, ModelConfig, SpecialTokens, Vocabulary};

    /// Merges रा+म, राम+</M>, म+ः ; vocabulary holds the merged forms.
    fn model() -> BpeModel {
        let vocab = Vocabulary::from_ordered(
            [
                "<DANDA>", "<DANDA2>", "</M>", "<PAD>", "<UNK>", "राम</M>", "मः", "रा", "सी", "ता",
            ],
            SpecialTokens::default(),
        )
        .unwrap();
        let merges = MergeRules::from_pairs([("रा", "म"), ("राम", "</M>"), ("म", "ः")]);
        BpeModel::new(merges, vocab, ModelConfig::default()).unwrap()
    }

    fn tokenizer() -> BpeTokenizer {
        BpeTokenizer::new(model()).unwrap()
    }

    #[test]
    fn test_encode_word_applies_ranks_in_order() {
        let mut tok = tokenizer();
        assert_eq!(tok.encode_word("राम"), vec!["राम</M>"]);
        // मः is a single cluster, so रा+म never sees a bare म.
        assert_eq!(tok.encode_word("रामः"), vec!["रा", "मः"]);
        assert_eq!(tok.encode_word("सीता"), vec!["सी", "ता"]);
    }

    #[test]
    fn test_special_merged_with_marker() {
        let vocab = Vocabulary::from_ordered(
            ["<DANDA>", "<DANDA2>", "</M>", "<PAD>", "<UNK>", "<DANDA></M>", "रा", "म"],
            SpecialTokens::default(),
        )
        .unwrap();
        let merges = MergeRules::from_pairs([("<DANDA>", "</M>")]);
        let model = BpeModel::new(merges, vocab, ModelConfig::default()).unwrap();
        let mut tok = BpeTokenizer::new(model).unwrap();

        assert_eq!(tok.encode_word("<DANDA>"), vec!["<DANDA></M>"]);
        let ids = tok.encode("राम<DANDA>").unwrap();
        assert_eq!(ids, vec![6, 7, 2, 5]);
        assert_eq!(tok.decode(&ids), "राम <DANDA>");
    }

    #[test]
    fn test_custom_unk_token() {
        let config = ModelConfig {
            special_tokens: vec!["</M>".to_string(), "<OOV>".to_string()],
            unk_token: "<OOV>".to_string(),
            ..ModelConfig::default()
        };
        let vocab = Vocabulary::from_ordered(["</M>", "<OOV>", "क"], config.special()).unwrap();
        let model = BpeModel::new(MergeRules::new(), vocab, config).unwrap();
        let mut tok = BpeTokenizer::new(model).unwrap();

        assert_eq!(tok.encode("ख").unwrap(), vec![1, 0]);
        assert_eq!(tok.decode(&[2, 42, 0]), "क <OOV>");
    }

    #[test]
    fn test_lowest_rank_wins() {
        let vocab = Vocabulary::from_ordered(["</M>", "कख", "ग"], SpecialTokens::new("</M>", ["</M>"]))
            .unwrap();
        let merges = MergeRules::from_pairs([("क", "ख"), ("ख", "ग")]);
        let config = ModelConfig {
            special_tokens: vec!["</M>".to_string()],
            ..ModelConfig::default()
        };
        let mut tok = BpeTokenizer::new(BpeModel::new(merges, vocab, config).unwrap()).unwrap();

        assert_eq!(tok.encode_word("कखग"), vec!["कख", "ग"]);
    }

    #[test]
    fn test_special_token_bypasses_segmentation() {
        let mut tok = tokenizer();
        assert_eq!(tok.encode_word("<DANDA>"), vec!["<DANDA>"]);
    }

    #[test]
    fn test_encode_separators() {
        let mut tok = tokenizer();
        let ids = tok.encode("राम सीता<DANDA>").unwrap();

        // राम</M> carries the marker; सी ता gets an explicit one; <DANDA> needs none.
        assert_eq!(ids, vec![5, 8, 9, 2, 0]);
    }

    #[test]
    fn test_roundtrip() {
        let mut tok = tokenizer();
        let text = "राम सीता रामः <DANDA> सीता राम <DANDA2>";
        let ids = tok.encode(text).unwrap();
        assert_eq!(tok.decode(&ids), text);
    }

    #[test]
    fn test_unknown_substituted() {
        let mut tok = tokenizer();
        let ids = tok.encode("क").unwrap();
        assert_eq!(ids, vec![4, 2]);
        assert_eq!(tok.decode(&ids), "<UNK>");
    }

    #[test]
    fn test_unknown_rejected() {
        let mut tok = BpeTokenizer::builder()
            .model(model())
            .unknown_policy(UnknownPolicy::Reject)
            .build()
            .unwrap();
        assert!(matches!(tok.encode("क"), Err(ShabdaError::SymbolUnknown(s)) if s == "क"));
    }

    #[test]
    fn test_unknown_without_unk_token() {
        let vocab = Vocabulary::from_ordered(["</M>"], SpecialTokens::new("</M>", ["</M>"])).unwrap();
        let config = ModelConfig {
            special_tokens: vec!["</M>".to_string()],
            ..ModelConfig::default()
        };
        let model = BpeModel::new(MergeRules::new(), vocab, config).unwrap();
        let mut tok = BpeTokenizer::new(model).unwrap();

        assert!(matches!(tok.encode("क"), Err(ShabdaError::SymbolUnknown(_))));
        // Unknown ids decode to nothing when there is no <UNK>.
        assert_eq!(tok.decode(&[99, 0]), "");
    }

    #[test]
    fn test_encode_with_unknowns() {
        let mut tok = tokenizer();
        let out = tok.encode_with_unknowns("कसी").unwrap();
        let ids: Vec<Option<u32>> = out.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![None, Some(8), Some(2)]);
        assert_eq!(out[0].1, "क");
    }

    #[test]
    fn test_decode_unknown_id() {
        let tok = tokenizer();
        assert_eq!(tok.decode(&[7, 999, 2]), "रा <UNK>");
    }

    #[test]
    fn test_decode_words() {
        let mut tok = tokenizer();
        let words = tok.encode_words("राम सीता").unwrap();
        assert_eq!(words, vec![vec![5], vec![8, 9]]);
        assert_eq!(tok.decode_words(&words), vec!["राम", "सीता"]);
    }

    #[test]
    fn test_cache_is_used() {
        let mut tok = tokenizer();
        tok.encode("राम राम राम").unwrap();

        let stats = tok.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);

        tok.clear_cache();
        assert_eq!(tok.cache_stats().entries, 0);
    }

    #[test]
    fn test_lookups() {
        let tok = tokenizer();
        assert_eq!(tok.vocab_size(), 10);
        assert_eq!(tok.token_to_id("मः"), Some(6));
        assert_eq!(tok.id_to_token(2), Some("</M>"));
        assert_eq!(tok.id_to_token(10), None);
    }

    #[test]
    fn test_builder_requires_model() {
        assert!(matches!(
            TokenizerBuilder::new().build(),
            Err(ShabdaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_text() {
        let mut tok = tokenizer();
        assert!(tok.encode("").unwrap().is_empty());
        assert!(tok.encode("   ").unwrap().is_empty());
        assert_eq!(tok.decode(&[]), "");
    }
}
