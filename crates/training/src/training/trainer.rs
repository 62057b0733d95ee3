//! BPE vocabulary trainer.
//!
//! Learns an ordered list of merge rules over a grapheme-segmented corpus.
//! Each step merges the most frequent adjacent pair, ties broken by the
//! lexicographically smallest pair of symbol strings, so identical input
//! always yields an identical model.

use super::counter::PairCounter;
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use log::{debug, info, warn};
use shabda_core::{
    BpeModel, GraphemeSegmenter, MergeCandidate, MergeRules, ModelConfig, Pair,
    PairPriorityQueue, Result, SegmentationMode, ShabdaError, SpecialTokens, Vocabulary,
};
use std::fmt;

/// Log every n-th merge after the first few.
pub const LOG_INTERVAL_MERGES: usize = 50;

/// Every merge below this count is logged.
const LOG_FIRST_MERGES: usize = 10;

pub const DEFAULT_TARGET_VOCAB: usize = 28_000;
pub const DEFAULT_MIN_FREQUENCY: u64 = 2;

/// Merge cap per unit of target vocabulary when none is configured.
pub const MERGE_CAP_FACTOR: usize = 10;

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Stop once the corpus holds this many distinct symbols
    pub target_vocab_size: usize,
    /// Stop once the best pair is rarer than this
    pub min_pair_frequency: u64,
    /// Hard cap on merges; `None` means `10 * target_vocab_size`
    pub max_merges: Option<usize>,
    pub special: SpecialTokens,
    /// Whether to count pairs in parallel
    pub parallel: bool,
    pub segmentation: SegmentationMode,
    /// Keep atomic special tokens out of every merge
    pub freeze_special_tokens: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_vocab_size: DEFAULT_TARGET_VOCAB,
            min_pair_frequency: DEFAULT_MIN_FREQUENCY,
            max_merges: None,
            special: SpecialTokens::default(),
            parallel: true,
            segmentation: SegmentationMode::default(),
            freeze_special_tokens: false,
        }
    }
}

impl TrainingConfig {
    pub fn with_target_vocab_size(mut self, size: usize) -> Self {
        self.target_vocab_size = size;
        self
    }

    pub fn with_min_pair_frequency(mut self, frequency: u64) -> Self {
        self.min_pair_frequency = frequency;
        self
    }

    pub fn with_max_merges(mut self, max_merges: Option<usize>) -> Self {
        self.max_merges = max_merges;
        self
    }

    pub fn with_special_tokens(mut self, special: SpecialTokens) -> Self {
        self.special = special;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_segmentation(mut self, mode: SegmentationMode) -> Self {
        self.segmentation = mode;
        self
    }

    pub fn with_frozen_special_tokens(mut self, frozen: bool) -> Self {
        self.freeze_special_tokens = frozen;
        self
    }

    /// The effective merge cap.
    pub fn merge_cap(&self) -> usize {
        self.max_merges
            .unwrap_or_else(|| self.target_vocab_size.saturating_mul(MERGE_CAP_FACTOR))
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_vocab_size == 0 {
            return Err(ShabdaError::InvalidConfig(
                "target_vocab_size must be positive".to_string(),
            ));
        }
        if self.special.eos_marker.is_empty() {
            return Err(ShabdaError::InvalidConfig(
                "end-of-morpheme marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why the merge loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetVocabReached,
    BelowMinFrequency,
    NoPairsLeft,
    MergeCapReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::TargetVocabReached => "target vocabulary reached",
            StopReason::BelowMinFrequency => "best pair below minimum frequency",
            StopReason::NoPairsLeft => "no adjacent pairs left",
            StopReason::MergeCapReached => "merge cap reached",
        };
        f.write_str(reason)
    }
}

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingStats {
    /// Unique word forms in the corpus
    pub word_types: usize,
    /// Distinct symbols before the first merge
    pub initial_symbols: usize,
    /// Distinct symbols after the last merge
    pub final_symbols: usize,
    pub merges: usize,
    /// The last merged pair and its frequency
    pub last_merge: Option<((CompactString, CompactString), u64)>,
    pub stop_reason: StopReason,
}

/// A trained model plus its run statistics.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    pub model: BpeModel,
    pub stats: TrainingStats,
}

/// BPE trainer.
///
/// Holds only configuration; each call to [`train`](Self::train) owns its
/// corpus representation.
#[derive(Debug, Clone, Default)]
pub struct BpeVocabTrainer {
    config: TrainingConfig,
}

impl BpeVocabTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn with_vocab_size(target_vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            target_vocab_size,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on a corpus of lines.
    ///
    /// An empty corpus is not an error: the result has no merges and a
    /// vocabulary of just the special tokens.
    pub fn train<I, S>(&self, corpus: I) -> Result<TrainingOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.validate()?;
        let config = &self.config;

        let mut counter = PairCounter::new(
            config.special.clone(),
            GraphemeSegmenter::new(config.segmentation),
        )?
        .with_frozen_specials(config.freeze_special_tokens);
        for line in corpus {
            counter.add_text(line.as_ref());
        }

        let word_types = counter.word_count();
        let initial_symbols = counter.distinct_symbols();
        info!("Initial vocab types: {} (unique word forms)", word_types);
        info!("Initial symbol set size: {}", initial_symbols);

        let mut pair_counts = if config.parallel {
            counter.count_pairs_parallel()
        } else {
            counter.count_pairs_sequential()
        };
        let mut queue = build_queue(&counter, &pair_counts);

        let merge_cap = config.merge_cap();
        let mut merges = MergeRules::new();
        let mut last_merge = None;

        let stop_reason = loop {
            if counter.distinct_symbols() >= config.target_vocab_size {
                info!(
                    "Reached target symbol set size: {} >= {}",
                    counter.distinct_symbols(),
                    config.target_vocab_size
                );
                break StopReason::TargetVocabReached;
            }

            if merges.len() >= merge_cap {
                warn!("Reached max_merges cap: {}", merges.len());
                break StopReason::MergeCapReached;
            }

            let Some(best) = queue.pop() else {
                info!("No adjacent pairs left to merge");
                break StopReason::NoPairsLeft;
            };

            if best.count < config.min_pair_frequency {
                info!(
                    "Best pair freq {} is below min_freq {}; stopping",
                    best.count, config.min_pair_frequency
                );
                break StopReason::BelowMinFrequency;
            }

            let (left, right) = best.symbols.clone();
            merges.push(&left, &right);

            let outcome = counter.merge_pair(best.pair).ok_or_else(|| {
                ShabdaError::Training(format!("pair ({:?}, {:?}) has unknown symbols", left, right))
            })?;
            pair_counts.remove(&best.pair);
            apply_deltas(&counter, &mut pair_counts, &mut queue, &outcome.deltas);

            let merge_count = merges.len();
            if merge_count % LOG_INTERVAL_MERGES == 0 || merge_count < LOG_FIRST_MERGES {
                info!(
                    "Merge #{}: ({:?}, {:?}) (freq={})",
                    merge_count, left, right, best.count
                );
            } else {
                debug!("Merge #{}: ({:?}, {:?}) (freq={})", merge_count, left, right, best.count);
            }

            last_merge = Some(((left, right), best.count));
        };

        info!("Stopped: {}", stop_reason);

        let tokens = build_token_order(&counter, &config.special);
        let vocab = Vocabulary::from_ordered(&tokens, config.special.clone())?;

        info!(
            "Final symbol set size: {}; tokens in token2id: {}",
            counter.distinct_symbols(),
            vocab.len()
        );
        info!("Final size of merge list: {}", merges.len());
        if let Some(((left, right), freq)) = &last_merge {
            info!("Last merged pair: ({:?}, {:?}) with frequency {}", left, right, freq);
        }

        let model_config = ModelConfig {
            eos_marker: config.special.eos_marker.to_string(),
            special_tokens: config.special.tokens.iter().map(|t| t.to_string()).collect(),
            unk_token: config.special.unk_token.to_string(),
            target_vocab: Some(config.target_vocab_size),
            min_freq: Some(config.min_pair_frequency),
            max_merges_cap: Some(merge_cap),
        };

        let stats = TrainingStats {
            word_types,
            initial_symbols,
            final_symbols: counter.distinct_symbols(),
            merges: merges.len(),
            last_merge,
            stop_reason,
        };

        Ok(TrainingOutput {
            model: BpeModel::new(merges, vocab, model_config)?,
            stats,
        })
    }
}

fn candidate(counter: &PairCounter, pair: Pair, count: u64) -> Option<MergeCandidate> {
    counter
        .pair_symbols(pair)
        .map(|symbols| MergeCandidate::new(pair, count, symbols))
}

/// Build priority queue from pair counts.
fn build_queue(counter: &PairCounter, pair_counts: &AHashMap<Pair, u64>) -> PairPriorityQueue {
    let mut queue = PairPriorityQueue::with_capacity(pair_counts.len());

    for (&pair, &count) in pair_counts {
        if let Some(c) = candidate(counter, pair, count) {
            queue.push(c);
        }
    }

    queue
}

fn apply_deltas(
    counter: &PairCounter,
    pair_counts: &mut AHashMap<Pair, u64>,
    queue: &mut PairPriorityQueue,
    deltas: &[(Pair, i64)],
) {
    for &(pair, delta) in deltas {
        let current = pair_counts.get(&pair).copied().unwrap_or(0);
        let new_count = (current as i64 + delta).max(0) as u64;

        if new_count > 0 {
            pair_counts.insert(pair, new_count);
            if let Some(c) = candidate(counter, pair, new_count) {
                queue.push(c);
            }
        } else {
            pair_counts.remove(&pair);
            queue.remove(pair);
        }
    }
}

/// Token order for the vocabulary: declared specials first, then every
/// symbol left in the corpus by descending frequency (ties by string), then
/// the marker if it has not been placed.
fn build_token_order(counter: &PairCounter, special: &SpecialTokens) -> Vec<CompactString> {
    let mut tokens: Vec<CompactString> = Vec::new();
    let mut seen: AHashSet<CompactString> = AHashSet::new();

    for token in special.deduplicated() {
        tokens.push(CompactString::new(token));
        seen.insert(CompactString::new(token));
    }

    let mut rest: Vec<(&str, u64)> = counter
        .symbol_frequencies()
        .into_iter()
        .filter(|(symbol, _)| !seen.contains(*symbol))
        .collect();
    rest.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (symbol, _) in rest {
        tokens.push(CompactString::new(symbol));
        seen.insert(CompactString::new(symbol));
    }

    if !seen.contains(special.eos_marker.as_str()) {
        tokens.push(special.eos_marker.clone());
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(target: usize, min_freq: u64) -> BpeVocabTrainer {
        BpeVocabTrainer::new(
            TrainingConfig::default()
                .with_target_vocab_size(target)
                .with_min_pair_frequency(min_freq)
                .with_parallel(false),
        )
    }

    #[test]
    fn test_two_words_sharing_a_pair_one_merge() {
        // Symbols क ख ग घ </M>; only (क, ख) occurs twice.
        let output = sequential(6, 2).train(["कखग कखघ"]).unwrap();

        let merges = output.model.merges();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges.rank("क", "ख"), Some(0));
        assert_eq!(output.stats.initial_symbols, 5);
        // क and ख vanish, कख appears.
        assert_eq!(output.stats.final_symbols, output.stats.initial_symbols - 1);
        assert_eq!(output.stats.stop_reason, StopReason::BelowMinFrequency);
    }

    #[test]
    fn test_min_frequency_floor() {
        let output = sequential(100, 2).train(["कख गघ"]).unwrap();

        assert!(output.model.merges().is_empty());
        assert_eq!(output.stats.stop_reason, StopReason::BelowMinFrequency);
    }

    #[test]
    fn test_empty_corpus() {
        let output = sequential(100, 2).train(Vec::<String>::new()).unwrap();

        assert!(output.model.merges().is_empty());
        assert_eq!(output.stats.stop_reason, StopReason::NoPairsLeft);
        let vocab = output.model.vocab();
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.get_id("<DANDA>"), Some(0));
        assert_eq!(vocab.eos_id(), 2);
    }

    #[test]
    fn test_merges_until_no_pairs_left() {
        let output = sequential(100, 1).train(["कखग"]).unwrap();

        assert_eq!(output.stats.stop_reason, StopReason::NoPairsLeft);
        assert_eq!(output.stats.merges, 3);
        assert!(output.model.vocab().get_id("कखग</M>").is_some());
    }

    #[test]
    fn test_merge_cap() {
        let trainer = BpeVocabTrainer::new(
            TrainingConfig::default()
                .with_target_vocab_size(100)
                .with_min_pair_frequency(1)
                .with_max_merges(Some(2))
                .with_parallel(false),
        );
        let output = trainer.train(["कखगघङ"]).unwrap();

        assert_eq!(output.stats.merges, 2);
        assert_eq!(output.stats.stop_reason, StopReason::MergeCapReached);
        assert_eq!(output.model.config().max_merges_cap, Some(2));
    }

    #[test]
    fn test_default_merge_cap() {
        let config = TrainingConfig::default().with_target_vocab_size(7);
        assert_eq!(config.merge_cap(), 70);
    }

    #[test]
    fn test_token_ids_specials_first_then_frequency() {
        let output = sequential(3, 100).train(["गग ख"]).unwrap();
        let vocab = output.model.vocab();

        let order: Vec<&str> = vocab.iter().map(|(token, _)| token).collect();
        // ग: 2, ख: 1; </M> is already a declared special.
        assert_eq!(
            order,
            vec!["<DANDA>", "<DANDA2>", "</M>", "<PAD>", "<UNK>", "ग", "ख"]
        );
    }

    #[test]
    fn test_frequency_ties_broken_by_string() {
        let output = sequential(3, 100).train(["ख क"]).unwrap();
        let vocab = output.model.vocab();

        assert_eq!(vocab.get_id("क"), Some(5));
        assert_eq!(vocab.get_id("ख"), Some(6));
    }

    #[test]
    fn test_marker_appended_when_not_declared() {
        let special = SpecialTokens::new("</M>", ["<UNK>"]);
        let trainer = BpeVocabTrainer::new(
            TrainingConfig::default()
                .with_special_tokens(special)
                .with_min_pair_frequency(100)
                .with_parallel(false),
        );
        let output = trainer.train(["क"]).unwrap();

        let order: Vec<&str> = output.model.vocab().iter().map(|(t, _)| t).collect();
        // </M> is observed in the corpus, so it is ranked by frequency.
        assert_eq!(order, vec!["<UNK>", "</M>", "क"]);
    }

    #[test]
    fn test_special_token_merges_with_marker() {
        let output = sequential(100, 1).train(["<DANDA> <DANDA> <DANDA>"]).unwrap();

        let merges = output.model.merges();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges.rank("<DANDA>", "</M>"), Some(0));
        assert_eq!(output.model.vocab().get_id("<DANDA></M>"), Some(5));
        assert_eq!(output.stats.stop_reason, StopReason::NoPairsLeft);
    }

    #[test]
    fn test_frozen_special_tokens_never_merge() {
        let trainer = BpeVocabTrainer::new(
            TrainingConfig::default()
                .with_target_vocab_size(100)
                .with_min_pair_frequency(1)
                .with_frozen_special_tokens(true)
                .with_parallel(false),
        );
        let output = trainer.train(["<DANDA> <DANDA> <DANDA>"]).unwrap();

        assert!(output.model.merges().is_empty());
        assert_eq!(output.stats.stop_reason, StopReason::NoPairsLeft);
    }

    #[test]
    fn test_custom_unk_token_recorded() {
        let special = SpecialTokens::new("</M>", ["</M>", "<OOV>"]).with_unk_token("<OOV>");
        let trainer = BpeVocabTrainer::new(
            TrainingConfig::default()
                .with_special_tokens(special)
                .with_parallel(false),
        );
        let output = trainer.train(["क"]).unwrap();

        assert_eq!(output.model.config().unk_token, "<OOV>");
        assert_eq!(output.model.vocab().unk_id(), Some(1));
    }

    #[test]
    fn test_training_is_deterministic() {
        let corpus = [
            "धर्मक्षेत्रे कुरुक्षेत्रे समवेता युयुत्सवः<DANDA>",
            "मामकाः पाण्डवाश्चैव किमकुर्वत सञ्जय<DANDA2>",
            "धर्मक्षेत्रे धर्म कर्म कर्म",
        ];

        let a = sequential(60, 1).train(corpus).unwrap();
        let b = sequential(60, 1).train(corpus).unwrap();
        let c = BpeVocabTrainer::new(
            TrainingConfig::default()
                .with_target_vocab_size(60)
                .with_min_pair_frequency(1)
                .with_parallel(true),
        )
        .train(corpus)
        .unwrap();

        assert_eq!(a.model.merges().pairs(), b.model.merges().pairs());
        assert_eq!(a.model.merges().pairs(), c.model.merges().pairs());

        let ids_a: Vec<_> = a.model.vocab().iter().collect();
        let ids_c: Vec<_> = c.model.vocab().iter().collect();
        assert_eq!(ids_a, ids_c);
    }

    #[test]
    fn test_symbol_occurrences_shrink_every_merge() {
        let config = TrainingConfig::default()
            .with_min_pair_frequency(1)
            .with_parallel(false);
        let mut counter =
            PairCounter::new(config.special.clone(), GraphemeSegmenter::default()).unwrap();
        counter.add_text("धर्मक्षेत्रे कुरुक्षेत्रे धर्म");

        let mut pair_counts = counter.count_pairs_sequential();
        let mut queue = build_queue(&counter, &pair_counts);
        let mut previous = counter.total_symbols();
        let mut distinct = counter.distinct_symbols();

        while let Some(best) = queue.pop() {
            let outcome = counter.merge_pair(best.pair).unwrap();
            pair_counts.remove(&best.pair);
            apply_deltas(&counter, &mut pair_counts, &mut queue, &outcome.deltas);

            assert!(counter.total_symbols() < previous);
            assert!(counter.distinct_symbols() <= distinct + 1);
            previous = counter.total_symbols();
            distinct = counter.distinct_symbols();
        }
        assert!(pair_counts.is_empty());
    }

    #[test]
    fn test_zero_target_rejected() {
        let result = sequential(0, 2).train(["क"]);
        assert!(matches!(result, Err(ShabdaError::InvalidConfig(_))));
    }
}
