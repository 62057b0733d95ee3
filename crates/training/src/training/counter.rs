//! Corpus representation and pair counting for BPE training.
//!
//! Words are deduplicated up front and stored as symbol-id sequences with a
//! count. Every frequency here is weighted by that count.

use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use shabda_core::{
    GraphemeSegmenter, Normalizer, Pair, Result, SpecialTokens, SymbolTable, WordSplitter,
};

/// Result of merging one pair across the corpus.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Id of the merged symbol
    pub new_id: u32,
    /// Change in weighted count for every pair touched by the merge
    pub deltas: Vec<(Pair, i64)>,
    /// Weighted number of occurrences merged
    pub occurrences: u64,
}

/// Counter for BPE pair frequencies.
///
/// All words must be added before the first merge: a word added afterwards
/// would not carry the merges already applied.
pub struct PairCounter {
    symbols: SymbolTable,
    /// Word -> symbol ids
    words: Vec<Vec<u32>>,
    /// Word -> frequency count
    word_counts: Vec<u64>,
    /// Initial segmentation -> position in `words`
    word_index: AHashMap<Vec<u32>, usize>,
    /// Weighted occurrences per symbol id
    symbol_freqs: Vec<u64>,
    /// Symbols with a non-zero frequency
    distinct: usize,
    /// Ids of atomic special tokens seen so far
    atomic: AHashSet<u32>,
    /// Whether pairs touching atomic special tokens are excluded
    freeze_specials: bool,
    eos_id: u32,
    special: SpecialTokens,
    segmenter: GraphemeSegmenter,
    normalizer: Normalizer,
    splitter: WordSplitter,
}

impl PairCounter {
    pub fn new(special: SpecialTokens, segmenter: GraphemeSegmenter) -> Result<Self> {
        let splitter = WordSplitter::new(
            special
                .tokens
                .iter()
                .map(|t| t.as_str())
                .chain(std::iter::once(special.eos_marker.as_str())),
        )?;

        let mut symbols = SymbolTable::new();
        let eos_id = symbols.intern(&special.eos_marker);

        Ok(Self {
            symbols,
            words: Vec::new(),
            word_counts: Vec::new(),
            word_index: AHashMap::new(),
            symbol_freqs: Vec::new(),
            distinct: 0,
            atomic: AHashSet::new(),
            freeze_specials: false,
            eos_id,
            special,
            segmenter,
            normalizer: Normalizer::nfc(),
            splitter,
        })
    }

    /// Exclude every pair touching an atomic special token from counting
    /// and merging.
    pub fn with_frozen_specials(mut self, frozen: bool) -> Self {
        self.freeze_specials = frozen;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Add one line of text; it is split into words first.
    pub fn add_text(&mut self, text: &str) {
        for word in self.splitter.split(text) {
            self.add_word(word);
        }
    }

    /// Add a single word.
    ///
    /// The word is normalized first. The initial segmentation is its
    /// grapheme clusters followed by the end-of-morpheme marker. A special
    /// token stays one symbol.
    pub fn add_word(&mut self, word: &str) {
        let normalized = self.normalizer.normalize(word.trim());
        let word = normalized.as_str();
        if word.is_empty() {
            return;
        }

        let mut ids: Vec<u32> = if self.special.contains(word) {
            let id = self.symbols.intern(word);
            if self.special.is_atomic(word) {
                self.atomic.insert(id);
            }
            vec![id]
        } else {
            let clusters = self.segmenter.segment(word);
            clusters.iter().map(|c| self.symbols.intern(c)).collect()
        };
        ids.push(self.eos_id);

        for &id in &ids {
            self.adjust_symbol(id, 1);
        }

        if let Some(&pos) = self.word_index.get(&ids) {
            self.word_counts[pos] += 1;
        } else {
            self.word_index.insert(ids.clone(), self.words.len());
            self.words.push(ids);
            self.word_counts.push(1);
        }
    }

    fn adjust_symbol(&mut self, id: u32, delta: i64) {
        let idx = id as usize;
        if idx >= self.symbol_freqs.len() {
            self.symbol_freqs.resize(idx + 1, 0);
        }

        let before = self.symbol_freqs[idx];
        let after = (before as i64 + delta).max(0) as u64;
        self.symbol_freqs[idx] = after;

        match (before > 0, after > 0) {
            (false, true) => self.distinct += 1,
            (true, false) => self.distinct -= 1,
            _ => {}
        }
    }

    /// Whether a pair may be merged at all.
    #[inline]
    pub fn is_mergeable(&self, pair: Pair) -> bool {
        !self.freeze_specials
            || (!self.atomic.contains(&pair.0) && !self.atomic.contains(&pair.1))
    }

    fn word_pairs(&self, word: &[u32], count: u64, pair_counts: &mut AHashMap<Pair, u64>) {
        for window in word.windows(2) {
            let pair = (window[0], window[1]);
            if self.is_mergeable(pair) {
                *pair_counts.entry(pair).or_insert(0) += count;
            }
        }
    }

    /// Count all pairs in parallel.
    ///
    /// Partial maps are summed, so the result is independent of scheduling.
    pub fn count_pairs_parallel(&self) -> AHashMap<Pair, u64> {
        use rayon::prelude::*;

        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .fold(AHashMap::new, |mut acc, (word, &count)| {
                self.word_pairs(word, count, &mut acc);
                acc
            })
            .reduce(AHashMap::new, |mut acc, pair_counts| {
                for (pair, count) in pair_counts {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            })
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self) -> AHashMap<Pair, u64> {
        let mut pair_counts: AHashMap<Pair, u64> = AHashMap::new();

        for (word, &count) in self.words.iter().zip(self.word_counts.iter()) {
            self.word_pairs(word, count, &mut pair_counts);
        }

        pair_counts
    }

    /// Merge every adjacent occurrence of `pair` in every word.
    ///
    /// Each word is scanned left to right and matched occurrences are
    /// spliced into the new symbol; overlapping matches (`a a a` for
    /// `(a, a)`) merge the leftmost first. Returns `None` if either id is
    /// unknown.
    pub fn merge_pair(&mut self, pair: Pair) -> Option<MergeOutcome> {
        let new_id = self.symbols.intern_concat(pair.0, pair.1)?;

        let mut deltas: AHashMap<Pair, i64> = AHashMap::new();
        let mut occurrences = 0u64;

        for (word, &count) in self.words.iter_mut().zip(self.word_counts.iter()) {
            let Some((merged, hits)) = splice_pair(word, pair, new_id) else {
                continue;
            };

            let weight = count as i64;
            for window in word.windows(2) {
                *deltas.entry((window[0], window[1])).or_insert(0) -= weight;
            }
            for window in merged.windows(2) {
                *deltas.entry((window[0], window[1])).or_insert(0) += weight;
            }

            *word = merged;
            occurrences += hits as u64 * count;
        }

        if occurrences > 0 {
            let weight = occurrences as i64;
            self.adjust_symbol(pair.0, -weight);
            self.adjust_symbol(pair.1, -weight);
            self.adjust_symbol(new_id, weight);
        }

        let mut deltas: Vec<(Pair, i64)> = deltas
            .into_iter()
            .filter(|&(pair, delta)| delta != 0 && self.is_mergeable(pair))
            .collect();
        deltas.sort_unstable();

        Some(MergeOutcome {
            new_id,
            deltas,
            occurrences,
        })
    }

    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.symbol(id)
    }

    pub fn symbol_id(&self, symbol: &str) -> Option<u32> {
        self.symbols.get(symbol)
    }

    /// The pair's symbol strings.
    pub fn pair_symbols(&self, pair: Pair) -> Option<(CompactString, CompactString)> {
        let left = self.symbols.symbol(pair.0)?;
        let right = self.symbols.symbol(pair.1)?;
        Some((CompactString::new(left), CompactString::new(right)))
    }

    /// Number of distinct symbols currently present in the corpus.
    pub fn distinct_symbols(&self) -> usize {
        self.distinct
    }

    /// Total weighted symbol occurrences.
    pub fn total_symbols(&self) -> u64 {
        self.symbol_freqs.iter().sum()
    }

    /// Present symbols with their weighted frequency, in id order.
    pub fn symbol_frequencies(&self) -> Vec<(&str, u64)> {
        self.symbol_freqs
            .iter()
            .enumerate()
            .filter(|(_, freq)| **freq > 0)
            .filter_map(|(id, &freq)| self.symbols.symbol(id as u32).map(|s| (s, freq)))
            .collect()
    }

    /// Get the number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total count of all word occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    pub fn words(&self) -> &[Vec<u32>] {
        &self.words
    }

    pub fn word_counts(&self) -> &[u64] {
        &self.word_counts
    }

    /// A word's current segmentation as strings.
    pub fn word_symbols(&self, index: usize) -> Option<Vec<&str>> {
        let word = self.words.get(index)?;
        word.iter().map(|&id| self.symbols.symbol(id)).collect()
    }

    pub fn eos_id(&self) -> u32 {
        self.eos_id
    }
}

fn splice_pair(word: &[u32], pair: Pair, new_id: u32) -> Option<(Vec<u32>, usize)> {
    let mut merged = Vec::with_capacity(word.len());
    let mut hits = 0;
    let mut i = 0;

    while i < word.len() {
        if i + 1 < word.len() && word[i] == pair.0 && word[i + 1] == pair.1 {
            merged.push(new_id);
            hits += 1;
            i += 2;
        } else {
            merged.push(word[i]);
            i += 1;
        }
    }

    (hits > 0).then_some((merged, hits))
}
