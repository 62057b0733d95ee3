//! Merge rule management for BPE.
//!
//! Merge rules are kept in learning order (rank = position, rank 0 first)
//! and indexed by interned symbol ids for fast pair lookup during encoding.

use super::symbols::SymbolTable;
use ahash::AHashMap;
use compact_str::CompactString;

/// A pair of symbol ids that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, merged_symbol_id).
///
/// Lower rank = learned earlier = merged first.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Ordered collection of BPE merge rules.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Pairs in learning order
    pairs: Vec<(CompactString, CompactString)>,
    /// Every symbol that takes part in a merge, as left, right or result
    symbols: SymbolTable,
    /// pair -> (rank, merged_symbol_id)
    merges: MergeMap,
}

impl MergeRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build rules from pairs in learning order.
    ///
    /// A pair listed twice keeps its first (lowest) rank.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut rules = Self::new();
        for (left, right) in pairs {
            rules.push(left.as_ref(), right.as_ref());
        }
        rules
    }

    /// Append a merge rule with the next rank and return that rank.
    pub fn push(&mut self, left: &str, right: &str) -> u32 {
        let rank = self.pairs.len() as u32;
        let left_id = self.symbols.intern(left);
        let right_id = self.symbols.intern(right);

        let mut merged = CompactString::new(left);
        merged.push_str(right);
        let merged_id = self.symbols.intern(&merged);

        self.merges
            .entry((left_id, right_id))
            .or_insert((rank, merged_id));
        self.pairs
            .push((CompactString::new(left), CompactString::new(right)));

        rank
    }

    /// Merge rule for a pair of symbol ids, as `(rank, merged_id)`.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Rank of a pair given as strings.
    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        let pair = (self.symbols.get(left)?, self.symbols.get(right)?);
        self.get(pair).map(|(rank, _)| rank)
    }

    /// Whether `pair` has higher priority (lower rank) than `other`.
    #[inline]
    pub fn should_merge_before(&self, pair: Pair, other: Pair) -> bool {
        match (self.get(pair), self.get(other)) {
            (Some((rank1, _)), Some((rank2, _))) => rank1 < rank2,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Symbol id of `symbol`, if it takes part in any merge.
    #[inline]
    pub fn symbol_id(&self, symbol: &str) -> Option<u32> {
        self.symbols.get(symbol)
    }

    #[inline]
    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.symbol(id)
    }

    /// Pairs in learning order.
    pub fn pairs(&self) -> &[(CompactString, CompactString)] {
        &self.pairs
    }

    /// Number of rules (duplicates included).
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
