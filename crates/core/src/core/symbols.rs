//! String interning for BPE symbols.
//!
//! Training and merge lookup work on `u32` symbol ids rather than strings;
//! this table is the bijection between the two. Ids are assigned in
//! insertion order and never reused.

use ahash::AHashMap;
use compact_str::CompactString;

/// Interned symbol strings.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    ids: AHashMap<CompactString, u32>,
    symbols: Vec<CompactString>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: AHashMap::with_capacity(capacity),
            symbols: Vec::with_capacity(capacity),
        }
    }

    /// Id of `symbol`, interning it if it is new.
    pub fn intern(&mut self, symbol: &str) -> u32 {
        if let Some(&id) = self.ids.get(symbol) {
            return id;
        }

        let id = self.symbols.len() as u32;
        let symbol = CompactString::new(symbol);
        self.symbols.push(symbol.clone());
        self.ids.insert(symbol, id);
        id
    }

    #[inline]
    pub fn get(&self, symbol: &str) -> Option<u32> {
        self.ids.get(symbol).copied()
    }

    #[inline]
    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(|s| s.as_str())
    }

    /// Intern the concatenation of two existing symbols.
    pub fn intern_concat(&mut self, left: u32, right: u32) -> Option<u32> {
        let mut merged = CompactString::new(self.symbol(left)?);
        merged.push_str(self.symbol(right)?);
        Some(self.intern(&merged))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("रा");
        let b = table.intern("म");

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(table.intern("रा"), a);
        assert_eq!(table.len(), 2);
        assert_eq!(table.symbol(b), Some("म"));
        assert_eq!(table.get("सी"), None);
    }

    #[test]
    fn test_intern_concat() {
        let mut table = SymbolTable::new();
        let a = table.intern("रा");
        let b = table.intern("म");
        let ab = table.intern_concat(a, b).unwrap();

        assert_eq!(table.symbol(ab), Some("राम"));
        assert_eq!(table.intern_concat(a, 99), None);
    }
}
