//! Cartesian expansion of per-morpheme split choices over a verse.

use crate::rules::SplitCandidate;

/// The split choices available for one morpheme of a verse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphemeOptions {
    pub morpheme: String,
    pub candidates: Vec<SplitCandidate>,
}

impl MorphemeOptions {
    /// An empty candidate list means the morpheme is kept whole.
    pub fn new(morpheme: impl Into<String>, candidates: Vec<SplitCandidate>) -> Self {
        let morpheme = morpheme.into();
        let candidates = if candidates.is_empty() {
            vec![SplitCandidate::unsplit(morpheme.clone())]
        } else {
            candidates
        };
        Self {
            morpheme,
            candidates,
        }
    }
}

/// Builds the lazy stream of split verses.
#[derive(Debug, Clone)]
pub struct VerseSplitExpander {
    separator: String,
    max_combinations: Option<usize>,
}

impl VerseSplitExpander {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            max_combinations: None,
        }
    }

    /// Stop after `limit` verses per call to [`expand`](Self::expand).
    pub fn with_max_combinations(mut self, limit: Option<usize>) -> Self {
        self.max_combinations = limit;
        self
    }

    pub fn max_combinations(&self) -> Option<usize> {
        self.max_combinations
    }

    /// One output verse per element of the Cartesian product of `options`,
    /// the last morpheme varying fastest.
    ///
    /// For each chosen candidate with a non-empty right part, the first
    /// occurrence of the morpheme in the (progressively rewritten) verse is
    /// replaced by `left + separator + right`. Results are trimmed.
    pub fn expand(&self, verse: &str, options: Vec<MorphemeOptions>) -> SplitCombinations {
        let options: Vec<MorphemeOptions> = options
            .into_iter()
            .map(|o| MorphemeOptions::new(o.morpheme, o.candidates))
            .collect();

        SplitCombinations {
            verse: verse.to_string(),
            separator: self.separator.clone(),
            indices: vec![0; options.len()],
            options,
            remaining: self.max_combinations,
            done: false,
        }
    }
}

impl Default for VerseSplitExpander {
    fn default() -> Self {
        Self::new(" ")
    }
}

/// Iterator over split verses. Owns its inputs; nothing is materialized
/// beyond the verse currently being produced.
#[derive(Debug, Clone)]
pub struct SplitCombinations {
    verse: String,
    separator: String,
    options: Vec<MorphemeOptions>,
    /// Odometer over `options`
    indices: Vec<usize>,
    remaining: Option<usize>,
    done: bool,
}

impl SplitCombinations {
    /// Size of the full product, or `None` if it overflows `usize`.
    pub fn total(&self) -> Option<usize> {
        self.options
            .iter()
            .try_fold(1usize, |acc, o| acc.checked_mul(o.candidates.len()))
    }

    fn render(&self) -> String {
        let mut verse = self.verse.clone();
        for (option, &idx) in self.options.iter().zip(&self.indices) {
            let chosen = &option.candidates[idx];
            if chosen.is_split() {
                let replacement = format!("{}{}{}", chosen.left, self.separator, chosen.right);
                verse = verse.replacen(&option.morpheme, &replacement, 1);
            }
        }
        verse.trim().to_string()
    }

    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.options[pos].candidates.len() {
                return;
            }
            self.indices[pos] = 0;
        }
        self.done = true;
    }
}

impl Iterator for SplitCombinations {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                self.done = true;
                return None;
            }
            *remaining -= 1;
        }

        let verse = self.render();
        self.advance();
        Some(verse)
    }
}
