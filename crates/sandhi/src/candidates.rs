//! Split-candidate generation for a single morpheme.

use crate::rules::{Boundary, SandhiRuleSet, SplitCandidate};
use ahash::AHashSet;
use shabda_core::text::script::contains_script_char;
use shabda_core::text::{GraphemeSegmenter, Normalizer, SpecialTokens};

/// Proposes every rule-licensed split of a morpheme.
///
/// The token is NFC-normalized and segmented into grapheme clusters; each
/// interior cut `i` in `[1, n - 1)` is offered to the rule table in order.
/// Output is deduplicated by exact `(left, right)` and kept in first-seen
/// order, so the same input always yields the same list.
#[derive(Debug, Clone, Default)]
pub struct SandhiCandidateGenerator {
    rules: SandhiRuleSet,
    normalizer: Normalizer,
    segmenter: GraphemeSegmenter,
}

impl SandhiCandidateGenerator {
    pub fn new(rules: SandhiRuleSet) -> Self {
        Self {
            rules,
            normalizer: Normalizer::nfc(),
            segmenter: GraphemeSegmenter::default(),
        }
    }

    pub fn with_segmenter(mut self, segmenter: GraphemeSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn rules(&self) -> &SandhiRuleSet {
        &self.rules
    }

    /// Candidate splits of `token`. Tokens of fewer than three clusters
    /// have no interior cut and produce nothing.
    pub fn generate(&self, token: &str) -> Vec<SplitCandidate> {
        let normalized = self.normalizer.normalize(token);
        let clusters = self.segmenter.segment(&normalized);
        if clusters.len() < 3 {
            return Vec::new();
        }

        let mut raw = Vec::new();
        for cut in 1..clusters.len() - 1 {
            let (left, right) = clusters.split_at(cut);
            self.rules.apply(&Boundary::new(left, right), &mut raw);
        }

        dedup_first_seen(raw)
    }
}

/// Whether a token should be offered to the generator at all: it must carry
/// at least one script character and must not be a special token.
pub fn is_eligible(token: &str, special: &SpecialTokens) -> bool {
    !special.contains(token) && contains_script_char(token)
}

fn dedup_first_seen(candidates: Vec<SplitCandidate>) -> Vec<SplitCandidate> {
    let mut seen = AHashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;
    use proptest::prelude::*;

    #[test]
    fn test_visarga_boundary_yields_three() {
        // रा | मः | च | व | न : only the cut after मः matches, and only visarga.
        let generator = SandhiCandidateGenerator::default();
        let candidates = generator.generate("रामःचवन");

        assert_eq!(
            candidates,
            vec![
                SplitCandidate::new("राम", "चवन"),
                SplitCandidate::new("रामस्", "चवन"),
                SplitCandidate::new("रामश्", "चवन"),
            ]
        );
    }

    #[test]
    fn test_visarga_on_penultimate_cluster_is_not_cut() {
        // रा | मः | च : the cut after मः is the last one and is never tried.
        let generator = SandhiCandidateGenerator::default();
        assert!(generator.generate("रामःच").is_empty());
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        // Gemination and the त्त cluster propose the same split.
        let generator = SandhiCandidateGenerator::default();
        let candidates = generator.generate("उत्तम");

        assert_eq!(candidates, vec![SplitCandidate::new("उत्", "तम")]);
    }

    #[test]
    fn test_short_tokens_have_no_interior_cut() {
        let generator = SandhiCandidateGenerator::default();
        assert!(generator.generate("").is_empty());
        assert!(generator.generate("क").is_empty());
        assert!(generator.generate("मः").is_empty());
        // Two clusters: the only cut is excluded.
        assert!(generator.generate("रामः").is_empty());
    }

    #[test]
    fn test_last_cut_is_excluded() {
        // The anusvara sits on the final cluster, which has no right side.
        let generator = SandhiCandidateGenerator::default();
        assert!(generator.generate("कसं").is_empty());
    }

    #[test]
    fn test_input_is_normalized() {
        // Precomposed qa (U+0958) normalizes to क + nukta.
        let generator = SandhiCandidateGenerator::default();
        let decomposed = generator.generate("रामःक\u{093C}ावन");
        let composed = generator.generate("रामः\u{0958}ावन");
        assert_eq!(decomposed, composed);
        assert_eq!(decomposed.len(), 3);
    }

    #[test]
    fn test_restricted_rule_set() {
        let generator = SandhiCandidateGenerator::new(SandhiRuleSet::only(&[RuleKind::Anusvara]));
        assert!(generator.generate("रामःचवन").is_empty());
        assert_eq!(
            generator.generate("अहंकार"),
            vec![SplitCandidate::new("अहङ्", "कार")]
        );
    }

    #[test]
    fn test_eligibility() {
        let special = SpecialTokens::default();
        assert!(is_eligible("रामः", &special));
        assert!(!is_eligible("<DANDA>", &special));
        assert!(!is_eligible("hello", &special));
        assert!(!is_eligible("", &special));
    }

    proptest! {
        #[test]
        fn prop_generation_is_deterministic(s in "[\u{0900}-\u{097F}]{0,24}") {
            let generator = SandhiCandidateGenerator::default();
            prop_assert_eq!(generator.generate(&s), generator.generate(&s));
        }

        #[test]
        fn prop_no_duplicate_candidates(s in "[\u{0900}-\u{097F}]{0,24}") {
            let generator = SandhiCandidateGenerator::default();
            let candidates = generator.generate(&s);
            let unique: AHashSet<_> = candidates.iter().collect();
            prop_assert_eq!(unique.len(), candidates.len());
        }
    }
}
