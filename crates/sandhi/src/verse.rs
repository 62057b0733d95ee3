//! Verse-level preprocessing: normalization, sanitizing, verse markers and
//! the line -> split-verses pipeline.

use crate::candidates::{is_eligible, SandhiCandidateGenerator};
use crate::expand::{MorphemeOptions, SplitCombinations, VerseSplitExpander};
use regex::Regex;
use shabda_core::error::{Result, ShabdaError};
use shabda_core::text::script::{
    is_script_char, DANDA, DOUBLE_DANDA, DOUBLE_VERTICAL_BAR, VERTICAL_BAR,
};
use shabda_core::text::special::{DANDA_TOKEN, DOUBLE_DANDA_TOKEN, VERSE_MARKERS};
use shabda_core::text::{nfc, SpecialTokens};
use std::sync::OnceLock;

/// NFC-normalize a raw verse.
pub fn normalize_verse(verse: &str) -> String {
    nfc(verse)
}

/// Drop every character that is neither a script character nor whitespace.
pub fn sanitize_verse(verse: &str) -> String {
    verse
        .chars()
        .filter(|&ch| is_script_char(ch) || ch.is_whitespace())
        .collect()
}

/// Replace verse punctuation with marker tokens. Double forms are replaced
/// first so `||` becomes one `<DANDA2>` rather than two `<DANDA>`.
pub fn insert_special_tokens(verse: &str) -> String {
    verse
        .replace(DOUBLE_DANDA, DOUBLE_DANDA_TOKEN)
        .replace(DOUBLE_VERTICAL_BAR, DOUBLE_DANDA_TOKEN)
        .replace(DANDA, DANDA_TOKEN)
        .replace(VERTICAL_BAR, DANDA_TOKEN)
}

fn alternation(tokens: &[&str]) -> String {
    let mut literals: Vec<&str> = tokens.iter().copied().filter(|t| !t.is_empty()).collect();
    // Longest first so a token never loses to its own prefix.
    literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    literals
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

fn token_regex(tokens: &[&str]) -> Result<Option<Regex>> {
    let pattern = alternation(tokens);
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| ShabdaError::InvalidConfig(format!("invalid special token pattern: {}", e)))
}

fn morpheme_regex(exclude: &[&str]) -> Result<Regex> {
    let tokens = alternation(exclude);
    let pattern = if tokens.is_empty() {
        r"\s+".to_string()
    } else {
        format!(r"(?:{}|\s+)", tokens)
    };
    Regex::new(&pattern)
        .map_err(|e| ShabdaError::InvalidConfig(format!("invalid special token pattern: {}", e)))
}

fn split_segments(verse: &str, tokens: Option<&Regex>) -> Vec<String> {
    let Some(tokens) = tokens else {
        return if verse.is_empty() {
            Vec::new()
        } else {
            vec![verse.to_string()]
        };
    };

    let mut segments = Vec::new();
    let mut start = 0;
    for m in tokens.find_iter(verse) {
        let segment = &verse[start..m.end()];
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
        start = m.end();
    }
    if start < verse.len() {
        segments.push(verse[start..].to_string());
    }
    segments
}

fn split_morphemes(verse: &str, separators: &Regex, exclude: &[&str]) -> Vec<String> {
    separators
        .split(verse)
        .filter(|part| !part.is_empty() && !exclude.contains(part))
        .map(str::to_string)
        .collect()
}

/// Cut a verse into segments, each ending with (and including) a marker
/// token; text after the last marker forms a final segment. Empty segments
/// are dropped.
pub fn split_verse_by_special_tokens(verse: &str, tokens: &[&str]) -> Result<Vec<String>> {
    let regex = token_regex(tokens)?;
    Ok(split_segments(verse, regex.as_ref()))
}

/// Whitespace-separated morphemes of a verse, with `exclude` tokens removed
/// whether they stand alone or are glued to a word.
pub fn morphemes_from_verse(verse: &str, exclude: &[&str]) -> Result<Vec<String>> {
    let regex = morpheme_regex(exclude)?;
    Ok(split_morphemes(verse, &regex, exclude))
}

fn marker_segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&alternation(&VERSE_MARKERS)).expect("Invalid regex pattern"))
}

fn marker_morpheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?:{}|\s+)", alternation(&VERSE_MARKERS))).expect("Invalid regex pattern")
    })
}

/// Knobs for [`VersePreprocessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// Cap on split combinations emitted per segment; `None` emits all
    pub max_combinations: Option<usize>,
    /// Joins the two halves of a split morpheme
    pub separator: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_combinations: None,
            separator: " ".to_string(),
        }
    }
}

impl PreprocessConfig {
    pub fn with_max_combinations(mut self, limit: Option<usize>) -> Self {
        self.max_combinations = limit;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// The full preprocessing pipeline for one raw line.
///
/// normalize -> sanitize -> insert markers -> split into segments -> per
/// segment, expand every combination of morpheme split candidates.
#[derive(Debug, Clone, Default)]
pub struct VersePreprocessor {
    generator: SandhiCandidateGenerator,
    expander: VerseSplitExpander,
    special: SpecialTokens,
}

impl VersePreprocessor {
    pub fn new(generator: SandhiCandidateGenerator, expander: VerseSplitExpander) -> Self {
        Self {
            generator,
            expander,
            special: SpecialTokens::default(),
        }
    }

    /// Standard rule set with the expander built from `config`.
    pub fn from_config(config: &PreprocessConfig) -> Self {
        let expander = VerseSplitExpander::new(config.separator.clone())
            .with_max_combinations(config.max_combinations);
        Self::new(SandhiCandidateGenerator::default(), expander)
    }

    pub fn expander(&self) -> &VerseSplitExpander {
        &self.expander
    }

    /// Normalized, sanitized verse with markers inserted.
    pub fn prepare(&self, line: &str) -> String {
        insert_special_tokens(&sanitize_verse(&normalize_verse(line)))
    }

    /// All split verses for `line`, lazily.
    pub fn process_line<'a>(&'a self, line: &str) -> impl Iterator<Item = String> + 'a {
        let prepared = self.prepare(line);
        split_segments(&prepared, Some(marker_segment_regex()))
            .into_iter()
            .flat_map(move |segment| self.expand_segment(&segment))
    }

    fn expand_segment(&self, segment: &str) -> SplitCombinations {
        let options: Vec<MorphemeOptions> =
            split_morphemes(segment, marker_morpheme_regex(), &VERSE_MARKERS)
                .into_iter()
                .map(|morpheme| {
                    let candidates = if is_eligible(&morpheme, &self.special) {
                        self.generator.generate(&morpheme)
                    } else {
                        Vec::new()
                    };
                    MorphemeOptions::new(morpheme, candidates)
                })
                .collect();

        let combinations = self.expander.expand(segment, options);
        if let (Some(total), Some(limit)) = (combinations.total(), self.expander.max_combinations()) {
            if total > limit {
                log::debug!("segment has {} split combinations, emitting first {}", total, limit);
            }
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKERS: [&str; 2] = ["<DANDA>", "<DANDA2>"];

    #[test]
    fn test_sanitize_keeps_script_and_whitespace() {
        assert_eq!(sanitize_verse("राम abc, सीता!"), "राम  सीता");
        assert_eq!(sanitize_verse("धर्म।\tकर्म॥"), "धर्म।\tकर्म॥");
    }

    #[test]
    fn test_insert_special_tokens() {
        assert_eq!(insert_special_tokens("क। ख॥"), "क<DANDA> ख<DANDA2>");
        assert_eq!(insert_special_tokens("क | ख ||"), "क <DANDA> ख <DANDA2>");
    }

    #[test]
    fn test_split_verse_by_special_tokens() {
        let segments =
            split_verse_by_special_tokens("धर्मक्षेत्रे<DANDA> कुरुक्षेत्रे<DANDA2>", &MARKERS).unwrap();
        assert_eq!(segments, vec!["धर्मक्षेत्रे<DANDA>", " कुरुक्षेत्रे<DANDA2>"]);
    }

    #[test]
    fn test_split_keeps_trailing_text_and_lone_marker() {
        let segments = split_verse_by_special_tokens("<DANDA>राम", &MARKERS).unwrap();
        assert_eq!(segments, vec!["<DANDA>", "राम"]);
        assert!(split_verse_by_special_tokens("", &MARKERS).unwrap().is_empty());
    }

    #[test]
    fn test_morphemes_exclude_markers() {
        let morphemes = morphemes_from_verse(" रामः वनं<DANDA> गच्छति <DANDA2>", &MARKERS).unwrap();
        assert_eq!(morphemes, vec!["रामः", "वनं", "गच्छति"]);
    }

    #[test]
    fn test_morphemes_without_exclusions() {
        let morphemes = morphemes_from_verse("क  ख\nग", &[]).unwrap();
        assert_eq!(morphemes, vec!["क", "ख", "ग"]);
    }

    #[test]
    fn test_process_line_without_candidates() {
        let preprocessor = VersePreprocessor::default();
        let out: Vec<_> = preprocessor.process_line("नमो नमः।").collect();
        assert_eq!(out, vec!["नमो नमः<DANDA>"]);
    }

    #[test]
    fn test_process_line_expands_visarga() {
        let preprocessor = VersePreprocessor::default();
        let out: Vec<_> = preprocessor.process_line("रामःचवन वनम्॥").collect();
        assert_eq!(
            out,
            vec![
                "राम चवन वनम्<DANDA2>",
                "रामस् चवन वनम्<DANDA2>",
                "रामश् चवन वनम्<DANDA2>",
            ]
        );
    }

    #[test]
    fn test_process_line_per_segment() {
        let preprocessor = VersePreprocessor::default();
        let out: Vec<_> = preprocessor.process_line("क ख। ग घ।").collect();
        assert_eq!(out, vec!["क ख<DANDA>", "ग घ<DANDA>"]);
    }

    #[test]
    fn test_process_line_respects_cap() {
        let preprocessor = VersePreprocessor::new(
            SandhiCandidateGenerator::default(),
            VerseSplitExpander::default().with_max_combinations(Some(1)),
        );
        let out: Vec<_> = preprocessor.process_line("रामःचवन").collect();
        assert_eq!(out, vec!["राम चवन"]);
    }

    #[test]
    fn test_from_config() {
        let config = PreprocessConfig::default()
            .with_separator("+")
            .with_max_combinations(Some(2));
        let preprocessor = VersePreprocessor::from_config(&config);

        assert_eq!(preprocessor.expander().max_combinations(), Some(2));
        let out: Vec<_> = preprocessor.process_line("रामःचवन").collect();
        assert_eq!(out, vec!["राम+चवन", "रामस्+चवन"]);
    }

    #[test]
    fn test_process_line_drops_foreign_text() {
        let preprocessor = VersePreprocessor::default();
        let out: Vec<_> = preprocessor.process_line("hello").collect();
        assert!(out.is_empty());
    }
}
