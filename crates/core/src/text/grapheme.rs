//! Grapheme-cluster segmentation.
//!
//! The default rule is deliberately simple and Devanagari-oriented: a
//! cluster is one base codepoint followed by every combining mark
//! (General_Category = Mark) that trails it. A virama therefore closes its
//! cluster, so `क्त` segments as `["क्", "त"]`.
//!
//! Input is expected to be NFC-normalized by the caller. Segmentation is
//! lossless: concatenating the clusters reproduces the input byte for byte.

use unicode_normalization::char::is_combining_mark;
use unicode_segmentation::UnicodeSegmentation;

/// How text is cut into clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentationMode {
    /// Base codepoint plus trailing combining marks
    #[default]
    CombiningMarks,
    /// Unicode extended grapheme clusters (UAX #29)
    Extended,
}

/// Splits text into grapheme clusters.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphemeSegmenter {
    mode: SegmentationMode,
}

impl GraphemeSegmenter {
    pub fn new(mode: SegmentationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SegmentationMode {
        self.mode
    }

    /// Segment `text` into clusters borrowed from it.
    ///
    /// Empty input yields an empty vector. A leading combining mark with no
    /// base forms a cluster of its own.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.mode {
            SegmentationMode::CombiningMarks => combining_mark_clusters(text),
            SegmentationMode::Extended => text.graphemes(true).collect(),
        }
    }

    /// Segment into owned strings.
    pub fn segment_owned(&self, text: &str) -> Vec<String> {
        self.segment(text).into_iter().map(str::to_owned).collect()
    }
}

/// Segment with the default combining-mark rule.
pub fn graphemes(text: &str) -> Vec<&str> {
    combining_mark_clusters(text)
}

fn combining_mark_clusters(text: &str) -> Vec<&str> {
    let mut clusters = Vec::with_capacity(text.len() / 3 + 1);
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if idx > start && !is_combining_mark(ch) {
            clusters.push(&text[start..idx]);
            start = idx;
        }
    }

    if start < text.len() {
        clusters.push(&text[start..]);
    }

    clusters
}
