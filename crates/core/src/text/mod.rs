//! Text handling shared by the sandhi and BPE engines.
//!
//! Script data and special-token literals, Unicode normalization, grapheme
//! segmentation and word splitting.

pub mod grapheme;
pub mod normalize;
pub mod script;
pub mod special;
pub mod split;

pub use grapheme::{graphemes, GraphemeSegmenter, SegmentationMode};
pub use normalize::{nfc, NormalizationForm, Normalizer};
pub use special::SpecialTokens;
pub use split::WordSplitter;
