//! Devanagari codepoints and the script validity boundary.
//!
//! Text handed to the sandhi and BPE engines is expected to contain only
//! characters from [`SCRIPT_RANGES`] plus whitespace. Sanitation happens
//! before the core; the helpers here are what that layer uses.

use crate::error::{Result, ShabdaError};

pub const VERTICAL_BAR: &str = "|";
pub const DOUBLE_VERTICAL_BAR: &str = "||";

/// ं U+0902
pub const ANUSVARA: char = '\u{0902}';
/// ः U+0903
pub const VISARGA: char = '\u{0903}';
/// ् U+094D
pub const VIRAMA: char = '\u{094D}';
/// । U+0964
pub const DANDA: char = '\u{0964}';
/// ॥ U+0965
pub const DOUBLE_DANDA: char = '\u{0965}';
/// ऽ U+093D
pub const AVAGRAHA: char = '\u{093D}';

/// Independent vowels, in traditional order.
pub const INDEPENDENT_VOWELS: [char; 14] = [
    'अ', 'आ', 'इ', 'ई', 'उ', 'ऊ', 'ऋ', 'ॠ', 'ऌ', 'ॡ', 'ए', 'ऐ', 'ओ', 'औ',
];

/// Dependent vowel sign (matra) to its independent vowel.
pub const MATRA_TO_INDEPENDENT: [(char, char); 11] = [
    ('ा', 'आ'),
    ('ि', 'इ'),
    ('ी', 'ई'),
    ('ु', 'उ'),
    ('ू', 'ऊ'),
    ('ृ', 'ऋ'),
    ('ॄ', 'ॠ'),
    ('े', 'ए'),
    ('ै', 'ऐ'),
    ('ो', 'ओ'),
    ('ौ', 'औ'),
];

/// Inclusive codepoint ranges that make up the accepted script:
/// Devanagari, Devanagari Extended, Devanagari Extended-A and Vedic Extensions.
pub const SCRIPT_RANGES: [(u32, u32); 4] = [
    (0x0900, 0x097F),
    (0xA8E0, 0xA8FF),
    (0x11B00, 0x11B5F),
    (0x1CD0, 0x1CFF),
];

/// Whether `ch` lies inside one of the [`SCRIPT_RANGES`].
#[inline]
pub fn is_script_char(ch: char) -> bool {
    let cp = ch as u32;
    SCRIPT_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Validate a single-character string against the script boundary.
///
/// Fails with [`ShabdaError::InvalidInput`] unless `s` holds exactly one
/// character.
pub fn is_sanskrit_char(s: &str) -> Result<bool> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(is_script_char(ch)),
        _ => Err(ShabdaError::InvalidInput(format!(
            "expected a single character, got {:?}",
            s
        ))),
    }
}

/// Whether any character of `text` is in the script ranges.
pub fn contains_script_char(text: &str) -> bool {
    text.chars().any(is_script_char)
}

#[inline]
pub fn is_independent_vowel(ch: char) -> bool {
    INDEPENDENT_VOWELS.contains(&ch)
}

/// Independent form of a dependent vowel sign, if `ch` is one.
pub fn matra_to_independent(ch: char) -> Option<char> {
    MATRA_TO_INDEPENDENT
        .iter()
        .find(|&&(matra, _)| matra == ch)
        .map(|&(_, indep)| indep)
}
