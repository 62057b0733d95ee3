//! Unicode normalization applied before segmentation.
//!
//! Everything downstream assumes canonical composition (NFC): the sandhi
//! tables and the grapheme rule compare composed codepoints.

use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Canonical composition
    #[default]
    Nfc,
    /// Leave text untouched (input already normalized upstream)
    None,
}

/// Unicode normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    form: NormalizationForm,
}

impl Normalizer {
    pub fn new(form: NormalizationForm) -> Self {
        Self { form }
    }

    pub fn nfc() -> Self {
        Self::new(NormalizationForm::Nfc)
    }

    /// Normalize text, skipping the allocation-heavy path when a quick
    /// check already proves the input is NFC.
    pub fn normalize(&self, text: &str) -> String {
        match self.form {
            NormalizationForm::Nfc => {
                if is_nfc_quick(text.chars()) == IsNormalized::Yes {
                    text.to_string()
                } else {
                    text.nfc().collect()
                }
            }
            NormalizationForm::None => text.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None
    }
}

/// NFC-normalize `text`.
pub fn nfc(text: &str) -> String {
    Normalizer::nfc().normalize(text)
}
