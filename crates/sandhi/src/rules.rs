//! The reverse-sandhi rule table.
//!
//! Each rule is a predicate over a [`Boundary`] plus a rewrite producing
//! zero or more [`SplitCandidate`]s. Rules are plain data: the table is
//! iterated in declared order, and that order is part of the output
//! contract (candidates are reported first-seen).

use shabda_core::text::script::{
    is_independent_vowel, matra_to_independent, ANUSVARA, VIRAMA, VISARGA,
};

/// A proposed split of one morpheme into `left` and `right`.
///
/// `left + right` need not equal the original text: reversal rewrites the
/// characters at the junction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitCandidate {
    pub left: String,
    pub right: String,
}

impl SplitCandidate {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The "no split" candidate for a morpheme.
    pub fn unsplit(morpheme: impl Into<String>) -> Self {
        Self::new(morpheme, String::new())
    }

    pub fn is_split(&self) -> bool {
        !self.right.is_empty()
    }
}

/// The grapheme clusters on either side of a cut.
#[derive(Debug, Clone, Copy)]
pub struct Boundary<'a> {
    left: &'a [&'a str],
    right: &'a [&'a str],
}

impl<'a> Boundary<'a> {
    pub fn new(left: &'a [&'a str], right: &'a [&'a str]) -> Self {
        Self { left, right }
    }

    pub fn left_text(&self) -> String {
        self.left.concat()
    }

    pub fn right_text(&self) -> String {
        self.right.concat()
    }

    pub fn last_left(&self) -> Option<&'a str> {
        self.left.last().copied()
    }

    pub fn first_right(&self) -> Option<&'a str> {
        self.right.first().copied()
    }

    /// Left text with its final character removed.
    fn left_without_last_char(&self) -> String {
        let mut left = self.left_text();
        left.pop();
        left
    }

    /// Right text with its first character removed.
    fn right_without_first_char(&self) -> String {
        let right = self.right_text();
        let mut chars = right.chars();
        chars.next();
        chars.as_str().to_string()
    }

    /// Right text with its first grapheme removed.
    fn right_without_first(&self) -> String {
        self.right.get(1..).map(|rest| rest.concat()).unwrap_or_default()
    }

    fn left_ends_with(&self, mark: char) -> bool {
        self.last_left()
            .and_then(|g| g.chars().last())
            .map_or(false, |c| c == mark)
    }

    fn first_right_char(&self) -> Option<char> {
        self.first_right().and_then(|g| g.chars().next())
    }
}

/// Which phonological process a rule reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    VowelCoalescence,
    Anusvara,
    Visarga,
    Gemination,
    ConsonantCluster,
}

/// One table entry: a match predicate and the rewrite it triggers.
#[derive(Clone, Copy)]
pub struct SandhiRule {
    pub kind: RuleKind,
    pub applies: fn(&Boundary<'_>) -> bool,
    pub rewrite: fn(&Boundary<'_>) -> Vec<SplitCandidate>,
}

impl std::fmt::Debug for SandhiRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandhiRule").field("kind", &self.kind).finish()
    }
}

/// Long vowel / diphthong at the junction -> (vowel kept on the left, vowel
/// restored on the right). Keyed by both the vowel sign and the independent
/// letter.
pub const VOWEL_REVERSE_RULES: [(char, (char, char)); 10] = [
    ('ौ', ('अ', 'ऊ')), // au -> a + ū
    ('ै', ('अ', 'ई')), // ai -> a + ī
    ('ो', ('अ', 'उ')), // o  -> a + u
    ('े', ('अ', 'इ')), // e  -> a + i
    ('ा', ('अ', 'अ')), // ā  -> a + a
    ('औ', ('अ', 'ऊ')),
    ('ऐ', ('अ', 'ई')),
    ('ओ', ('अ', 'उ')),
    ('ए', ('अ', 'इ')),
    ('आ', ('अ', 'अ')),
];

/// Place of articulation of a stop, with its homorganic nasal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsonantClass {
    Guttural,
    Palatal,
    Retroflex,
    Dental,
    Labial,
}

pub const CONSONANT_CLASSES: [(ConsonantClass, [char; 5], char); 5] = [
    (ConsonantClass::Guttural, ['क', 'ख', 'ग', 'घ', 'ङ'], 'ङ'),
    (ConsonantClass::Palatal, ['च', 'छ', 'ज', 'झ', 'ञ'], 'ञ'),
    (ConsonantClass::Retroflex, ['ट', 'ठ', 'ड', 'ढ', 'ण'], 'ण'),
    (ConsonantClass::Dental, ['त', 'थ', 'द', 'ध', 'न'], 'न'),
    (ConsonantClass::Labial, ['प', 'फ', 'ब', 'भ', 'म'], 'म'),
];

/// Nasal used when the following sound has no recognised class.
pub const FALLBACK_NASAL: char = 'न';

/// What a visarga may stand for: nothing, s, or ś.
pub const VISARGA_SUBSTITUTES: [&str; 3] = ["", "स्", "श्"];

/// Literal cluster at the start of `right` -> (appended to left, replaces
/// the cluster on the right). First matching entry wins.
pub const SPECIFIC_CONSONANT_REVERSES: [(&str, &str, &str); 4] = [
    ("च्च", "त्", "च"),
    ("च्छ", "त्", "छ"),
    ("त्त", "त्", "त"),
    ("द्ध", "द्", "ध"),
];

pub fn consonant_class(ch: char) -> Option<ConsonantClass> {
    CONSONANT_CLASSES
        .iter()
        .find(|(_, members, _)| members.contains(&ch))
        .map(|&(class, _, _)| class)
}

/// Homorganic nasal + virama for the consonant starting `following`.
pub fn homorganic_nasal(following: Option<char>) -> String {
    let nasal = following
        .and_then(|ch| {
            CONSONANT_CLASSES
                .iter()
                .find(|(_, members, _)| members.contains(&ch))
        })
        .map_or(FALLBACK_NASAL, |&(_, _, nasal)| nasal);

    let mut out = String::with_capacity(8);
    out.push(nasal);
    out.push(VIRAMA);
    out
}

#[inline]
fn is_consonant(ch: char) -> bool {
    matches!(ch as u32, 0x0915..=0x0939 | 0x0958..=0x095F)
}

fn vowel_rule(vowel: char) -> Option<(char, char)> {
    VOWEL_REVERSE_RULES
        .iter()
        .find(|&&(key, _)| key == vowel)
        .map(|&(_, pair)| pair)
}

// Vowel coalescence

fn vowel_applies(b: &Boundary<'_>) -> bool {
    let left_vowel = b.last_left().and_then(|g| g.chars().last());
    let right_starts_with_vowel = b
        .first_right_char()
        .map_or(false, |c| is_independent_vowel(c) || matra_to_independent(c).is_some());

    left_vowel.and_then(vowel_rule).is_some() && right_starts_with_vowel
}

fn vowel_rewrite(b: &Boundary<'_>) -> Vec<SplitCandidate> {
    let Some(vowel) = b.last_left().and_then(|g| g.chars().last()) else {
        return Vec::new();
    };
    let Some((left_vowel, right_vowel)) = vowel_rule(vowel) else {
        return Vec::new();
    };

    // A dependent sign drops back to the consonant's inherent a; an
    // independent letter is replaced by its a-vowel.
    let mut left = b.left_without_last_char();
    if is_independent_vowel(vowel) {
        left.push(left_vowel);
    }

    let mut right = String::new();
    right.push(right_vowel);
    right.push_str(&b.right_without_first_char());

    vec![SplitCandidate::new(left, right)]
}

// Anusvara

fn anusvara_applies(b: &Boundary<'_>) -> bool {
    b.left_ends_with(ANUSVARA)
}

fn anusvara_rewrite(b: &Boundary<'_>) -> Vec<SplitCandidate> {
    let mut left = b.left_without_last_char();
    left.push_str(&homorganic_nasal(b.first_right_char()));
    vec![SplitCandidate::new(left, b.right_text())]
}

// Visarga

fn visarga_applies(b: &Boundary<'_>) -> bool {
    b.left_ends_with(VISARGA)
}

fn visarga_rewrite(b: &Boundary<'_>) -> Vec<SplitCandidate> {
    let stem = b.left_without_last_char();
    let right = b.right_text();

    VISARGA_SUBSTITUTES
        .iter()
        .map(|substitute| SplitCandidate::new(format!("{}{}", stem, substitute), right.clone()))
        .collect()
}

// Gemination

fn gemination_applies(b: &Boundary<'_>) -> bool {
    let mut chars = b.right_text().chars().take(3).collect::<Vec<_>>().into_iter();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c1), Some(VIRAMA), Some(c2)) => c1 == c2 && is_consonant(c1),
        _ => false,
    }
}

fn gemination_rewrite(b: &Boundary<'_>) -> Vec<SplitCandidate> {
    let Some(first) = b.first_right() else {
        return Vec::new();
    };

    // The doubled consonant's first half is its own cluster (C + virama).
    let mut left = b.left_text();
    left.push_str(first);
    vec![SplitCandidate::new(left, b.right_without_first())]
}

// Specific clusters

fn cluster_entry(b: &Boundary<'_>) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let right = b.right_text();
    SPECIFIC_CONSONANT_REVERSES
        .iter()
        .find(|(cluster, _, _)| right.starts_with(cluster))
}

fn cluster_applies(b: &Boundary<'_>) -> bool {
    cluster_entry(b).is_some()
}

fn cluster_rewrite(b: &Boundary<'_>) -> Vec<SplitCandidate> {
    let Some(&(cluster, to_left, to_right)) = cluster_entry(b) else {
        return Vec::new();
    };

    let right = b.right_text();
    let left = format!("{}{}", b.left_text(), to_left);
    let right = format!("{}{}", to_right, &right[cluster.len()..]);
    vec![SplitCandidate::new(left, right)]
}

/// The standard table, in application order.
pub static STANDARD_RULES: [SandhiRule; 5] = [
    SandhiRule {
        kind: RuleKind::VowelCoalescence,
        applies: vowel_applies,
        rewrite: vowel_rewrite,
    },
    SandhiRule {
        kind: RuleKind::Anusvara,
        applies: anusvara_applies,
        rewrite: anusvara_rewrite,
    },
    SandhiRule {
        kind: RuleKind::Visarga,
        applies: visarga_applies,
        rewrite: visarga_rewrite,
    },
    SandhiRule {
        kind: RuleKind::Gemination,
        applies: gemination_applies,
        rewrite: gemination_rewrite,
    },
    SandhiRule {
        kind: RuleKind::ConsonantCluster,
        applies: cluster_applies,
        rewrite: cluster_rewrite,
    },
];

/// An ordered, immutable set of rules.
#[derive(Debug, Clone)]
pub struct SandhiRuleSet {
    rules: Vec<SandhiRule>,
}

impl SandhiRuleSet {
    pub fn new(rules: Vec<SandhiRule>) -> Self {
        Self { rules }
    }

    /// The standard five-rule table.
    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec())
    }

    /// Keep only rules of the given kinds, preserving table order.
    pub fn only(kinds: &[RuleKind]) -> Self {
        Self::new(
            STANDARD_RULES
                .iter()
                .filter(|rule| kinds.contains(&rule.kind))
                .copied()
                .collect(),
        )
    }

    pub fn rules(&self) -> &[SandhiRule] {
        &self.rules
    }

    /// Append every candidate produced at `boundary` to `out`, rule by rule.
    pub fn apply(&self, boundary: &Boundary<'_>, out: &mut Vec<SplitCandidate>) {
        for rule in &self.rules {
            if (rule.applies)(boundary) {
                out.extend((rule.rewrite)(boundary));
            }
        }
    }
}

impl Default for SandhiRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
