//! Best-effort language tagging for chat messages.
//!
//! DESIGN
//! ======
//! A deterministic heuristic, not a classifier: any Arabic-script character
//! means Arabic; otherwise two or more French stop words mean French;
//! everything else is English. No confidence score is produced.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of French stop-word hits before a message is tagged French.
pub const FRENCH_THRESHOLD: usize = 2;

/// Whole-word French markers. Words that are also common English words
/// (`son`, `car`, `pour`, `comment`, `non`) are left out.
const FRENCH_STOP_WORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "est", "que", "qui", "dans", "pas",
    "sur", "avec", "ce", "cette", "ces", "je", "tu", "il", "elle", "nous", "vous", "ils", "elles",
    "mon", "mes", "sa", "ses", "au", "aux", "ou", "où", "mais", "donc", "quoi", "pourquoi", "quel",
    "quelle", "quels", "quelles", "bonjour", "merci", "oui", "très", "être", "avoir", "sont",
    "suis",
];

/// Elided forms, counted only when written with their apostrophe (`l'eau`, `qu'il`).
const FRENCH_ELISIONS: &[&str] = &["c", "d", "j", "l", "m", "n", "qu", "s", "t"];

/// Language tag sent alongside chat and search requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    /// ISO 639-1 code used on the wire.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classify `text` as Arabic, French or English.
#[must_use]
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_arabic) {
        return Language::Ar;
    }

    let hits: usize = text
        .split(|c: char| !c.is_alphabetic() && !is_apostrophe(c))
        .filter(|word| !word.is_empty())
        .map(|word| french_hits(&word.to_lowercase()))
        .sum();

    if hits >= FRENCH_THRESHOLD { Language::Fr } else { Language::En }
}

/// Stop-word hits in one lower-cased word that may contain apostrophes.
///
/// Only a leading elision before an apostrophe counts as French, so English
/// contractions such as `it's` or `i'd` contribute nothing.
fn french_hits(word: &str) -> usize {
    let (elided, rest) = match word.split_once(is_apostrophe) {
        Some((head, tail)) if FRENCH_ELISIONS.contains(&head) => (1, tail),
        _ => (0, word),
    };
    elided
        + rest
            .split(is_apostrophe)
            .filter(|part| FRENCH_STOP_WORDS.contains(part))
            .count()
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Arabic, Arabic Supplement, Arabic Extended-A and both presentation-form blocks.
fn is_arabic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF
    )
}

#[cfg(test)]
#[path = "lang_test.rs"]
mod lang_test;
