//! Input detection
//!
//! Two questions are answered here: does text already contain Gujarati
//! script, and does Latin text look like romanized Gujarati (or its Hindi
//! neighbours that users commonly mix in).

use gu_xlit_core::{contains_script, Script};

/// Common romanized Gujarati and Hindi words
const DEFAULT_INDICATORS: &[&str] = &[
    "tame", "ame", "hu", "tu", "che", "chhe", "bol", "naam", "maru", "taru", "tamaru", "mari",
    "tari", "tamari", "gujarati", "namaste", "dhanyawad", "shukriya", "aap", "kya", "kyu", "kab",
    "kahan", "kaun", "kaise", "kitna", "chalo", "aao", "jao", "karo", "dekho", "suno", "bolo",
    "khao",
];

/// Punctuation allowed in "Latin only" text
const LATIN_PUNCTUATION: &str = ".,!?;:'-\"()[]{}";

/// True if any character falls in the Gujarati block (U+0A80–U+0AFF)
pub fn contains_gujarati(text: &str) -> bool {
    contains_script(text, Script::Gujarati)
}

/// Heuristic detector for romanized Gujarati
#[derive(Debug, Clone)]
pub struct RomanGujaratiDetector {
    indicators: Vec<String>,
}

impl Default for RomanGujaratiDetector {
    fn default() -> Self {
        Self::with_indicators(DEFAULT_INDICATORS.iter().copied())
    }
}

impl RomanGujaratiDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indicators<I, S>(indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            indicators: indicators
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Decide whether `text` is romanized Gujarati
    ///
    /// In order:
    /// 1. two or more distinct indicators appear as whole words
    /// 2. one indicator word, and the text is Latin only with at least one letter
    /// 3. three or more indicators appear as substrings, same Latin-only condition
    pub fn is_roman_gujarati(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| LATIN_PUNCTUATION.contains(c)))
            .filter(|w| !w.is_empty())
            .collect();

        let direct = self
            .indicators
            .iter()
            .filter(|i| words.contains(&i.as_str()))
            .count();

        if direct >= 2 {
            return true;
        }

        let latin = is_latin_only(&lower) && lower.chars().any(char::is_alphabetic);

        if direct >= 1 && latin {
            return true;
        }

        let partial = self
            .indicators
            .iter()
            .filter(|i| lower.contains(i.as_str()))
            .count();

        partial >= 3 && latin
    }
}

/// Only Latin-script letters (accented ones included), digits, whitespace and
/// common punctuation
fn is_latin_only(text: &str) -> bool {
    text.chars().all(|c| {
        (c.is_alphanumeric() && is_latin_char(c))
            || c.is_whitespace()
            || LATIN_PUNCTUATION.contains(c)
    })
}

/// Basic Latin, Latin-1 Supplement, Latin Extended-A/B and Latin Extended Additional
fn is_latin_char(c: char) -> bool {
    matches!(c as u32, 0x0000..=0x024F | 0x1E00..=0x1EFF)
}
