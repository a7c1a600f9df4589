//! Language and script definitions
//!
//! Covers the Indic languages the transliteration backends accept, plus
//! English as the romanized source side.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Languages known to the transliteration backends
///
/// Serialized as the ISO code; deserialization accepts anything
/// [`Language::from_str_loose`] does ("gu", "guj", "Gujarati").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    English,
    #[default]
    Gujarati,
    Hindi,
    Marathi,
    Bengali,
    Punjabi,
    Odia,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
}

impl Language {
    /// ISO 639-1 code, as used by IndicXlit and the xlit API
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Gujarati => "gu",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
            Self::Bengali => "bn",
            Self::Punjabi => "pa",
            Self::Odia => "or",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Gujarati => "Gujarati",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
            Self::Bengali => "Bengali",
            Self::Punjabi => "Punjabi",
            Self::Odia => "Odia",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
        }
    }

    /// Native script of this language
    pub fn script(&self) -> Script {
        match self {
            Self::English => Script::Latin,
            Self::Gujarati => Script::Gujarati,
            Self::Hindi | Self::Marathi => Script::Devanagari,
            Self::Bengali => Script::Bengali,
            Self::Punjabi => Script::Gurmukhi,
            Self::Odia => Script::Odia,
            Self::Tamil => Script::Tamil,
            Self::Telugu => Script::Telugu,
            Self::Kannada => Script::Kannada,
            Self::Malayalam => Script::Malayalam,
        }
    }

    /// Input Tools code for Latin → native transliteration (e.g. `gu-t-i0-und`)
    pub fn input_tools_code(&self) -> Option<String> {
        match self {
            Self::English => None,
            other => Some(format!("{}-t-i0-und", other.code())),
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "en" | "eng" | "english" => Some(Self::English),
            "gu" | "guj" | "gujarati" => Some(Self::Gujarati),
            "hi" | "hin" | "hindi" => Some(Self::Hindi),
            "mr" | "mar" | "marathi" => Some(Self::Marathi),
            "bn" | "ben" | "bengali" | "bangla" => Some(Self::Bengali),
            "pa" | "pan" | "punjabi" | "panjabi" => Some(Self::Punjabi),
            "or" | "ori" | "odia" | "oriya" => Some(Self::Odia),
            "ta" | "tam" | "tamil" => Some(Self::Tamil),
            "te" | "tel" | "telugu" => Some(Self::Telugu),
            "kn" | "kan" | "kannada" => Some(Self::Kannada),
            "ml" | "mal" | "malayalam" => Some(Self::Malayalam),
            _ => None,
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Self::English,
            Self::Gujarati,
            Self::Hindi,
            Self::Marathi,
            Self::Bengali,
            Self::Punjabi,
            Self::Odia,
            Self::Tamil,
            Self::Telugu,
            Self::Kannada,
            Self::Malayalam,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s)
            .ok_or_else(|| crate::Error::Configuration(format!("unknown language '{}'", s)))
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str_loose(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown language '{}'", s)))
    }
}

/// Writing systems of the supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Odia,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
}

impl Script {
    /// Unicode block of this script (first block only)
    pub fn unicode_range(&self) -> (u32, u32) {
        match self {
            Self::Latin => (0x0000, 0x007F),
            Self::Devanagari => (0x0900, 0x097F),
            Self::Bengali => (0x0980, 0x09FF),
            Self::Gurmukhi => (0x0A00, 0x0A7F),
            Self::Gujarati => (0x0A80, 0x0AFF),
            Self::Odia => (0x0B00, 0x0B7F),
            Self::Tamil => (0x0B80, 0x0BFF),
            Self::Telugu => (0x0C00, 0x0C7F),
            Self::Kannada => (0x0C80, 0x0CFF),
            Self::Malayalam => (0x0D00, 0x0D7F),
        }
    }

    /// Check if a character belongs to this script
    pub fn contains_char(&self, c: char) -> bool {
        let code = c as u32;
        let (start, end) = self.unicode_range();
        code >= start && code <= end
    }

    /// Detect the most frequent script in `text`, ignoring whitespace
    pub fn detect(text: &str) -> Option<Self> {
        let mut counts = std::collections::HashMap::new();

        for c in text.chars().filter(|c| !c.is_whitespace()) {
            for script in &[
                Self::Devanagari,
                Self::Bengali,
                Self::Gurmukhi,
                Self::Gujarati,
                Self::Odia,
                Self::Tamil,
                Self::Telugu,
                Self::Kannada,
                Self::Malayalam,
                Self::Latin,
            ] {
                if script.contains_char(c) {
                    *counts.entry(*script).or_insert(0usize) += 1;
                    break;
                }
            }
        }

        counts.into_iter().max_by_key(|(_, v)| *v).map(|(k, _)| k)
    }
}

/// True if any character of `text` falls in the block of `script`
pub fn contains_script(text: &str, script: Script) -> bool {
    text.chars().any(|c| script.contains_char(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code() {
        assert_eq!(Language::Gujarati.code(), "gu");
        assert_eq!(Language::Hindi.code(), "hi");
        assert_eq!(Language::default(), Language::Gujarati);
    }

    #[test]
    fn test_input_tools_code() {
        assert_eq!(
            Language::Gujarati.input_tools_code().as_deref(),
            Some("gu-t-i0-und")
        );
        assert!(Language::English.input_tools_code().is_none());
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str_loose("gu"), Some(Language::Gujarati));
        assert_eq!(Language::from_str_loose(" Gujarati "), Some(Language::Gujarati));
        assert_eq!(Language::from_str_loose("bangla"), Some(Language::Bengali));
        assert_eq!(Language::from_str_loose("klingon"), None);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn test_script_detect() {
        assert_eq!(Script::detect("kem cho"), Some(Script::Latin));
        assert_eq!(Script::detect("કેમ છો"), Some(Script::Gujarati));
        assert_eq!(Script::detect("नमस्ते"), Some(Script::Devanagari));
        assert_eq!(Script::detect("   "), None);
    }

    #[test]
    fn test_contains_script() {
        assert!(contains_script("hello કેમ", Script::Gujarati));
        assert!(!contains_script("hello", Script::Gujarati));
        // U+0A80 and U+0AFF are both inside the block
        assert!(contains_script("\u{0A80}", Script::Gujarati));
        assert!(contains_script("\u{0AFF}", Script::Gujarati));
        assert!(!contains_script("\u{0B00}", Script::Gujarati));
    }

    #[test]
    fn test_language_serde_accepts_codes_and_names() {
        let code: Language = serde_json::from_str(r#""gu""#).unwrap();
        let name: Language = serde_json::from_str(r#""Gujarati""#).unwrap();
        assert_eq!(code, Language::Gujarati);
        assert_eq!(name, Language::Gujarati);
        assert!(serde_json::from_str::<Language>(r#""xx""#).is_err());

        assert_eq!(serde_json::to_string(&Language::Hindi).unwrap(), r#""hi""#);
    }

    #[test]
    fn test_all_languages() {
        assert_eq!(Language::all().len(), 11);
        for lang in Language::all() {
            assert_eq!(Language::from_str_loose(lang.code()), Some(*lang));
        }
    }
}
