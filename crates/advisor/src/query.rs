//! The user query as received by the orchestrator.

use agrinet_core::config::CANONICAL_LANGUAGE;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Language the farmer asked to be answered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLanguage {
    English,
    Regional,
}

impl ResponseLanguage {
    /// Parse a language tag against the configured regional tag.
    pub fn from_tag(tag: &str, regional_tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case(CANONICAL_LANGUAGE) || tag.eq_ignore_ascii_case("english") {
            Some(Self::English)
        } else if tag.eq_ignore_ascii_case(regional_tag)
            || tag.eq_ignore_ascii_case(display_name(regional_tag))
        {
            Some(Self::Regional)
        } else {
            None
        }
    }

    /// The language tag this variant stands for.
    pub fn tag<'a>(&self, regional_tag: &'a str) -> &'a str {
        match self {
            Self::English => CANONICAL_LANGUAGE,
            Self::Regional => regional_tag,
        }
    }
}

/// Human-readable name for a language tag.
pub fn display_name(tag: &str) -> &str {
    match tag.to_ascii_lowercase().as_str() {
        "en" => "English",
        "gu" => "Gujarati",
        "hi" => "Hindi",
        "mr" => "Marathi",
        _ => tag,
    }
}

/// Guess a language tag from the script used.
pub fn detect_language(text: &str) -> &'static str {
    let mut gujarati = 0usize;
    let mut devanagari = 0usize;
    let mut latin = 0usize;

    for c in text.chars() {
        match c {
            '\u{0A80}'..='\u{0AFF}' => gujarati += 1,
            '\u{0900}'..='\u{097F}' => devanagari += 1,
            c if c.is_ascii_alphabetic() => latin += 1,
            _ => {}
        }
    }

    if gujarati > 0 && gujarati >= devanagari && gujarati >= latin {
        "gu"
    } else if devanagari > 0 && devanagari >= latin {
        "hi"
    } else {
        CANONICAL_LANGUAGE
    }
}

/// Lowercased words of `text`, punctuation removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// A single farmer question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    text: String,
    language_tag: String,
    response_language: ResponseLanguage,
}

impl Query {
    /// Build a query, detecting its language from the script.
    pub fn new(text: impl Into<String>, response_language: ResponseLanguage) -> Self {
        let text = text.into().trim().to_string();
        let language_tag = detect_language(&text).to_string();
        Self {
            text,
            language_tag,
            response_language,
        }
    }

    /// Build a query whose language the caller already knows.
    pub fn with_declared_language(
        text: impl Into<String>,
        language_tag: impl Into<String>,
        response_language: ResponseLanguage,
    ) -> Self {
        Self {
            text: text.into().trim().to_string(),
            language_tag: language_tag.into(),
            response_language,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language_tag(&self) -> &str {
        &self.language_tag
    }

    pub fn response_language(&self) -> ResponseLanguage {
        self.response_language
    }

    pub fn tokens(&self) -> Vec<String> {
        tokenize(&self.text)
    }

    pub fn is_canonical_language(&self) -> bool {
        self.language_tag.eq_ignore_ascii_case(CANONICAL_LANGUAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_gujarati_script() {
        let query = Query::new("કપાસમાં ગુલાબી ઇયળ", ResponseLanguage::Regional);
        assert_eq!(query.language_tag(), "gu");
        assert!(!query.is_canonical_language());
    }

    #[test]
    fn test_detects_english_by_default() {
        assert_eq!(detect_language("How to treat mastitis in cows?"), "en");
        assert_eq!(detect_language("1234 ?!"), "en");
        assert_eq!(detect_language("गाय का दूध"), "hi");
    }

    #[test]
    fn test_declared_language_wins() {
        let query = Query::with_declared_language("kapas ma jivat", "gu", ResponseLanguage::Regional);
        assert_eq!(query.language_tag(), "gu");
    }

    #[test]
    fn test_tokenize_strips_punctuation_and_case() {
        assert_eq!(
            tokenize("How to treat Mastitis in cows?"),
            vec!["how", "to", "treat", "mastitis", "in", "cows"]
        );
    }

    #[test]
    fn test_response_language_tags() {
        assert_eq!(ResponseLanguage::from_tag("GU", "gu"), Some(ResponseLanguage::Regional));
        assert_eq!(ResponseLanguage::from_tag("gujarati", "gu"), Some(ResponseLanguage::Regional));
        assert_eq!(ResponseLanguage::from_tag("en", "gu"), Some(ResponseLanguage::English));
        assert_eq!(ResponseLanguage::from_tag("ta", "gu"), None);
        assert_eq!(ResponseLanguage::Regional.tag("gu"), "gu");
        assert_eq!(ResponseLanguage::English.tag("gu"), "en");
    }

    #[test]
    fn test_query_text_is_trimmed() {
        let query = Query::new("  yes  ", ResponseLanguage::English);
        assert_eq!(query.text(), "yes");
        assert_eq!(query.tokens(), vec!["yes"]);
    }
}
