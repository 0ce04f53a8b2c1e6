//! Bilingual agricultural term glossary.
//!
//! Used in two directions: retrieved English text is annotated with the
//! Gujarati term in brackets, and regional queries are rewritten to English
//! terms before classification and decomposition.

use agrinet_core::{AppError, AppResult};
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One glossary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPair {
    pub en: String,
    #[serde(default)]
    pub gu: String,
    #[serde(default)]
    pub transliteration: String,
    /// Older glossary files carry the regional term under `mr`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mr: String,
}

impl TermPair {
    pub fn new(en: &str, gu: &str, transliteration: &str) -> Self {
        Self {
            en: en.to_string(),
            gu: gu.to_string(),
            transliteration: transliteration.to_string(),
            mr: String::new(),
        }
    }
}

const BUILTIN_TERMS: &[(&str, &str, &str)] = &[
    ("cotton", "કપાસ", "kapas"),
    ("groundnut", "મગફળી", "magfali"),
    ("wheat", "ઘઉં", "ghau"),
    ("cumin", "જીરું", "jiru"),
    ("castor", "એરંડા", "eranda"),
    ("bajra", "બાજરી", "bajri"),
    ("paddy", "ડાંગર", "dangar"),
    ("maize", "મકાઈ", "makai"),
    ("tomato", "ટામેટા", "tameta"),
    ("onion", "ડુંગળી", "dungli"),
    ("cow", "ગાય", "gaay"),
    ("buffalo", "ભેંસ", "bhens"),
    ("goat", "બકરી", "bakri"),
    ("milk", "દૂધ", "dudh"),
    ("mastitis", "આઉનો સોજો", "aauno sojo"),
    ("pest", "જીવાત", "jivat"),
    ("pink bollworm", "ગુલાબી ઇયળ", "gulabi iyal"),
    ("whitefly", "સફેદ માખી", "safed makhi"),
    ("aphids", "મોલો મશી", "molo mashi"),
    ("wilt", "સુકારો", "sukaro"),
    ("fertilizer", "ખાતર", "khatar"),
    ("urea", "યુરિયા", "yuriya"),
    ("irrigation", "પિયત", "piyat"),
    ("seed", "બિયારણ", "biyaran"),
    ("sowing", "વાવણી", "vavani"),
    ("harvest", "કાપણી", "kapani"),
    ("disease", "રોગ", "rog"),
    ("weed", "નીંદણ", "nindan"),
    ("fodder", "ઘાસચારો", "ghaschara"),
    ("insecticide", "જંતુનાશક", "jantunashak"),
    ("treatment", "સારવાર", "sarvar"),
    ("prevention", "નિવારણ", "nivaran"),
    ("farmer", "ખેડૂત", "khedut"),
    ("soil", "જમીન", "jamin"),
];

/// Term lookup with precompiled matchers for each direction.
#[derive(Debug, Clone)]
pub struct Glossary {
    terms: Vec<TermPair>,
    by_en: HashMap<String, usize>,
    by_regional: HashMap<String, usize>,
    english: Option<Regex>,
    regional: Option<Regex>,
    transliterated: Option<Regex>,
}

impl Glossary {
    pub fn new(terms: Vec<TermPair>) -> AppResult<Self> {
        let terms: Vec<TermPair> = terms
            .into_iter()
            .map(|mut pair| {
                if pair.gu.is_empty() && !pair.mr.is_empty() {
                    pair.gu = std::mem::take(&mut pair.mr);
                }
                pair
            })
            .filter(|pair| !pair.en.trim().is_empty())
            .collect();

        let mut by_en = HashMap::new();
        let mut by_regional = HashMap::new();
        for (i, pair) in terms.iter().enumerate() {
            by_en.entry(pair.en.to_lowercase()).or_insert(i);
            if !pair.gu.is_empty() {
                by_regional.entry(pair.gu.clone()).or_insert(i);
            }
            if !pair.transliteration.is_empty() {
                by_regional
                    .entry(pair.transliteration.to_lowercase())
                    .or_insert(i);
            }
        }

        let english = alternation(terms.iter().map(|p| p.en.as_str()), true)?;
        let regional = alternation(terms.iter().map(|p| p.gu.as_str()), false)?;
        let transliterated = alternation(terms.iter().map(|p| p.transliteration.as_str()), true)?;

        Ok(Self {
            terms,
            by_en,
            by_regional,
            english,
            regional,
            transliterated,
        })
    }

    /// Load term pairs from a JSON array file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read glossary {:?}: {}", path, e))
        })?;
        let terms: Vec<TermPair> = serde_json::from_str(&contents)?;
        tracing::info!("Loaded {} glossary terms from {:?}", terms.len(), path);
        Self::new(terms)
    }

    /// The glossary compiled into the binary.
    pub fn builtin() -> Self {
        let terms = BUILTIN_TERMS
            .iter()
            .map(|(en, gu, tr)| TermPair::new(en, gu, tr))
            .collect();
        Self::new(terms).unwrap_or_else(|e| {
            tracing::error!("Built-in glossary failed to compile: {}", e);
            Self::empty()
        })
    }

    pub fn empty() -> Self {
        Self {
            terms: Vec::new(),
            by_en: HashMap::new(),
            by_regional: HashMap::new(),
            english: None,
            regional: None,
            transliterated: None,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Exact lookup by English, Gujarati or transliterated form.
    pub fn lookup(&self, term: &str) -> Option<&TermPair> {
        let term = term.trim();
        self.by_en
            .get(&term.to_lowercase())
            .or_else(|| self.by_regional.get(term))
            .or_else(|| self.by_regional.get(&term.to_lowercase()))
            .map(|&i| &self.terms[i])
    }

    /// Append `[gu]` after every English glossary term in `text`.
    pub fn annotate(&self, text: &str) -> String {
        let Some(pattern) = &self.english else {
            return text.to_string();
        };

        pattern
            .replace_all(text, |caps: &Captures| {
                let Some(m) = caps.get(0) else {
                    return String::new();
                };
                let word = m.as_str();
                let regional = self
                    .by_en
                    .get(&word.to_lowercase())
                    .map(|&i| self.terms[i].gu.as_str())
                    .unwrap_or_default();
                if regional.is_empty() {
                    return word.to_string();
                }
                let next_is_alnum = text[m.end()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric);
                if next_is_alnum {
                    format!("{} [{}] ", word, regional)
                } else {
                    format!("{} [{}]", word, regional)
                }
            })
            .into_owned()
    }

    /// Rewrite Gujarati and transliterated terms in `text` to their English form.
    pub fn canonicalize(&self, text: &str) -> String {
        let mut out = text.to_string();

        // Gujarati attaches postpositions to nouns, so no word boundary here.
        if let Some(pattern) = &self.regional {
            out = pattern
                .replace_all(&out, |caps: &Captures| self.english_for(&caps[0], " "))
                .into_owned();
        }

        if let Some(pattern) = &self.transliterated {
            out = pattern
                .replace_all(&out, |caps: &Captures| self.english_for(&caps[0], ""))
                .into_owned();
        }

        out
    }

    fn english_for(&self, regional: &str, pad: &str) -> String {
        match self
            .by_regional
            .get(regional)
            .or_else(|| self.by_regional.get(&regional.to_lowercase()))
        {
            Some(&i) => format!("{pad}{}{pad}", self.terms[i].en),
            None => regional.to_string(),
        }
    }
}

/// Case-insensitive alternation over `terms`, longest first.
fn alternation<'a>(
    terms: impl Iterator<Item = &'a str>,
    word_bounded: bool,
) -> AppResult<Option<Regex>> {
    let mut terms: Vec<&str> = terms.map(str::trim).filter(|t| !t.is_empty()).collect();
    if terms.is_empty() {
        return Ok(None);
    }
    terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    terms.dedup();

    let body = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = if word_bounded {
        format!(r"\b(?:{})\b", body)
    } else {
        format!("(?:{})", body)
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| AppError::Config(format!("Invalid glossary pattern: {}", e)))
}
