//! Query classification.
//!
//! Decides whether a query is answered or declined. Rules run in a fixed
//! priority order and the first match wins; anything no rule claims is
//! treated as an agricultural question.

mod lexicon;

use crate::glossary::Glossary;
use crate::query::{display_name, tokenize, Query};
use crate::state::ConversationTurn;
use crate::vocab;
use agrinet_core::AdvisorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Closed set of query categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ValidAgricultural,
    InvalidNonAgricultural,
    InvalidExternalReference,
    InvalidCompoundMixed,
    InvalidLanguage,
    CulturalSensitive,
    UnsafeIllegal,
    PoliticalControversial,
    RoleObfuscation,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::ValidAgricultural,
        Self::InvalidNonAgricultural,
        Self::InvalidExternalReference,
        Self::InvalidCompoundMixed,
        Self::InvalidLanguage,
        Self::CulturalSensitive,
        Self::UnsafeIllegal,
        Self::PoliticalControversial,
        Self::RoleObfuscation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidAgricultural => "valid_agricultural",
            Self::InvalidNonAgricultural => "invalid_non_agricultural",
            Self::InvalidExternalReference => "invalid_external_reference",
            Self::InvalidCompoundMixed => "invalid_compound_mixed",
            Self::InvalidLanguage => "invalid_language",
            Self::CulturalSensitive => "cultural_sensitive",
            Self::UnsafeIllegal => "unsafe_illegal",
            Self::PoliticalControversial => "political_controversial",
            Self::RoleObfuscation => "role_obfuscation",
        }
    }

    /// Decline template for this category. `None` only for agricultural queries.
    pub fn decline_template(&self) -> Option<DeclineTemplate> {
        match self {
            Self::ValidAgricultural => None,
            Self::InvalidNonAgricultural => Some(DeclineTemplate::NonAgricultural),
            Self::InvalidExternalReference => Some(DeclineTemplate::ExternalReference),
            Self::InvalidCompoundMixed => Some(DeclineTemplate::CompoundMixed),
            Self::InvalidLanguage => Some(DeclineTemplate::UnsupportedLanguage),
            Self::CulturalSensitive => Some(DeclineTemplate::CulturalSensitive),
            Self::UnsafeIllegal => Some(DeclineTemplate::UnsafeIllegal),
            Self::PoliticalControversial => Some(DeclineTemplate::Political),
            Self::RoleObfuscation => Some(DeclineTemplate::RoleOverride),
        }
    }

    pub fn action(&self) -> Action {
        match self.decline_template() {
            None => Action::Proceed,
            Some(template) => Action::Decline(template),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the fixed message shown for a declined query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineTemplate {
    NonAgricultural,
    ExternalReference,
    CompoundMixed,
    UnsupportedLanguage,
    CulturalSensitive,
    UnsafeIllegal,
    Political,
    RoleOverride,
}

impl DeclineTemplate {
    /// Message id understood by `agrinet_prompt::decline_message`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::NonAgricultural => "decline.non_agricultural",
            Self::ExternalReference => "decline.external_reference",
            Self::CompoundMixed => "decline.compound_mixed",
            Self::UnsupportedLanguage => "decline.unsupported_language",
            Self::CulturalSensitive => "decline.cultural_sensitive",
            Self::UnsafeIllegal => "decline.unsafe_illegal",
            Self::Political => "decline.political",
            Self::RoleOverride => "decline.role_override",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "template")]
pub enum Action {
    Proceed,
    Decline(DeclineTemplate),
}

/// Result of classifying one query. The action always follows from the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    category: Category,
    action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_from: Option<u64>,
}

impl Classification {
    /// A rule matched.
    pub fn matched(category: Category, rationale: impl Into<String>) -> Self {
        Self::build(category, 0.9, rationale.into(), None)
    }

    /// A short reply took the category of the turn at `position`.
    pub fn inherited(position: u64, rationale: impl Into<String>) -> Self {
        Self::build(Category::ValidAgricultural, 0.8, rationale.into(), Some(position))
    }

    /// No rule matched.
    pub fn fallback() -> Self {
        Self::build(
            Category::ValidAgricultural,
            0.5,
            "no rule matched".to_string(),
            None,
        )
    }

    fn build(category: Category, confidence: f32, rationale: String, resolved_from: Option<u64>) -> Self {
        Self {
            category,
            action: category.action(),
            confidence: Some(confidence),
            rationale: Some(rationale),
            resolved_from,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }

    pub fn resolved_from(&self) -> Option<u64> {
        self.resolved_from
    }

    pub fn is_proceed(&self) -> bool {
        self.action == Action::Proceed
    }

    pub fn decline_template(&self) -> Option<DeclineTemplate> {
        match self.action {
            Action::Proceed => None,
            Action::Decline(template) => Some(template),
        }
    }
}

/// Words of a query in two forms: as typed, and with regional glossary
/// terms rewritten to English.
struct Signals {
    raw: Vec<String>,
    canonical: Vec<String>,
}

impl Signals {
    fn mentions(&self, entry: &str) -> bool {
        mentions(&self.raw, entry) || mentions(&self.canonical, entry)
    }

    fn first<'a>(&self, entries: &[&'a str]) -> Option<&'a str> {
        entries.iter().copied().find(|e| self.mentions(e))
    }

    fn count(&self, entries: &[&str]) -> usize {
        entries.iter().filter(|e| self.mentions(e)).count()
    }

    fn count_subjects(&self) -> usize {
        vocab::SUBJECTS
            .iter()
            .filter(|s| s.forms.iter().any(|f| self.mentions(f)))
            .count()
    }

    fn count_concepts(&self) -> usize {
        vocab::CONCEPTS
            .iter()
            .filter(|c| {
                std::iter::once(c.name)
                    .chain(c.lay_terms.iter().copied())
                    .any(|term| self.mentions(term))
            })
            .count()
    }
}

fn singular(token: &str) -> &str {
    match token.strip_suffix('s') {
        Some(stem) if stem.chars().count() >= 3 && !stem.ends_with('s') => stem,
        _ => token,
    }
}

fn mentions(tokens: &[String], entry: &str) -> bool {
    if entry.contains(' ') {
        vocab::contains_phrase(tokens, entry)
    } else {
        tokens.iter().any(|t| t == entry || singular(t) == entry)
    }
}

/// Rule-based classifier over static lexicons.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    glossary: Arc<Glossary>,
    supported_language_names: Vec<String>,
}

impl RuleClassifier {
    pub fn new(config: &AdvisorConfig, glossary: Arc<Glossary>) -> Self {
        let supported_language_names = config
            .supported_languages()
            .iter()
            .map(|tag| display_name(tag).to_lowercase())
            .collect();
        Self {
            glossary,
            supported_language_names,
        }
    }

    /// Classify `query` given the recent turns of its session, oldest first.
    pub fn classify(&self, query: &Query, history: &[ConversationTurn]) -> Classification {
        let signals = Signals {
            raw: query.tokens(),
            canonical: tokenize(&self.glossary.canonicalize(query.text())),
        };

        let classification = self.apply_rules(&signals, history);
        tracing::debug!(
            category = classification.category().as_str(),
            rationale = classification.rationale().unwrap_or_default(),
            "Classified query"
        );
        classification
    }

    fn apply_rules(&self, signals: &Signals, history: &[ConversationTurn]) -> Classification {
        if let Some(inherited) = self.short_reply(signals, history) {
            return inherited;
        }

        if let Some(language) = self.unsupported_language(&signals.raw) {
            return Classification::matched(
                Category::InvalidLanguage,
                format!("asked for a reply in {}", language),
            );
        }

        if let Some(phrase) = signals.first(lexicon::ROLE_OVERRIDE) {
            return Classification::matched(
                Category::RoleObfuscation,
                format!("role override phrase '{}'", phrase),
            );
        }

        if let Some(term) = self.political(signals) {
            return Classification::matched(
                Category::PoliticalControversial,
                format!("political endorsement about '{}'", term),
            );
        }

        if let Some(term) = signals.first(lexicon::UNSAFE_ILLEGAL) {
            return Classification::matched(
                Category::UnsafeIllegal,
                format!("banned or illegal practice '{}'", term),
            );
        }

        if let Some(term) = signals.first(lexicon::CULTURAL_SENSITIVE) {
            return Classification::matched(
                Category::CulturalSensitive,
                format!("cultural or religious term '{}'", term),
            );
        }

        let agri = signals.count(lexicon::AGRI_TERMS)
            + signals.count_subjects()
            + signals.count_concepts();
        let non_agri = signals.count(lexicon::NON_AGRI_TERMS);

        if agri > 0 && non_agri > agri {
            return Classification::matched(
                Category::InvalidCompoundMixed,
                format!("{} non-agricultural terms outweigh {} agricultural", non_agri, agri),
            );
        }

        if let Some(cue) = signals.first(lexicon::MEDIA_CUES) {
            return Classification::matched(
                Category::InvalidExternalReference,
                format!("grounded in media '{}'", cue),
            );
        }

        if agri == 0 && non_agri > 0 {
            return Classification::matched(
                Category::InvalidNonAgricultural,
                format!("{} non-agricultural terms and no farming link", non_agri),
            );
        }

        Classification::fallback()
    }

    fn short_reply(&self, signals: &Signals, history: &[ConversationTurn]) -> Option<Classification> {
        let tokens = &signals.raw;
        if tokens.is_empty() || tokens.len() > 3 {
            return None;
        }
        let reply = tokens.join(" ");
        if !lexicon::SHORT_REPLIES.contains(&reply.as_str()) {
            return None;
        }

        let anchor = history
            .iter()
            .rev()
            .find(|turn| turn.classification.category() == Category::ValidAgricultural)?;

        Some(Classification::inherited(
            anchor.position,
            format!("short reply '{}' continues turn {}", reply, anchor.position),
        ))
    }

    fn unsupported_language<'a>(&self, tokens: &'a [String]) -> Option<&'a str> {
        tokens.iter().enumerate().find_map(|(i, token)| {
            let token = token.as_str();
            if !lexicon::LANGUAGE_NAMES.contains(&token)
                || self.supported_language_names.iter().any(|s| s == token)
            {
                return None;
            }

            let next = tokens.get(i + 1).map(String::as_str);
            if next.is_some_and(|n| lexicon::LANGUAGE_PLACE_SUFFIXES.contains(&n)) {
                return None;
            }

            let led = i > 0 && lexicon::LANGUAGE_LEADS.contains(&tokens[i - 1].as_str());
            let followed = next.is_some_and(|n| lexicon::LANGUAGE_FOLLOWERS.contains(&n));
            (led || followed).then_some(token)
        })
    }

    fn political(&self, signals: &Signals) -> Option<&'static str> {
        if signals.first(lexicon::POLITICAL_EXCLUSIONS).is_some() {
            return None;
        }
        let term = signals.first(lexicon::POLITICAL_TERMS)?;
        signals.first(lexicon::ENDORSEMENT_CUES).map(|_| term)
    }
}
