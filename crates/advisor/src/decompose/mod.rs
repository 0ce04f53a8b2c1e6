//! Query decomposition into targeted English search phrases.
//!
//! Each topic clause of a query becomes a cluster of 2 to 5 short phrases:
//! the technical term with the farmer's subject, the lay wording, and a
//! related angle. Output depends only on the input text.

mod clauses;

pub use clauses::{content_tokens, split_clauses};

use crate::classifier::Classification;
use crate::glossary::Glossary;
use crate::query::Query;
use crate::state::ConversationTurn;
use crate::vocab::{self, Concept, ConceptKind, Intent, Subject, SubjectKind};
use agrinet_core::AdvisorConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const MIN_TOKENS: usize = 2;
const MAX_TOKENS: usize = 5;
const PAD_TOKEN: &str = "farming";

/// One search call to issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSubQuery {
    pub text: String,
    pub intent: Intent,
    /// Topic cluster the phrase was built for, in clause order.
    pub cluster: usize,
}

#[derive(Debug, Clone)]
pub struct QueryDecomposer {
    glossary: Arc<Glossary>,
    max_per_cluster: usize,
}

impl QueryDecomposer {
    pub fn new(config: &AdvisorConfig, glossary: Arc<Glossary>) -> Self {
        Self {
            glossary,
            max_per_cluster: config.max_sub_queries_per_cluster.clamp(2, 5),
        }
    }

    /// Text to decompose for this turn.
    ///
    /// A short reply resolved against an earlier turn reuses that turn's
    /// basis, so "tell me more" searches the original topic.
    pub fn resolve_basis(
        &self,
        query: &Query,
        classification: &Classification,
        history: &[ConversationTurn],
    ) -> String {
        classification
            .resolved_from()
            .and_then(|position| history.iter().find(|t| t.position == position))
            .map(|turn| turn.search_basis.clone())
            .unwrap_or_else(|| query.text().to_string())
    }

    /// Build the ordered, non-empty sub-query list for `basis`.
    pub fn decompose(&self, basis: &str) -> Vec<SearchSubQuery> {
        let canonical = self.glossary.canonicalize(basis);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut cluster = 0;

        for clause in split_clauses(&canonical) {
            for candidates in clusters_for(&clause) {
                let mut taken = 0;
                for (text, intent) in candidates {
                    if taken == self.max_per_cluster {
                        break;
                    }
                    let Some(text) = normalize(&text) else {
                        continue;
                    };
                    if seen.insert(text.clone()) {
                        out.push(SearchSubQuery { text, intent, cluster });
                        taken += 1;
                    }
                }
                if taken > 0 {
                    cluster += 1;
                }
            }
        }

        if out.is_empty() {
            out.push(fallback(&canonical));
        }

        tracing::debug!(
            "Decomposed into {} sub-queries across {} clusters",
            out.len(),
            cluster.max(1)
        );
        out
    }
}

type Candidates = Vec<(String, Intent)>;

/// Candidate phrases for each topic in a clause, best first.
fn clusters_for(clause: &[String]) -> Vec<Candidates> {
    let intent = vocab::find_intent(clause);
    let subject = vocab::find_subject(clause);
    let location = vocab::find_location(clause);
    let concepts = vocab::find_concepts(clause);

    if concepts.is_empty() {
        return vec![subject_cluster(clause, intent, subject, location)];
    }

    concepts
        .into_iter()
        .map(|concept| concept_cluster(concept, intent, subject, location))
        .collect()
}

fn concept_cluster(
    concept: &Concept,
    intent: Intent,
    subject: Option<(&Subject, &str)>,
    location: Option<&str>,
) -> Candidates {
    let mut candidates = Vec::new();

    candidates.push((
        join([
            Some(concept.name),
            concept_keyword(intent, concept.kind),
            subject.map(|(_, form)| form),
            location,
        ]),
        intent,
    ));

    for lay in concept.lay_terms {
        candidates.push((
            join([subject.map(|(s, _)| s.singular), Some(*lay), None, None]),
            intent,
        ));
    }

    let (related, related_intent) = if intent == Intent::Prevention {
        (concept_keyword(Intent::Treatment, concept.kind), Intent::Treatment)
    } else {
        (Some("prevention"), Intent::Prevention)
    };
    candidates.push((
        join([Some(concept.name), related, subject.map(|(s, _)| s.singular), None]),
        related_intent,
    ));

    candidates
}

fn subject_cluster(
    clause: &[String],
    intent: Intent,
    subject: Option<(&Subject, &str)>,
    location: Option<&str>,
) -> Candidates {
    let words = content_tokens(clause);
    let keywords = words.join(" ");
    let mut candidates = Vec::new();

    match subject {
        Some((subject, form)) => {
            let (primary, secondary) = intent_keywords(intent, subject.kind);
            candidates.push((join([Some(form), Some(primary), location, None]), intent));
            candidates.push((join([Some(subject.singular), Some(secondary), None, None]), intent));
            candidates.push((keywords, intent));
        }
        None if words.is_empty() => {}
        None => {
            // Leave room for the intent keyword inside the token window.
            let head = words[..words.len().min(MAX_TOKENS - 2)].join(" ");
            let (primary, _) = intent_keywords(intent, SubjectKind::Crop);
            candidates.push((keywords, intent));
            candidates.push((format!("{} {}", head, primary), intent));
        }
    }

    candidates
}

/// Keyword appended to a technical term for the given intent.
fn concept_keyword(intent: Intent, kind: ConceptKind) -> Option<&'static str> {
    let controllable = matches!(kind, ConceptKind::Pest | ConceptKind::Weed);
    match intent {
        Intent::Treatment | Intent::Pest if controllable => Some("control"),
        Intent::Treatment | Intent::Pest => Some("treatment"),
        Intent::Symptom => Some("symptoms"),
        Intent::Prevention => Some("prevention"),
        Intent::General => None,
        other => Some(intent_keywords(other, SubjectKind::Crop).0),
    }
}

/// Two phrasings of an intent for use next to a crop or animal.
fn intent_keywords(intent: Intent, kind: SubjectKind) -> (&'static str, &'static str) {
    match intent {
        Intent::Symptom => ("symptoms", "causes"),
        Intent::Treatment => ("treatment", "management"),
        Intent::Prevention => ("prevention", "care"),
        Intent::Cultivation => ("cultivation", "sowing time"),
        Intent::Nutrition if kind == SubjectKind::Livestock => ("feed", "nutrition"),
        Intent::Nutrition => ("fertilizer", "nutrient management"),
        Intent::Pest => ("pest control", "insect pests"),
        Intent::Irrigation => ("irrigation", "water management"),
        Intent::Variety => ("varieties", "improved seed"),
        Intent::Market => ("market price", "mandi rate"),
        Intent::Scheme => ("scheme", "subsidy"),
        Intent::General if kind == SubjectKind::Livestock => ("care", "health management"),
        Intent::General => ("cultivation", "crop management"),
    }
}

fn join<const N: usize>(parts: [Option<&str>; N]) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

/// Lowercase, trim to the token window, pad short phrases.
fn normalize(text: &str) -> Option<String> {
    let mut tokens: Vec<String> = text
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| t.is_ascii())
        .take(MAX_TOKENS)
        .collect();
    if tokens.is_empty() {
        return None;
    }
    if tokens.len() < MIN_TOKENS && tokens[0] != PAD_TOKEN {
        tokens.push(PAD_TOKEN.to_string());
    }
    if tokens.len() < MIN_TOKENS {
        return None;
    }
    Some(tokens.join(" "))
}

fn fallback(canonical: &str) -> SearchSubQuery {
    let tokens = crate::query::tokenize(canonical);
    let text = normalize(&content_tokens(&tokens).join(" "))
        .unwrap_or_else(|| format!("{} advisory", PAD_TOKEN));
    SearchSubQuery {
        text,
        intent: Intent::General,
        cluster: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;
    use crate::query::ResponseLanguage;

    fn decomposer() -> QueryDecomposer {
        QueryDecomposer::new(&AdvisorConfig::default(), Arc::new(Glossary::builtin()))
    }

    fn texts(subs: &[SearchSubQuery]) -> Vec<&str> {
        subs.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_mastitis_query_has_technical_and_lay_phrasing() {
        let subs = decomposer().decompose("How to treat mastitis in cows?");
        let texts = texts(&subs);
        assert_eq!(texts[0], "mastitis treatment cows");
        assert!(texts.contains(&"cow udder infection"));
        assert!(subs.iter().all(|s| s.cluster == 0));
        assert_eq!(subs[0].intent, Intent::Treatment);
    }

    #[test]
    fn test_sub_query_shape() {
        let config = AdvisorConfig::default();
        for basis in [
            "How to treat mastitis in cows?",
            "When to sow cotton in Rajkot and which fertilizer for wheat",
            "pink bollworm",
            "hello",
            "foot and mouth disease treatment in buffaloes",
        ] {
            let subs = decomposer().decompose(basis);
            assert!(!subs.is_empty(), "{}", basis);
            for sub in &subs {
                let n = sub.text.split_whitespace().count();
                assert!((2..=5).contains(&n), "{:?} from {}", sub.text, basis);
                assert!(sub.text.is_ascii());
            }
            for cluster in 0..=subs.iter().map(|s| s.cluster).max().unwrap_or(0) {
                let size = subs.iter().filter(|s| s.cluster == cluster).count();
                assert!(size <= config.max_sub_queries_per_cluster);
            }
        }
    }

    #[test]
    fn test_compound_query_yields_clusters() {
        let subs = decomposer().decompose("How to treat mastitis in cows and when to sow cotton in Rajkot");
        let clusters: HashSet<_> = subs.iter().map(|s| s.cluster).collect();
        assert_eq!(clusters.len(), 2);
        assert!(texts(&subs).contains(&"cotton cultivation rajkot"));
    }

    #[test]
    fn test_location_only_when_named() {
        let subs = decomposer().decompose("when to sow cotton");
        assert!(subs.iter().all(|s| !s.text.contains("gujarat") && !s.text.contains("rajkot")));
        assert_eq!(subs[0].text, "cotton cultivation");
    }

    #[test]
    fn test_pest_uses_control_keyword() {
        let subs = decomposer().decompose("how to control pink bollworm in cotton");
        assert_eq!(subs[0].text, "pink bollworm control cotton");
    }

    #[test]
    fn test_regional_query_is_mapped_to_english() {
        let subs = decomposer().decompose("કપાસમાં ગુલાબી ઇયળ");
        assert!(texts(&subs).iter().any(|t| t.contains("pink bollworm")));
        assert!(subs.iter().all(|s| s.text.is_ascii()));
    }

    #[test]
    fn test_unmapped_regional_query_still_yields_a_search() {
        let subs = decomposer().decompose("આ શું છે");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].text, "farming advisory");
    }

    #[test]
    fn test_subjectless_clause_gets_second_phrasing() {
        let subs = decomposer().decompose("neem oil dosage per litre");
        assert!(subs.len() >= 2);
        assert!(subs.iter().all(|s| s.cluster == 0));
    }

    #[test]
    fn test_dosage_stays_in_one_phrase() {
        let subs = decomposer().decompose("Apply 2.5 kg urea per acre for wheat");
        assert!(subs.iter().all(|s| s.cluster == 0));
        assert!(subs.iter().all(|s| s.text != "apply 2"));
        assert!(texts(&subs).iter().any(|t| t.contains("2.5 kg urea")));
    }

    #[test]
    fn test_single_word_is_padded() {
        let subs = decomposer().decompose("hello");
        assert_eq!(subs[0].text, "hello farming");
    }

    #[test]
    fn test_no_duplicates_across_clusters() {
        let subs = decomposer().decompose("treat mastitis in cows. treat mastitis in cows.");
        let unique: HashSet<_> = texts(&subs).into_iter().collect();
        assert_eq!(unique.len(), subs.len());
    }

    #[test]
    fn test_decomposition_is_deterministic() {
        let basis = "How to treat mastitis in cows and when to sow cotton";
        assert_eq!(decomposer().decompose(basis), decomposer().decompose(basis));
    }

    #[test]
    fn test_resolve_basis_follows_inherited_turn() {
        let earlier = ConversationTurn::new(
            3,
            Query::new("How to treat mastitis in cows?", ResponseLanguage::English),
            Classification::matched(Category::ValidAgricultural, "test"),
            "How to treat mastitis in cows?",
        );
        let reply = Query::new("tell me more", ResponseLanguage::English);

        let inherited = Classification::inherited(3, "short reply");
        let basis = decomposer().resolve_basis(&reply, &inherited, std::slice::from_ref(&earlier));
        assert_eq!(basis, "How to treat mastitis in cows?");

        let fresh = Classification::fallback();
        assert_eq!(decomposer().resolve_basis(&reply, &fresh, &[earlier]), "tell me more");
    }
}
