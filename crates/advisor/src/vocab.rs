//! Agricultural vocabulary shared by the classifier and the decomposer.
//!
//! All entries are lowercase English; regional input reaches these tables
//! through the glossary.

use serde::{Deserialize, Serialize};

/// What a sub-query is looking for. Used to group evidence, never to rank it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Symptom,
    Treatment,
    Prevention,
    Cultivation,
    Nutrition,
    Pest,
    Irrigation,
    Variety,
    Market,
    Scheme,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Symptom => "symptom",
            Self::Treatment => "treatment",
            Self::Prevention => "prevention",
            Self::Cultivation => "cultivation",
            Self::Nutrition => "nutrition",
            Self::Pest => "pest",
            Self::Irrigation => "irrigation",
            Self::Variety => "variety",
            Self::Market => "market",
            Self::Scheme => "scheme",
            Self::General => "general",
        }
    }
}

/// Cue words that reveal the intent of a clause. Checked in clause order.
pub const INTENT_CUES: &[(&str, Intent)] = &[
    ("treat", Intent::Treatment),
    ("treatment", Intent::Treatment),
    ("cure", Intent::Treatment),
    ("control", Intent::Treatment),
    ("manage", Intent::Treatment),
    ("management", Intent::Treatment),
    ("remedy", Intent::Treatment),
    ("medicine", Intent::Treatment),
    ("spray", Intent::Treatment),
    ("kill", Intent::Treatment),
    ("symptom", Intent::Symptom),
    ("symptoms", Intent::Symptom),
    ("sign", Intent::Symptom),
    ("signs", Intent::Symptom),
    ("identify", Intent::Symptom),
    ("cause", Intent::Symptom),
    ("causes", Intent::Symptom),
    ("prevent", Intent::Prevention),
    ("prevention", Intent::Prevention),
    ("avoid", Intent::Prevention),
    ("protect", Intent::Prevention),
    ("fertilizer", Intent::Nutrition),
    ("fertiliser", Intent::Nutrition),
    ("manure", Intent::Nutrition),
    ("nutrient", Intent::Nutrition),
    ("nutrients", Intent::Nutrition),
    ("urea", Intent::Nutrition),
    ("dap", Intent::Nutrition),
    ("feed", Intent::Nutrition),
    ("fodder", Intent::Nutrition),
    ("sow", Intent::Cultivation),
    ("sowing", Intent::Cultivation),
    ("plant", Intent::Cultivation),
    ("planting", Intent::Cultivation),
    ("grow", Intent::Cultivation),
    ("growing", Intent::Cultivation),
    ("cultivate", Intent::Cultivation),
    ("cultivation", Intent::Cultivation),
    ("spacing", Intent::Cultivation),
    ("irrigate", Intent::Irrigation),
    ("irrigation", Intent::Irrigation),
    ("watering", Intent::Irrigation),
    ("drip", Intent::Irrigation),
    ("variety", Intent::Variety),
    ("varieties", Intent::Variety),
    ("hybrid", Intent::Variety),
    ("price", Intent::Market),
    ("prices", Intent::Market),
    ("mandi", Intent::Market),
    ("market", Intent::Market),
    ("sell", Intent::Market),
    ("scheme", Intent::Scheme),
    ("schemes", Intent::Scheme),
    ("subsidy", Intent::Scheme),
    ("yojana", Intent::Scheme),
    ("insurance", Intent::Scheme),
    ("loan", Intent::Scheme),
    ("pest", Intent::Pest),
    ("pests", Intent::Pest),
    ("insect", Intent::Pest),
    ("insects", Intent::Pest),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptKind {
    Disease,
    Pest,
    Weed,
    Disorder,
}

/// A problem with a technical name and the words farmers use for it.
#[derive(Debug)]
pub struct Concept {
    pub name: &'static str,
    pub lay_terms: &'static [&'static str],
    pub kind: ConceptKind,
}

pub const CONCEPTS: &[Concept] = &[
    Concept { name: "mastitis", lay_terms: &["udder infection", "swollen udder"], kind: ConceptKind::Disease },
    Concept { name: "foot and mouth disease", lay_terms: &["mouth blisters", "hoof sores"], kind: ConceptKind::Disease },
    Concept { name: "lumpy skin disease", lay_terms: &["skin nodules", "skin lumps"], kind: ConceptKind::Disease },
    Concept { name: "bloat", lay_terms: &["swollen stomach", "gas in stomach"], kind: ConceptKind::Disorder },
    Concept { name: "milk fever", lay_terms: &["calcium deficiency", "weakness after calving"], kind: ConceptKind::Disorder },
    Concept { name: "ticks", lay_terms: &["blood sucking parasites"], kind: ConceptKind::Pest },
    Concept { name: "pink bollworm", lay_terms: &["boll worm", "cotton boll larva"], kind: ConceptKind::Pest },
    Concept { name: "whitefly", lay_terms: &["white fly", "small white insects"], kind: ConceptKind::Pest },
    Concept { name: "aphids", lay_terms: &["aphid", "sap sucking insects"], kind: ConceptKind::Pest },
    Concept { name: "thrips", lay_terms: &["leaf curl insects"], kind: ConceptKind::Pest },
    Concept { name: "fall armyworm", lay_terms: &["armyworm", "maize caterpillar"], kind: ConceptKind::Pest },
    Concept { name: "stem borer", lay_terms: &["dead heart", "stem boring larva"], kind: ConceptKind::Pest },
    Concept { name: "fruit borer", lay_terms: &["fruit worm", "holes in fruit"], kind: ConceptKind::Pest },
    Concept { name: "root knot nematode", lay_terms: &["nematode", "root galls"], kind: ConceptKind::Pest },
    Concept { name: "termites", lay_terms: &["termite", "white ants"], kind: ConceptKind::Pest },
    Concept { name: "wilt", lay_terms: &["wilting", "plant drying"], kind: ConceptKind::Disease },
    Concept { name: "leaf curl virus", lay_terms: &["leaf curl", "curled leaves"], kind: ConceptKind::Disease },
    Concept { name: "yellow mosaic virus", lay_terms: &["yellow mosaic", "yellow patches on leaves"], kind: ConceptKind::Disease },
    Concept { name: "powdery mildew", lay_terms: &["white powder on leaves"], kind: ConceptKind::Disease },
    Concept { name: "downy mildew", lay_terms: &["mildew"], kind: ConceptKind::Disease },
    Concept { name: "blast", lay_terms: &["leaf blast", "neck rot"], kind: ConceptKind::Disease },
    Concept { name: "rust", lay_terms: &["rust spots", "orange powder on leaves"], kind: ConceptKind::Disease },
    Concept { name: "damping off", lay_terms: &["seedling rot", "seedlings dying"], kind: ConceptKind::Disease },
    Concept { name: "tikka disease", lay_terms: &["leaf spot", "tikka"], kind: ConceptKind::Disease },
    Concept { name: "zinc deficiency", lay_terms: &["khaira"], kind: ConceptKind::Disorder },
    Concept { name: "parthenium", lay_terms: &["congress grass", "gajar ghas"], kind: ConceptKind::Weed },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Crop,
    Livestock,
}

/// A crop or animal. `forms` lists every spelling that refers to it.
#[derive(Debug)]
pub struct Subject {
    pub singular: &'static str,
    pub forms: &'static [&'static str],
    pub kind: SubjectKind,
}

pub const SUBJECTS: &[Subject] = &[
    Subject { singular: "cow", forms: &["cow", "cows", "cattle"], kind: SubjectKind::Livestock },
    Subject { singular: "buffalo", forms: &["buffalo", "buffaloes", "buffalos"], kind: SubjectKind::Livestock },
    Subject { singular: "goat", forms: &["goat", "goats"], kind: SubjectKind::Livestock },
    Subject { singular: "sheep", forms: &["sheep"], kind: SubjectKind::Livestock },
    Subject { singular: "poultry", forms: &["poultry", "chicken", "chickens", "hen", "hens"], kind: SubjectKind::Livestock },
    Subject { singular: "calf", forms: &["calf", "calves"], kind: SubjectKind::Livestock },
    Subject { singular: "cotton", forms: &["cotton"], kind: SubjectKind::Crop },
    Subject { singular: "groundnut", forms: &["groundnut", "groundnuts", "peanut", "peanuts"], kind: SubjectKind::Crop },
    Subject { singular: "wheat", forms: &["wheat"], kind: SubjectKind::Crop },
    Subject { singular: "rice", forms: &["rice", "paddy"], kind: SubjectKind::Crop },
    Subject { singular: "maize", forms: &["maize", "corn"], kind: SubjectKind::Crop },
    Subject { singular: "bajra", forms: &["bajra", "pearl millet", "millet"], kind: SubjectKind::Crop },
    Subject { singular: "cumin", forms: &["cumin", "jeera"], kind: SubjectKind::Crop },
    Subject { singular: "castor", forms: &["castor"], kind: SubjectKind::Crop },
    Subject { singular: "mustard", forms: &["mustard"], kind: SubjectKind::Crop },
    Subject { singular: "chickpea", forms: &["chickpea", "chickpeas", "gram", "chana"], kind: SubjectKind::Crop },
    Subject { singular: "pigeon pea", forms: &["pigeon pea", "tur", "arhar"], kind: SubjectKind::Crop },
    Subject { singular: "soybean", forms: &["soybean", "soybeans", "soya"], kind: SubjectKind::Crop },
    Subject { singular: "sugarcane", forms: &["sugarcane"], kind: SubjectKind::Crop },
    Subject { singular: "tomato", forms: &["tomato", "tomatoes"], kind: SubjectKind::Crop },
    Subject { singular: "onion", forms: &["onion", "onions"], kind: SubjectKind::Crop },
    Subject { singular: "potato", forms: &["potato", "potatoes"], kind: SubjectKind::Crop },
    Subject { singular: "brinjal", forms: &["brinjal", "eggplant"], kind: SubjectKind::Crop },
    Subject { singular: "chilli", forms: &["chilli", "chillies", "chili", "chilies"], kind: SubjectKind::Crop },
    Subject { singular: "okra", forms: &["okra", "bhindi"], kind: SubjectKind::Crop },
    Subject { singular: "banana", forms: &["banana", "bananas"], kind: SubjectKind::Crop },
    Subject { singular: "mango", forms: &["mango", "mangoes", "mangos"], kind: SubjectKind::Crop },
    Subject { singular: "sesame", forms: &["sesame", "til"], kind: SubjectKind::Crop },
];

/// Places that may be appended to a sub-query when the farmer names them.
pub const LOCATIONS: &[&str] = &[
    "gujarat",
    "saurashtra",
    "kutch",
    "ahmedabad",
    "amreli",
    "anand",
    "banaskantha",
    "bharuch",
    "bhavnagar",
    "dahod",
    "gandhinagar",
    "jamnagar",
    "junagadh",
    "kheda",
    "mehsana",
    "morbi",
    "navsari",
    "panchmahal",
    "patan",
    "porbandar",
    "rajkot",
    "sabarkantha",
    "surat",
    "surendranagar",
    "vadodara",
    "valsad",
    "maharashtra",
    "rajasthan",
    "madhya pradesh",
    "punjab",
];

/// Words that carry no retrieval value.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "at", "be", "best", "by", "can", "could", "do", "does",
    "for", "from", "give", "good", "has", "have", "how", "i", "in", "is", "it", "its", "me",
    "my", "of", "on", "or", "our", "please", "should", "tell", "that", "the", "their", "there",
    "this", "to", "use", "using", "was", "we", "what", "when", "where", "which", "who", "why",
    "will", "with", "would", "you", "your", "also", "any", "get", "getting", "much", "many",
    "some", "know", "want", "need", "these", "those", "them", "they", "all", "time", "right",
    "way", "ways", "method", "methods", "one", "if", "so", "there", "then", "after", "before",
    "during", "into", "per", "each", "very", "more", "most", "other", "same", "than", "too",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// True when `phrase` occurs in `tokens` as whole consecutive words.
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    find_phrase(tokens, phrase).is_some()
}

/// Position of the first whole-word occurrence of `phrase` in `tokens`.
pub fn find_phrase(tokens: &[String], phrase: &str) -> Option<usize> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return None;
    }
    tokens
        .windows(words.len())
        .position(|window| window.iter().zip(&words).all(|(t, w)| t == w))
}

/// Concepts mentioned in `tokens`, by technical name or lay term, in order of appearance.
pub fn find_concepts(tokens: &[String]) -> Vec<&'static Concept> {
    let mut found: Vec<(usize, &'static Concept)> = CONCEPTS
        .iter()
        .filter_map(|concept| {
            std::iter::once(concept.name)
                .chain(concept.lay_terms.iter().copied())
                .filter_map(|phrase| find_phrase(tokens, phrase))
                .min()
                .map(|pos| (pos, concept))
        })
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, concept)| concept).collect()
}

/// First crop or animal mentioned, with the form the farmer used.
pub fn find_subject(tokens: &[String]) -> Option<(&'static Subject, &'static str)> {
    SUBJECTS
        .iter()
        .flat_map(|subject| subject.forms.iter().map(move |form| (subject, *form)))
        .filter_map(|(subject, form)| find_phrase(tokens, form).map(|pos| (pos, subject, form)))
        .min_by_key(|(pos, _, _)| *pos)
        .map(|(_, subject, form)| (subject, form))
}

/// First known location mentioned.
pub fn find_location(tokens: &[String]) -> Option<&'static str> {
    LOCATIONS
        .iter()
        .filter_map(|loc| find_phrase(tokens, loc).map(|pos| (pos, *loc)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, loc)| loc)
}

/// Intent revealed by the earliest cue word.
pub fn find_intent(tokens: &[String]) -> Intent {
    tokens
        .iter()
        .find_map(|token| {
            INTENT_CUES
                .iter()
                .find(|(cue, _)| cue == token)
                .map(|(_, intent)| *intent)
        })
        .unwrap_or(Intent::General)
}
