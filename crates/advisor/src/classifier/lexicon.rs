//! Phrase lists driving the classification rules.
//!
//! Entries are lowercase and matched as whole words. Single words also match
//! their simple plural.

/// Replies that only make sense as a follow-up to an earlier turn.
pub const SHORT_REPLIES: &[&str] = &[
    "yes",
    "yes please",
    "yeah",
    "yep",
    "ok",
    "okay",
    "ok tell me",
    "sure",
    "please",
    "more",
    "tell me more",
    "more details",
    "more info",
    "explain more",
    "explain",
    "continue",
    "go on",
    "please continue",
    "what else",
    "and then",
    "then what",
    "next",
    "how",
    "why",
    "details",
    "no",
    "nope",
    "no thanks",
    "not really",
    "haan",
    "ha",
    "hmm",
    "nahi",
    "na",
    "હા",
    "હા જી",
    "વધુ",
    "વધુ જણાવો",
    "વધારે માહિતી",
    "બરાબર",
    "ના",
    "ના જી",
];

/// Languages farmers ask for by name. Supported ones are filtered out at
/// classification time.
pub const LANGUAGE_NAMES: &[&str] = &[
    "hindi",
    "marathi",
    "tamil",
    "telugu",
    "kannada",
    "malayalam",
    "bengali",
    "bangla",
    "punjabi",
    "odia",
    "oriya",
    "assamese",
    "urdu",
    "sanskrit",
    "rajasthani",
    "sindhi",
    "english",
    "gujarati",
    "french",
    "spanish",
    "german",
    "chinese",
    "japanese",
    "arabic",
    "russian",
    "portuguese",
];

/// Words that precede a language name in a request for output language.
pub const LANGUAGE_LEADS: &[&str] = &["in", "into", "to", "using"];

/// Words that follow a language name in a request for output language.
pub const LANGUAGE_FOLLOWERS: &[&str] = &["language", "bhasha", "mein", "me", "ma", "translation"];

/// Place names that start with a language name.
pub const LANGUAGE_PLACE_SUFFIXES: &[&str] = &["nadu", "pradesh"];

pub const ROLE_OVERRIDE: &[&str] = &[
    "ignore previous instructions",
    "ignore all previous instructions",
    "ignore your instructions",
    "ignore the above",
    "ignore all instructions",
    "forget your instructions",
    "forget previous instructions",
    "forget everything",
    "disregard previous instructions",
    "disregard your instructions",
    "you are now",
    "from now on you are",
    "act as a",
    "act as an",
    "pretend to be",
    "pretend you are",
    "roleplay as",
    "role play as",
    "system prompt",
    "your instructions",
    "developer mode",
    "jailbreak",
    "dan mode",
    "reveal your prompt",
];

/// Parties, politicians and electoral words. Only political together with an
/// endorsement cue.
pub const POLITICAL_TERMS: &[&str] = &[
    "bjp",
    "congress",
    "aap",
    "shiv sena",
    "political party",
    "political",
    "party",
    "election",
    "vote",
    "voting",
    "politician",
    "opposition",
    "modi",
    "rahul gandhi",
    "kejriwal",
];

/// Political terms that also name agricultural or commercial things.
pub const POLITICAL_EXCLUSIONS: &[&str] = &[
    "congress grass",
    "party farming",
    "third party",
];

/// Comparative or endorsement wording. Question words alone are not cues.
pub const ENDORSEMENT_CUES: &[&str] = &[
    "better",
    "best",
    "worse",
    "worst",
    "support",
    "supporting",
    "compare",
    "comparison",
    "vs",
    "versus",
    "good for",
    "bad for",
    "corrupt",
    "favour",
    "favor",
    "trust",
    "win",
    "vote for",
    "should i vote",
    "should we vote",
    "endorse",
];

pub const UNSAFE_ILLEGAL: &[&str] = &[
    "endosulfan",
    "aldrin",
    "dieldrin",
    "chlordane",
    "heptachlor",
    "ddt",
    "bhc",
    "lindane",
    "methyl parathion",
    "ethyl parathion",
    "phorate",
    "carbofuran",
    "monocrotophos",
    "banned pesticide",
    "banned insecticide",
    "banned chemical",
    "illegal pesticide",
    "oxytocin injection",
    "calcium carbide",
    "carbide ripening",
    "adulterate",
    "adulteration",
    "poison fish",
    "fish poisoning",
    "poaching",
    "poach",
    "hunt deer",
    "hunt peacock",
    "hunting deer",
    "hunting peacock",
    "kill peacock",
    "kill nilgai illegally",
    "ganja",
    "cannabis",
    "opium",
    "poppy cultivation",
    "smuggle",
    "fake certificate",
    "without license",
    "explosive",
    "bomb",
];

pub const CULTURAL_SENSITIVE: &[&str] = &[
    "caste",
    "jati",
    "gotra",
    "religion",
    "religious",
    "ritual",
    "puja",
    "pooja",
    "havan",
    "mantra",
    "auspicious",
    "inauspicious",
    "muhurat",
    "muhurt",
    "astrology",
    "horoscope",
    "god",
    "goddess",
    "temple",
    "black magic",
    "witchcraft",
    "evil eye",
    "nazar",
    "sacred",
    "sin",
];

/// Cues that the question is grounded in fiction or media.
pub const MEDIA_CUES: &[&str] = &[
    "movie",
    "film",
    "serial",
    "web series",
    "tv show",
    "novel",
    "fiction",
    "cartoon",
    "bollywood",
    "netflix",
    "youtube video",
    "whatsapp forward",
    "viral video",
    "episode",
];

/// General agricultural vocabulary beyond the crop, concept and intent tables.
pub const AGRI_TERMS: &[&str] = &[
    "agriculture",
    "agricultural",
    "farm",
    "farming",
    "farmer",
    "kisan",
    "crop",
    "field",
    "soil",
    "seed",
    "seedling",
    "sapling",
    "nursery",
    "harvest",
    "yield",
    "pesticide",
    "insecticide",
    "fungicide",
    "herbicide",
    "weed",
    "compost",
    "vermicompost",
    "organic",
    "livestock",
    "dairy",
    "milk",
    "animal",
    "veterinary",
    "vaccine",
    "vaccination",
    "tractor",
    "horticulture",
    "orchard",
    "greenhouse",
    "polyhouse",
    "leaf",
    "leaves",
    "root",
    "flower",
    "fruit",
    "vegetable",
    "grain",
    "pulse",
    "oilseed",
    "disease",
    "infection",
    "monsoon",
    "rainfall",
    "drought",
    "kharif",
    "rabi",
    "neem",
    "beekeeping",
    "fishery",
    "fodder",
    "udder",
    "calving",
    "apmc",
    "kvk",
    "fertilizer",
    "fertiliser",
    "manure",
    "urea",
    "irrigation",
    "irrigate",
    "drip",
    "sow",
    "sowing",
    "cultivation",
    "cultivate",
    "plant",
    "planting",
    "grow",
    "growing",
    "spray",
    "pest",
    "insect",
    "variety",
    "mandi",
];

/// Vocabulary with no link to farming or rural livelihood.
pub const NON_AGRI_TERMS: &[&str] = &[
    "cricket",
    "football",
    "ipl",
    "match",
    "song",
    "actor",
    "actress",
    "celebrity",
    "recipe",
    "cooking",
    "restaurant",
    "bitcoin",
    "crypto",
    "stock market",
    "share market",
    "iphone",
    "laptop",
    "computer",
    "video game",
    "game",
    "joke",
    "poem",
    "poetry",
    "girlfriend",
    "boyfriend",
    "fashion",
    "hotel",
    "flight",
    "visa",
    "exam",
    "homework",
    "mathematics",
    "programming",
    "coding",
    "capital of",
    "president of",
    "history of",
    "planet",
];
