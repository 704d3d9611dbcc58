//! Offline symptom recognizer backed by a curated phrase lexicon.
//!
//! Each lexicon entry maps a set of lay phrasings to one canonical symptom
//! token (the same tokens the mapping table uses). A mention is skipped when a
//! negation cue ("no fever", "without a cough") sits at most
//! `NEGATION_WINDOW` words before it in the same scope. Punctuation,
//! contrastive conjunctions and "and" followed by a new subject or verb
//! ("and a", "and have") end a negation scope.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::error::ExternalCallError;
use crate::pipeline::traits::{EntityRecognizer, RecognizedEntity};

/// Entity group the lexicon labels its matches with.
pub const LEXICON_ENTITY_GROUP: &str = "SYMPTOM";

struct LexiconEntry {
    regex: Regex,
    canonical: &'static str,
}

fn entry(alternatives: &str, canonical: &'static str) -> LexiconEntry {
    LexiconEntry {
        regex: Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).unwrap(),
        canonical,
    }
}

static LEXICON: LazyLock<Vec<LexiconEntry>> = LazyLock::new(|| {
    vec![
        entry(r"fever|feverish|high\s+temperature|running\s+a\s+temperature", "fever"),
        entry(r"cough|coughing", "cough"),
        entry(r"headaches?|head\s+hurts|head\s+is\s+pounding", "headache"),
        entry(r"nausea|nauseous|nauseated|queasy", "nausea"),
        entry(r"vomiting|throwing\s+up|threw\s+up|vomited", "vomiting"),
        entry(r"fatigue|tired|tiredness|exhausted|exhaustion|worn\s+out", "fatigue"),
        entry(r"sore\s+throat|throat\s+(?:is\s+)?sore|scratchy\s+throat", "sore throat"),
        entry(
            r"shortness\s+of\s+breath|short\s+of\s+breath|breathless(?:ness)?|trouble\s+breathing|can'?t\s+breathe",
            "shortness of breath",
        ),
        entry(r"body\s+aches?|aching\s+all\s+over|muscle\s+aches?", "body aches"),
        entry(
            r"loss\s+of\s+taste|lost\s+(?:my\s+)?(?:sense\s+of\s+)?taste|can'?t\s+taste",
            "loss of taste",
        ),
        entry(
            r"loss\s+of\s+smell|lost\s+(?:my\s+)?(?:sense\s+of\s+)?smell|can'?t\s+smell",
            "loss of smell",
        ),
        entry(r"runny\s+nose|nose\s+is\s+running", "runny nose"),
        entry(r"congestion|congested|stuffy\s+nose|blocked\s+nose", "congestion"),
        entry(r"sneezing|sneezes", "sneezing"),
        entry(r"chills|shivering", "chills"),
        entry(r"diarrh(?:o)?ea", "diarrhea"),
        entry(r"dizziness|dizzy|light-?headed", "dizziness"),
        entry(r"chest\s+pain|chest\s+tightness|tight\s+chest", "chest pain"),
        entry(r"rash|hives", "rash"),
        entry(r"joint\s+pain|aching\s+joints", "joint pain"),
        entry(r"stomach\s+ache|stomachache|abdominal\s+pain|belly\s+pain", "abdominal pain"),
        entry(r"sensitivity\s+to\s+light|light\s+sensitivity|photophobia", "light sensitivity"),
    ]
});

/// Words a negation cue may reach forward.
pub const NEGATION_WINDOW: usize = 4;

static SCOPE_TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[.;:,!?\n]|\b(?:but|however|although|though|except)\b|\band\s+(?:a|an|the|my|some|i|i'm|i've|have|has|had|also|now)\b",
    )
    .unwrap()
});

static NEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:no|not|without|denies|denied|never|nor|free\s+of)\b").unwrap()
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w']+").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconRecognizer;

impl LexiconRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, ExternalCallError> {
        let mut entities = Vec::new();
        for entry in LEXICON.iter() {
            for found in entry.regex.find_iter(text) {
                if is_negated(&text[..found.start()]) {
                    continue;
                }
                entities.push(RecognizedEntity {
                    entity_group: LEXICON_ENTITY_GROUP.to_string(),
                    word: entry.canonical.to_string(),
                    score: Some(1.0),
                });
            }
        }
        Ok(entities)
    }
}

/// Whether a negation cue in the mention's scope reaches it.
fn is_negated(prefix: &str) -> bool {
    let scope_start = SCOPE_TERMINATOR
        .find_iter(prefix)
        .last()
        .map_or(0, |m| m.end());
    let scope = &prefix[scope_start..];
    NEGATION
        .find_iter(scope)
        .last()
        .is_some_and(|cue| WORD.find_iter(&scope[cue.end()..]).count() <= NEGATION_WINDOW)
}
