use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Kind of wording the calm-language scan flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageCategory {
    /// "dangerous", "immediately", "call 911".
    Alarm,
    /// "you have [condition]".
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageMatch {
    pub category: LanguageCategory,
    pub matched_text: String,
    /// Byte offset in the scanned text.
    pub offset: usize,
    pub length: usize,
    pub reason: &'static str,
}

struct LanguagePattern {
    regex: Regex,
    category: LanguageCategory,
    description: &'static str,
}

static ALARM_PATTERNS: LazyLock<Vec<LanguagePattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"(?i)\b(?:dangerous|life[- ]threatening|fatal|deadly|lethal|critical)\b",
            LanguageCategory::Alarm,
            "Alarm word: dangerous/life-threatening/fatal",
        ),
        pattern(
            r"(?i)\b(?:emergency|urgent(?:ly)?|immediately|right\s+away|right\s+now|asap)\b",
            LanguageCategory::Alarm,
            "Urgency word: emergency/immediately/urgently",
        ),
        pattern(
            r"(?i)\bcall\s+(?:911|999|112|emergency|an\s+ambulance)\b",
            LanguageCategory::Alarm,
            "Emergency call directive",
        ),
        pattern(
            r"(?i)\bgo\s+to\s+(?:the\s+)?(?:emergency|ER|hospital|A&E)\b",
            LanguageCategory::Alarm,
            "ER directive: 'go to the hospital'",
        ),
        pattern(
            r"(?i)\bseek\s+(?:immediate|emergency|urgent)\s+(?:medical\s+)?(?:help|attention|care)\b",
            LanguageCategory::Alarm,
            "Seek care directive: 'seek immediate medical help'",
        ),
        pattern(
            r"(?i)\bdo\s+not\s+(?:wait|delay|ignore)\b",
            LanguageCategory::Alarm,
            "Urgency pressure: 'do not wait/delay'",
        ),
        pattern(
            r"(?i)\b(?:panic|alarming|severe\s+danger)\b",
            LanguageCategory::Alarm,
            "Alarm word: panic/alarming",
        ),
    ]
});

static DIAGNOSTIC_PATTERNS: LazyLock<Vec<LanguagePattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"(?i)\byou\s+(?:have|likely\s+have|probably\s+have)\s+(?:a\s+|an\s+|the\s+)?(?:covid|flu|influenza|migraine|cancer|infection|pneumonia)\b",
            LanguageCategory::Diagnostic,
            "Direct diagnosis: 'you have [condition]'",
        ),
        pattern(
            r"(?i)\byou\s+are\s+suffering\s+from\b",
            LanguageCategory::Diagnostic,
            "Direct diagnosis: 'you are suffering from'",
        ),
        pattern(
            r"(?i)\bthis\s+(?:means|confirms)\s+(?:that\s+)?you\s+have\b",
            LanguageCategory::Diagnostic,
            "Indirect diagnosis: 'this means you have'",
        ),
    ]
});

fn pattern(
    regex_str: &str,
    category: LanguageCategory,
    description: &'static str,
) -> LanguagePattern {
    LanguagePattern {
        regex: Regex::new(regex_str).expect("Invalid language pattern"),
        category,
        description,
    }
}

/// Scan user-facing text for alarm or diagnostic wording.
pub fn scan_language(text: &str) -> Vec<LanguageMatch> {
    let mut matches = Vec::new();

    for patterns in [&*ALARM_PATTERNS, &*DIAGNOSTIC_PATTERNS] {
        for lp in patterns {
            for mat in lp.regex.find_iter(text) {
                matches.push(LanguageMatch {
                    category: lp.category,
                    matched_text: mat.as_str().to_string(),
                    offset: mat.start(),
                    length: mat.len(),
                    reason: lp.description,
                });
            }
        }
    }

    deduplicate(&mut matches);
    matches
}

/// Drop matches fully contained in an earlier, longer one.
fn deduplicate(matches: &mut Vec<LanguageMatch>) {
    matches.sort_by_key(|m| (m.offset, std::cmp::Reverse(m.length)));
    let mut kept: Vec<LanguageMatch> = Vec::with_capacity(matches.len());
    for m in matches.drain(..) {
        let contained = kept
            .iter()
            .any(|k| m.offset >= k.offset && m.offset + m.length <= k.offset + k.length);
        if !contained {
            kept.push(m);
        }
    }
    *matches = kept;
}
