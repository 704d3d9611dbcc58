use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical lowercase name of a clinical symptom ("fever", "shortness of breath").
///
/// Construction trims surrounding whitespace, collapses inner runs of
/// whitespace and lowercases. Empty input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymptomToken(String);

impl SymptomToken {
    pub fn new(raw: &str) -> Option<Self> {
        let canonical = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymptomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SymptomToken {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SymptomToken::new(&value).ok_or_else(|| "symptom token must not be empty".to_string())
    }
}

impl From<SymptomToken> for String {
    fn from(token: SymptomToken) -> Self {
        token.0
    }
}

/// Deduplicated set of symptoms reported in one request.
///
/// Backed by a `BTreeSet` so iteration order is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSet(BTreeSet<SymptomToken>);

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw entity string. Returns `false` when it was empty or already present.
    pub fn insert_raw(&mut self, raw: &str) -> bool {
        match SymptomToken::new(raw) {
            Some(token) => self.0.insert(token),
            None => false,
        }
    }

    pub fn contains(&self, symptom: &str) -> bool {
        SymptomToken::new(symptom).is_some_and(|t| self.0.contains(&t))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomToken> {
        self.0.iter()
    }
}

impl FromIterator<SymptomToken> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = SymptomToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().filter_map(SymptomToken::new).collect()
    }
}
