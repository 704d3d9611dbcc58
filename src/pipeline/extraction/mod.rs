//! Symptom extraction: free text → canonical `SymptomSet`.
//!
//! The recognizer is pluggable (`EntityRecognizer`). Two ship with the crate:
//! - `LexiconRecognizer`: curated phrase lexicon, no network, always available
//! - `HttpEntityRecognizer`: remote token-classification endpoint
//!
//! Only entities in the clinical-problem groups survive; everything else the
//! recognizer labels (treatments, tests, anatomy) is dropped.

pub mod lexicon;
pub mod remote;

use std::sync::Arc;

use crate::models::SymptomSet;
use crate::pipeline::traits::EntityRecognizer;

pub use lexicon::LexiconRecognizer;
pub use remote::HttpEntityRecognizer;

/// Entity groups treated as symptoms (compared case-insensitively).
pub const SYMPTOM_ENTITY_GROUPS: &[&str] = &["problem", "symptom", "disease", "condition"];

pub struct SymptomExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl SymptomExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Extract the deduplicated symptom set from `text`.
    ///
    /// Never fails: a recognizer error is logged and yields an empty set.
    pub fn extract(&self, text: &str) -> SymptomSet {
        let mut symptoms = SymptomSet::new();
        if text.trim().is_empty() {
            return symptoms;
        }

        let entities = match self.recognizer.recognize(text) {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(
                    recognizer = self.recognizer.name(),
                    error = %e,
                    "Entity recognition failed, continuing with no symptoms"
                );
                return symptoms;
            }
        };

        for entity in &entities {
            if is_symptom_group(&entity.entity_group) {
                symptoms.insert_raw(&entity.word);
            }
        }

        tracing::debug!(
            recognizer = self.recognizer.name(),
            entities = entities.len(),
            symptoms = symptoms.len(),
            "Extracted symptoms"
        );
        symptoms
    }
}

/// Accepts both aggregated ("PROBLEM") and IOB-tagged ("B-PROBLEM") labels.
fn is_symptom_group(group: &str) -> bool {
    let lowered = group.trim().to_lowercase();
    let bare = lowered
        .strip_prefix("b-")
        .or_else(|| lowered.strip_prefix("i-"))
        .unwrap_or(&lowered);
    SYMPTOM_ENTITY_GROUPS.contains(&bare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::ExternalCallError;
    use crate::pipeline::traits::RecognizedEntity;

    struct FixedRecognizer(Vec<(&'static str, &'static str)>);

    impl EntityRecognizer for FixedRecognizer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>, ExternalCallError> {
            Ok(self
                .0
                .iter()
                .map(|(group, word)| RecognizedEntity {
                    entity_group: group.to_string(),
                    word: word.to_string(),
                    score: None,
                })
                .collect())
        }
    }

    struct FailingRecognizer;

    impl EntityRecognizer for FailingRecognizer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>, ExternalCallError> {
            Err(ExternalCallError::Unreachable {
                service: "ner",
                endpoint: "http://127.0.0.1:1".into(),
            })
        }
    }

    #[test]
    fn keeps_only_clinical_problem_groups() {
        let extractor = SymptomExtractor::new(Arc::new(FixedRecognizer(vec![
            ("PROBLEM", "Fever"),
            ("TREATMENT", "ibuprofen"),
            ("B-SYMPTOM", "cough"),
            ("condition", "FEVER"),
            ("TEST", "blood panel"),
        ])));

        let symptoms = extractor.extract("anything");
        assert_eq!(symptoms.len(), 2);
        assert!(symptoms.contains("fever"));
        assert!(symptoms.contains("cough"));
        assert!(!symptoms.contains("ibuprofen"));
    }

    #[test]
    fn empty_text_short_circuits() {
        let extractor = SymptomExtractor::new(Arc::new(FailingRecognizer));
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("   ").is_empty());
    }

    #[test]
    fn recognizer_failure_yields_empty_set() {
        let extractor = SymptomExtractor::new(Arc::new(FailingRecognizer));
        assert!(extractor.extract("I have a fever").is_empty());
    }

    #[test]
    fn blank_entity_words_are_dropped() {
        let extractor = SymptomExtractor::new(Arc::new(FixedRecognizer(vec![
            ("PROBLEM", "  "),
            ("PROBLEM", "headache"),
        ])));
        let symptoms = extractor.extract("text");
        assert_eq!(symptoms.len(), 1);
    }

    #[test]
    fn lexicon_keeps_symptoms_reported_after_an_unrelated_negation() {
        let extractor = SymptomExtractor::new(Arc::new(LexiconRecognizer::new()));
        assert!(extractor.extract("I have no appetite and a fever").contains("fever"));
        assert!(extractor
            .extract("I have not slept well and have a headache")
            .contains("headache"));
        let symptoms = extractor.extract("Never had this before: fever and chills");
        assert!(symptoms.contains("fever"));
        assert!(symptoms.contains("chills"));
    }
}
