//! Feature encoders: how a candidate disease becomes a model input vector.
//!
//! The encoder's width must match the bound model's `n_features`; the
//! scorer refuses to start otherwise.

use std::str::FromStr;

use crate::models::{SymptomSet, SymptomToken};
use crate::pipeline::error::ConfigError;
use crate::pipeline::mapping::MappingTable;
use crate::pipeline::traits::FeatureEncoder;

/// Encoder selection from configuration (`FEATURE_ENCODER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    MappingScore,
    SymptomIndicators,
}

impl FromStr for EncoderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mapping_score" => Ok(Self::MappingScore),
            "symptom_indicators" => Ok(Self::SymptomIndicators),
            other => Err(ConfigError::InvalidSetting {
                key: "FEATURE_ENCODER",
                value: other.to_string(),
                reason: "expected 'mapping_score' or 'symptom_indicators'".into(),
            }),
        }
    }
}

/// Single feature: the disease's normalized mapping score.
#[derive(Debug, Default, Clone, Copy)]
pub struct MappingScoreEncoder;

impl FeatureEncoder for MappingScoreEncoder {
    fn name(&self) -> &'static str {
        "mapping_score"
    }

    fn width(&self) -> usize {
        1
    }

    fn encode(&self, _disease: &str, mapping_score: f64, _symptoms: &SymptomSet) -> Vec<f64> {
        vec![mapping_score]
    }
}

/// One 0/1 indicator per vocabulary symptom, followed by the mapping score.
#[derive(Debug, Clone)]
pub struct SymptomIndicatorEncoder {
    vocabulary: Vec<SymptomToken>,
}

impl SymptomIndicatorEncoder {
    pub fn new(mut vocabulary: Vec<SymptomToken>) -> Self {
        vocabulary.sort();
        vocabulary.dedup();
        Self { vocabulary }
    }

    /// Vocabulary = every distinct symptom in the mapping table, sorted.
    pub fn from_table(table: &MappingTable) -> Self {
        Self::new(table.rows().iter().map(|r| r.symptom.clone()).collect())
    }

    pub fn vocabulary(&self) -> &[SymptomToken] {
        &self.vocabulary
    }
}

impl FeatureEncoder for SymptomIndicatorEncoder {
    fn name(&self) -> &'static str {
        "symptom_indicators"
    }

    fn width(&self) -> usize {
        self.vocabulary.len() + 1
    }

    fn encode(&self, _disease: &str, mapping_score: f64, symptoms: &SymptomSet) -> Vec<f64> {
        let mut features: Vec<f64> = self
            .vocabulary
            .iter()
            .map(|s| if symptoms.contains(s.as_str()) { 1.0 } else { 0.0 })
            .collect();
        features.push(mapping_score);
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_score_encoder_is_one_wide() {
        let encoder = MappingScoreEncoder;
        assert_eq!(encoder.width(), 1);
        assert_eq!(encoder.encode("flu", 0.75, &SymptomSet::new()), vec![0.75]);
    }

    #[test]
    fn indicator_encoder_marks_present_symptoms() {
        let encoder = SymptomIndicatorEncoder::new(
            ["fever", "cough", "headache", "fever"]
                .iter()
                .filter_map(|s| SymptomToken::new(s))
                .collect(),
        );
        assert_eq!(encoder.width(), 4);

        let symptoms: SymptomSet = ["fever", "headache"].into_iter().collect();
        // vocabulary sorted: cough, fever, headache
        assert_eq!(encoder.encode("flu", 0.5, &symptoms), vec![0.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn indicator_vocabulary_from_table() {
        let table = MappingTable::from_reader(
            "symptom,disease\nfever,flu\ncough,flu\nfever,covid\n".as_bytes(),
        )
        .unwrap();
        let encoder = SymptomIndicatorEncoder::from_table(&table);
        let vocab: Vec<&str> = encoder.vocabulary().iter().map(SymptomToken::as_str).collect();
        assert_eq!(vocab, vec!["cough", "fever"]);
    }

    #[test]
    fn encoder_kind_parses() {
        assert_eq!("mapping_score".parse::<EncoderKind>().unwrap(), EncoderKind::MappingScore);
        assert_eq!(
            "symptom_indicators".parse::<EncoderKind>().unwrap(),
            EncoderKind::SymptomIndicators
        );
        assert!("tfidf".parse::<EncoderKind>().is_err());
    }
}
