//! Trait boundaries for the external capabilities the pipeline delegates to.
//!
//! Each trait is one seam where a third-party engine plugs in:
//! - EntityRecognizer: free text → labelled entities (NER)
//! - RiskModel: feature vector → class label / class probabilities
//! - FeatureEncoder: (disease, mapping score, symptoms) → model feature vector
//! - DriftComparator: reference vs current dataset → per-column drift
//! - Attributor: (model, input) → per-feature attribution

use serde::{Deserialize, Serialize};

use super::drift::{ComparisonResult, Dataset};
use super::error::ExternalCallError;
use crate::models::SymptomSet;

/// One entity span returned by a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// Label group, e.g. "PROBLEM", "SYMPTOM", "TREATMENT".
    pub entity_group: String,
    /// Surface text of the span.
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

pub trait EntityRecognizer: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, ExternalCallError>;
}

/// A trained classifier bound from the model registry.
pub trait RiskModel: Send + Sync {
    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    /// Hard class label (0.0 or 1.0).
    fn predict(&self, features: &[f64]) -> Result<f64, ExternalCallError>;

    /// Class probabilities `[p0, p1]`, or `None` when the model has no probability output.
    fn predict_probability(
        &self,
        _features: &[f64],
    ) -> Option<Result<[f64; 2], ExternalCallError>> {
        None
    }
}

/// Builds the model's input vector for one candidate disease.
pub trait FeatureEncoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Length of every vector `encode` returns.
    fn width(&self) -> usize;

    fn encode(&self, disease: &str, mapping_score: f64, symptoms: &SymptomSet) -> Vec<f64>;
}

pub trait DriftComparator: Send + Sync {
    fn compare(
        &self,
        reference: &Dataset,
        current: &Dataset,
    ) -> Result<ComparisonResult, ExternalCallError>;
}

pub trait Attributor: Send + Sync {
    fn attribute(
        &self,
        model: &dyn RiskModel,
        input: &[f64],
    ) -> Result<Vec<f64>, ExternalCallError>;
}
