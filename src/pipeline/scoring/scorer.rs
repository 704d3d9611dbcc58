use std::sync::Arc;

use crate::models::{DiseaseScoreMap, RiskMap, SymptomSet};
use crate::pipeline::error::{ConfigError, ExternalCallError};
use crate::pipeline::traits::{FeatureEncoder, RiskModel};

/// Turns mapping scores into per-disease positive-class probabilities.
pub struct RiskScorer {
    model: Arc<dyn RiskModel>,
    encoder: Arc<dyn FeatureEncoder>,
}

impl RiskScorer {
    /// Bind a model to an encoder. Fails when their feature widths disagree.
    pub fn new(
        model: Arc<dyn RiskModel>,
        encoder: Arc<dyn FeatureEncoder>,
    ) -> Result<Self, ConfigError> {
        if encoder.width() != model.n_features() {
            return Err(ConfigError::FeatureWidthMismatch {
                encoder: encoder.name(),
                encoder_width: encoder.width(),
                model_width: model.n_features(),
            });
        }
        Ok(Self { model, encoder })
    }

    pub fn model(&self) -> &Arc<dyn RiskModel> {
        &self.model
    }

    pub fn features_for(
        &self,
        disease: &str,
        mapping_score: f64,
        symptoms: &SymptomSet,
    ) -> Vec<f64> {
        self.encoder.encode(disease, mapping_score, symptoms)
    }

    /// Class probabilities `[p0, p1]` for one feature vector.
    ///
    /// Models without probability output have their hard label rendered as
    /// `[1 - label, label]`.
    pub fn class_probabilities(&self, features: &[f64]) -> Result<[f64; 2], ExternalCallError> {
        let [p0, p1] = match self.model.predict_probability(features) {
            Some(result) => result?,
            None => {
                let label = self.model.predict(features)?;
                [1.0 - label, label]
            }
        };
        if !p0.is_finite() || !p1.is_finite() {
            return Err(ExternalCallError::Computation(
                "classifier returned non-finite probabilities".into(),
            ));
        }
        Ok([p0.clamp(0.0, 1.0), p1.clamp(0.0, 1.0)])
    }

    /// Score every disease in `disease_scores`.
    ///
    /// A disease whose scoring fails gets 0.0; the failure is logged and
    /// the remaining diseases are still scored.
    pub fn score_probabilities(
        &self,
        disease_scores: &DiseaseScoreMap,
        symptoms: &SymptomSet,
    ) -> RiskMap {
        disease_scores
            .iter()
            .map(|(disease, &score)| {
                let features = self.features_for(disease, score, symptoms);
                let probability = match self.class_probabilities(&features) {
                    Ok([_, p1]) => p1,
                    Err(e) => {
                        tracing::warn!(
                            disease = %disease,
                            error = %e,
                            "Risk scoring failed, using 0.0"
                        );
                        0.0
                    }
                };
                (disease.clone(), probability)
            })
            .collect()
    }
}
