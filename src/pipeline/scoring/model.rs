use serde::{Deserialize, Serialize};

use crate::pipeline::error::ExternalCallError;
use crate::pipeline::traits::RiskModel;

/// Serialized classifier stored in the model registry (`model.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Logistic regression: `p1 = sigmoid(w·x + b)`. Has probability output.
    Logistic { weights: Vec<f64>, bias: f64 },
    /// Single-feature cutoff rule: label 1 when `x[feature] >= cutoff`.
    /// Label output only.
    Threshold {
        feature: usize,
        cutoff: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n_features: Option<usize>,
    },
}

impl ModelArtifact {
    /// Structural checks run once when the artifact is bound.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ModelArtifact::Logistic { weights, bias } => {
                if weights.is_empty() {
                    return Err("logistic model has no weights".into());
                }
                if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                    return Err("logistic model has non-finite coefficients".into());
                }
            }
            ModelArtifact::Threshold {
                feature,
                cutoff,
                n_features,
            } => {
                if !cutoff.is_finite() {
                    return Err("threshold cutoff must be finite".into());
                }
                match n_features {
                    Some(n) if feature >= n => {
                        return Err(format!(
                            "threshold feature {feature} out of range for {n} features"
                        ));
                    }
                    Some(_) => {}
                    None if feature.checked_add(1).is_none() => {
                        return Err(format!("threshold feature index {feature} is too large"));
                    }
                    None => {}
                }
            }
        }
        Ok(())
    }

    fn check_input(&self, features: &[f64]) -> Result<(), ExternalCallError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(ExternalCallError::FeatureShape {
                expected,
                actual: features.len(),
            });
        }
        if features.iter().any(|x| !x.is_finite()) {
            return Err(ExternalCallError::Computation(
                "feature vector contains non-finite values".into(),
            ));
        }
        Ok(())
    }

    fn logistic_p1(weights: &[f64], bias: f64, features: &[f64]) -> f64 {
        let z: f64 = weights.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + bias;
        1.0 / (1.0 + (-z).exp())
    }
}

impl RiskModel for ModelArtifact {
    fn n_features(&self) -> usize {
        match self {
            ModelArtifact::Logistic { weights, .. } => weights.len(),
            ModelArtifact::Threshold {
                feature,
                n_features,
                ..
            } => n_features.unwrap_or(feature.saturating_add(1)),
        }
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ExternalCallError> {
        self.check_input(features)?;
        let label = match self {
            ModelArtifact::Logistic { weights, bias } => {
                Self::logistic_p1(weights, *bias, features) >= 0.5
            }
            ModelArtifact::Threshold { feature, cutoff, .. } => features[*feature] >= *cutoff,
        };
        Ok(if label { 1.0 } else { 0.0 })
    }

    fn predict_probability(
        &self,
        features: &[f64],
    ) -> Option<Result<[f64; 2], ExternalCallError>> {
        match self {
            ModelArtifact::Logistic { weights, bias } => {
                Some(self.check_input(features).map(|()| {
                    let p1 = Self::logistic_p1(weights, *bias, features);
                    [1.0 - p1, p1]
                }))
            }
            ModelArtifact::Threshold { .. } => None,
        }
    }
}
