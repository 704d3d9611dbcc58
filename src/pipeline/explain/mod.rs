//! Explainability: per-feature attributions for a model prediction.
//!
//! An explainer without a bound model is a valid degraded state: it returns
//! a fixed placeholder vector instead of failing.

pub mod plot;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pipeline::error::ExternalCallError;
use crate::pipeline::traits::{Attributor, RiskModel};

/// Attribution vector returned when no model is bound.
pub const PLACEHOLDER_ATTRIBUTIONS: [f64; 3] = [0.1, -0.2, 0.3];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplanationPayload {
    #[serde(rename = "shap_values")]
    pub attributions: Vec<f64>,
    /// Base64-encoded SVG bar chart of the attributions.
    pub plot_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Occlusion attribution against an all-zero baseline:
/// `a_i = f(x) - f(x with x_i = 0)`, where `f` is the positive-class output.
///
/// For a single-feature model this equals the exact Shapley value with a
/// zero background.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaselineAttributor;

impl BaselineAttributor {
    fn positive_output(model: &dyn RiskModel, x: &[f64]) -> Result<f64, ExternalCallError> {
        match model.predict_probability(x) {
            Some(result) => result.map(|[_, p1]| p1),
            None => model.predict(x),
        }
    }
}

impl Attributor for BaselineAttributor {
    fn attribute(
        &self,
        model: &dyn RiskModel,
        input: &[f64],
    ) -> Result<Vec<f64>, ExternalCallError> {
        let full = Self::positive_output(model, input)?;
        let mut occluded = input.to_vec();
        let mut attributions = Vec::with_capacity(input.len());
        for i in 0..input.len() {
            let original = occluded[i];
            occluded[i] = 0.0;
            let without = Self::positive_output(model, &occluded)?;
            occluded[i] = original;
            attributions.push(full - without);
        }
        Ok(attributions)
    }
}

pub struct Explainer {
    model: Option<Arc<dyn RiskModel>>,
    attributor: Arc<dyn Attributor>,
}

impl Explainer {
    pub fn unbound() -> Self {
        Self {
            model: None,
            attributor: Arc::new(BaselineAttributor),
        }
    }

    pub fn bound(model: Arc<dyn RiskModel>, attributor: Arc<dyn Attributor>) -> Self {
        Self {
            model: Some(model),
            attributor,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.model.is_some()
    }

    /// Explain `prediction` for `input`. Never fails: errors yield an empty vector.
    pub fn explain(&self, input: &[f64], prediction: f64) -> ExplanationPayload {
        let Some(model) = &self.model else {
            tracing::debug!("Explainer has no bound model, returning placeholder attributions");
            return ExplanationPayload {
                attributions: PLACEHOLDER_ATTRIBUTIONS.to_vec(),
                plot_base64: None,
                note: Some("No model bound; placeholder attributions.".into()),
            };
        };

        if input.is_empty() {
            return ExplanationPayload {
                attributions: Vec::new(),
                plot_base64: None,
                note: Some("Nothing to explain.".into()),
            };
        }

        match self.attributor.attribute(model.as_ref(), input) {
            Ok(attributions) => {
                tracing::debug!(features = attributions.len(), prediction, "Generated explanation");
                let plot_base64 = Some(plot::attribution_chart_base64(&attributions));
                ExplanationPayload {
                    attributions,
                    plot_base64,
                    note: Some(format!(
                        "Attributions relative to an all-zero baseline for predicted risk {prediction:.3}."
                    )),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Explainability error");
                ExplanationPayload {
                    attributions: Vec::new(),
                    plot_base64: None,
                    note: Some("Explanation unavailable.".into()),
                }
            }
        }
    }
}
