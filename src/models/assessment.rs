use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::symptom::SymptomSet;
use crate::pipeline::drift::DriftReport;
use crate::pipeline::explain::ExplanationPayload;

/// Disease → normalized mapping score in [0, 1]. The best-supported disease scores 1.0.
pub type DiseaseScoreMap = BTreeMap<String, f64>;

/// Disease → positive-class probability in [0, 1].
pub type RiskMap = BTreeMap<String, f64>;

/// One ranked entry of the response's risk list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRisk {
    pub disease: String,
    pub risk_score: f64,
}

/// Everything one symptom check produces, assembled fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub symptoms: SymptomSet,
    /// Sorted by descending risk, ties broken by disease name.
    pub risk: Vec<DiseaseRisk>,
    pub message: String,
    pub explanation: ExplanationPayload,
    pub tips: Vec<String>,
    /// Drift telemetry for this request. Not part of the client payload.
    #[serde(skip)]
    pub drift: DriftReport,
}

/// Flatten a risk map into the ranked list the client sees.
pub fn rank_risks(risk: &RiskMap) -> Vec<DiseaseRisk> {
    let mut ranked: Vec<DiseaseRisk> = risk
        .iter()
        .map(|(disease, score)| DiseaseRisk {
            disease: disease.clone(),
            risk_score: *score,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.disease.cmp(&b.disease))
    });
    ranked
}
