//! Per-request domain types shared by the pipeline stages and the API layer.

pub mod assessment;
pub mod symptom;

pub use assessment::{rank_risks, Assessment, DiseaseRisk, DiseaseScoreMap, RiskMap};
pub use symptom::{SymptomSet, SymptomToken};
