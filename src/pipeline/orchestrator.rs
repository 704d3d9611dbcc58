//! Per-request symptom assessment.
//!
//! `Received → Extracted → Mapped → Scored → DriftChecked → Explained →
//! Composed → Responded`. Every stage is a direct call into one component;
//! components degrade on their own, so only broken invariants abort a request.

use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{rank_risks, Assessment, DiseaseScoreMap, RiskMap};
use crate::pipeline::drift::{Cell, DriftLog, DriftMonitor, FeatureRow, KsDriftComparator};
use crate::pipeline::error::{ConfigError, PipelineError};
use crate::pipeline::explain::{BaselineAttributor, ExplanationPayload, Explainer};
use crate::pipeline::extraction::{HttpEntityRecognizer, LexiconRecognizer, SymptomExtractor};
use crate::pipeline::mapping::{DiseaseMapper, MappingTable};
use crate::pipeline::safety::{scan_language, LifestyleAdvisor, MessageComposer};
use crate::pipeline::scoring::{
    EncoderKind, FileModelRegistry, MappingScoreEncoder, ModelRegistry, RiskScorer,
    SymptomIndicatorEncoder,
};
use crate::pipeline::traits::{EntityRecognizer, FeatureEncoder};

/// Longest accepted input, in characters.
pub const MAX_INPUT_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracted,
    Mapped,
    Scored,
    DriftChecked,
    Explained,
    Composed,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::Mapped => "mapped",
            Stage::Scored => "scored",
            Stage::DriftChecked => "drift_checked",
            Stage::Explained => "explained",
            Stage::Composed => "composed",
            Stage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// The assembled pipeline. Immutable after construction; share it behind an `Arc`.
pub struct SymptomPipeline {
    extractor: SymptomExtractor,
    mapper: DiseaseMapper,
    scorer: RiskScorer,
    drift: DriftMonitor,
    explainer: Explainer,
    composer: MessageComposer,
    advisor: LifestyleAdvisor,
    model_label: String,
}

impl SymptomPipeline {
    pub fn new(
        extractor: SymptomExtractor,
        mapper: DiseaseMapper,
        scorer: RiskScorer,
        drift: DriftMonitor,
        explainer: Explainer,
    ) -> Self {
        Self {
            extractor,
            mapper,
            scorer,
            drift,
            explainer,
            composer: MessageComposer::new(),
            advisor: LifestyleAdvisor::new(),
            model_label: "unnamed".to_string(),
        }
    }

    pub fn with_model_label(mut self, label: impl Into<String>) -> Self {
        self.model_label = label.into();
        self
    }

    pub fn model_label(&self) -> &str {
        &self.model_label
    }

    pub fn drift_monitor_active(&self) -> bool {
        self.drift.is_active()
    }

    pub fn drift_threshold(&self) -> f64 {
        self.drift.threshold()
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.extractor.recognizer_name()
    }

    pub fn explainer_bound(&self) -> bool {
        self.explainer.is_bound()
    }

    /// Feature width every `/predict` and `/explain` row must have.
    pub fn n_features(&self) -> usize {
        self.scorer.model().n_features()
    }

    /// Run one free-text symptom description through every stage.
    pub fn assess(&self, text: &str) -> Result<Assessment, PipelineError> {
        let chars = text.chars().count();
        if chars > MAX_INPUT_CHARS {
            return Err(PipelineError::InputTooLong {
                actual: chars,
                max: MAX_INPUT_CHARS,
            });
        }
        tracing::debug!(stage = %Stage::Received, chars, "Assessment started");

        let symptoms = self.extractor.extract(text);
        tracing::debug!(stage = %Stage::Extracted, symptoms = symptoms.len());

        let disease_scores = self.mapper.map(&symptoms);
        tracing::debug!(stage = %Stage::Mapped, diseases = disease_scores.len());

        let risk = self.scorer.score_probabilities(&disease_scores, &symptoms);
        ensure_scored_every_disease(&disease_scores, &risk)?;
        tracing::debug!(stage = %Stage::Scored, diseases = risk.len());

        let drift = self.drift.check_drift(&[drift_row(&disease_scores)]);
        tracing::debug!(
            stage = %Stage::DriftChecked,
            drift_detected = drift.drift_detected,
            drift_score = drift.drift_score
        );

        let ranked = rank_risks(&risk);
        let explanation = match ranked.first() {
            Some(top) => {
                let mapping_score = disease_scores.get(&top.disease).copied().unwrap_or(0.0);
                let features = self.scorer.features_for(&top.disease, mapping_score, &symptoms);
                self.explainer.explain(&features, top.risk_score)
            }
            None => self.explainer.explain(&[], 0.0),
        };
        tracing::debug!(stage = %Stage::Explained, attributions = explanation.attributions.len());

        let message = self.composer.compose(&risk).to_string();
        let tips = self.advisor.recommend(&symptoms, &risk);
        check_wording(&message, &tips);
        tracing::debug!(stage = %Stage::Composed, tips = tips.len());

        tracing::info!(
            stage = %Stage::Responded,
            symptoms = symptoms.len(),
            diseases = ranked.len(),
            top_risk = ranked.first().map(|r| r.risk_score).unwrap_or(0.0),
            "Symptom assessment complete"
        );

        Ok(Assessment {
            symptoms,
            risk: ranked,
            message,
            explanation,
            tips,
            drift,
        })
    }

    /// Raw class probabilities for pre-built feature rows.
    ///
    /// Rows must already have `n_features()` values. A row the model fails on
    /// yields `[0.0, 0.0]`.
    pub fn predict_rows(&self, rows: &[Vec<f64>]) -> Vec<[f64; 2]> {
        rows.iter()
            .map(|row| {
                self.scorer.class_probabilities(row).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Prediction failed for row");
                    [0.0, 0.0]
                })
            })
            .collect()
    }

    /// Attributions for pre-built feature rows, explained against the positive class.
    pub fn explain_rows(&self, rows: &[Vec<f64>]) -> Vec<ExplanationPayload> {
        rows.iter()
            .map(|row| {
                let prediction = self
                    .scorer
                    .class_probabilities(row)
                    .map(|[_, p1]| p1)
                    .unwrap_or(0.0);
                self.explainer.explain(row, prediction)
            })
            .collect()
    }
}

fn drift_row(disease_scores: &DiseaseScoreMap) -> FeatureRow {
    disease_scores
        .iter()
        .map(|(disease, score)| (disease.clone(), Cell::Number(*score)))
        .collect()
}

fn ensure_scored_every_disease(
    disease_scores: &DiseaseScoreMap,
    risk: &RiskMap,
) -> Result<(), PipelineError> {
    if disease_scores.keys().ne(risk.keys()) {
        return Err(PipelineError::Inconsistent {
            stage: Stage::Scored,
            detail: format!(
                "{} diseases mapped but {} scored",
                disease_scores.len(),
                risk.len()
            ),
        });
    }
    Ok(())
}

fn check_wording(message: &str, tips: &[String]) {
    for text in std::iter::once(message).chain(tips.iter().map(String::as_str)) {
        for m in scan_language(text) {
            tracing::warn!(
                category = ?m.category,
                matched = %m.matched_text,
                reason = m.reason,
                "User-facing text contains flagged wording"
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Construction from configuration
// ═══════════════════════════════════════════════════════════════════════

impl SymptomPipeline {
    /// Build every component from configuration. Any failure here is fatal at startup.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let recognizer: Arc<dyn EntityRecognizer> = match &config.ner_endpoint {
            Some(endpoint) => {
                Arc::new(HttpEntityRecognizer::new(endpoint, config.ner_timeout_secs)?)
            }
            None => Arc::new(LexiconRecognizer::new()),
        };
        let extractor = SymptomExtractor::new(recognizer);

        let table = Arc::new(MappingTable::load(&config.mapping_csv_path)?);

        let bound = FileModelRegistry::new(&config.model_registry_root).load(&config.model_uri)?;
        tracing::info!(
            uri = %bound.uri,
            resolved = %bound.resolved,
            n_features = bound.model.n_features(),
            "Bound risk model"
        );

        let encoder: Arc<dyn FeatureEncoder> = match config.feature_encoder {
            EncoderKind::MappingScore => Arc::new(MappingScoreEncoder),
            EncoderKind::SymptomIndicators => Arc::new(SymptomIndicatorEncoder::from_table(&table)),
        };
        let scorer = RiskScorer::new(Arc::clone(&bound.model), encoder)?;

        let drift = DriftMonitor::load(
            &config.reference_data_path,
            config.reference_data_required,
            Arc::new(KsDriftComparator::default()),
            config.drift_threshold,
            DriftLog::new(&config.drift_log_path),
        )?;

        let explainer = Explainer::bound(Arc::clone(&bound.model), Arc::new(BaselineAttributor));
        let model_label = format!("{} ({})", bound.uri, bound.resolved);

        Ok(Self::new(
            extractor,
            DiseaseMapper::new(table),
            scorer,
            drift,
            explainer,
        )
        .with_model_label(model_label))
    }
}
