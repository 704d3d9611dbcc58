//! Error taxonomy for the symptom pipeline.
//!
//! - `ConfigError`: fatal, raised only while building components at startup.
//! - `ExternalCallError`: a collaborator call failed; always absorbed at the
//!   component boundary into that component's degraded output.
//! - `PipelineError`: terminal for one request; surfaces as an opaque 500.

use std::path::PathBuf;

use thiserror::Error;

use super::orchestrator::Stage;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Mapping table not found: {0}")]
    MappingSourceMissing(PathBuf),

    #[error("Mapping table {path} is unreadable: {reason}")]
    MappingSourceUnreadable { path: PathBuf, reason: String },

    #[error("Mapping table row {line} is malformed: {reason}")]
    MalformedMappingRow { line: u64, reason: String },

    #[error("Drift reference data is required but could not be loaded from {path}: {reason}")]
    ReferenceDataRequired { path: PathBuf, reason: String },

    #[error("Invalid model URI '{0}' (expected models:/<name>/<stage-or-version>)")]
    InvalidModelUri(String),

    #[error("Model '{name}' has no artifact for '{stage}' at {path}")]
    ModelNotFound {
        name: String,
        stage: String,
        path: PathBuf,
    },

    #[error("Model artifact {path} is invalid: {reason}")]
    ModelArtifact { path: PathBuf, reason: String },

    #[error("Feature encoder '{encoder}' yields {encoder_width} features but the model expects {model_width}")]
    FeatureWidthMismatch {
        encoder: &'static str,
        encoder_width: usize,
        model_width: usize,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidSetting {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),
}

#[derive(Error, Debug)]
pub enum ExternalCallError {
    #[error("{service} unreachable at {endpoint}")]
    Unreachable {
        service: &'static str,
        endpoint: String,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response could not be decoded: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },

    #[error("Feature vector has {actual} values, model expects {expected}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input text exceeds {max} characters ({actual})")]
    InputTooLong { actual: usize, max: usize },

    #[error("Inconsistent result after stage {stage}: {detail}")]
    Inconsistent { stage: Stage, detail: String },

    #[error("Pipeline worker failed: {0}")]
    Worker(String),
}
