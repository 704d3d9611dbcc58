//! Risk scoring: mapping scores → calibrated per-disease probabilities.

pub mod features;
pub mod model;
pub mod registry;
pub mod scorer;

pub use features::{EncoderKind, MappingScoreEncoder, SymptomIndicatorEncoder};
pub use model::ModelArtifact;
pub use registry::{BoundModel, FileModelRegistry, ModelRegistry, ModelUri};
pub use scorer::RiskScorer;
