pub mod drift;
pub mod error;
pub mod explain;
pub mod extraction;
pub mod mapping;
pub mod orchestrator;
pub mod safety;
pub mod scoring;
pub mod traits;

pub use error::{ConfigError, ExternalCallError, PipelineError};
pub use orchestrator::{Stage, SymptomPipeline, MAX_INPUT_CHARS};
