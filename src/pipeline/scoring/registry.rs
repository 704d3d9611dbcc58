//! Model registry: resolves `models:/<name>/<stage-or-version>` to a bound classifier.
//!
//! `FileModelRegistry` lays artifacts out as
//! `<root>/<name>/<stage-or-version>/model.json`. The reference `latest`
//! picks the highest numeric version directory.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use super::model::ModelArtifact;
use crate::pipeline::error::ConfigError;
use crate::pipeline::traits::RiskModel;

pub const MODEL_URI_SCHEME: &str = "models:/";
pub const ARTIFACT_FILE: &str = "model.json";

/// Parsed `models:/<name>/<reference>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUri {
    pub name: String,
    /// Stage ("Production", "Staging"), numeric version, or "latest".
    pub reference: String,
}

impl FromStr for ModelUri {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidModelUri(s.to_string());
        let rest = s.trim().strip_prefix(MODEL_URI_SCHEME).ok_or_else(invalid)?;
        let (name, reference) = rest.split_once('/').ok_or_else(invalid)?;
        let valid_part = |p: &str| {
            !p.is_empty()
                && p
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
                && p != "."
                && p != ".."
        };
        if !valid_part(name) || !valid_part(reference) {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_string(),
            reference: reference.to_string(),
        })
    }
}

impl fmt::Display for ModelUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MODEL_URI_SCHEME}{}/{}", self.name, self.reference)
    }
}

/// A classifier bound from the registry, with the reference it resolved to.
#[derive(Clone)]
pub struct BoundModel {
    pub uri: ModelUri,
    /// Concrete stage/version directory the URI resolved to.
    pub resolved: String,
    pub model: Arc<dyn RiskModel>,
}

impl fmt::Debug for BoundModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundModel")
            .field("uri", &self.uri)
            .field("resolved", &self.resolved)
            .field("n_features", &self.model.n_features())
            .finish()
    }
}

pub trait ModelRegistry: Send + Sync {
    fn load(&self, uri: &ModelUri) -> Result<BoundModel, ConfigError>;
}

pub struct FileModelRegistry {
    root: PathBuf,
}

impl FileModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve_reference(&self, uri: &ModelUri) -> Result<String, ConfigError> {
        if uri.reference != "latest" {
            return Ok(uri.reference.clone());
        }
        let model_dir = self.root.join(&uri.name);
        let not_found = || ConfigError::ModelNotFound {
            name: uri.name.clone(),
            stage: uri.reference.clone(),
            path: model_dir.clone(),
        };
        let entries = std::fs::read_dir(&model_dir).map_err(|_| not_found())?;
        entries
            .filter_map(Result::ok)
            .filter(|e| e.path().join(ARTIFACT_FILE).is_file())
            .filter_map(|e| e.file_name().to_str()?.parse::<u64>().ok())
            .max()
            .map(|v| v.to_string())
            .ok_or_else(not_found)
    }
}

impl ModelRegistry for FileModelRegistry {
    fn load(&self, uri: &ModelUri) -> Result<BoundModel, ConfigError> {
        let resolved = self.resolve_reference(uri)?;
        let path = self.root.join(&uri.name).join(&resolved).join(ARTIFACT_FILE);
        if !path.is_file() {
            return Err(ConfigError::ModelNotFound {
                name: uri.name.clone(),
                stage: resolved,
                path,
            });
        }

        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::ModelArtifact {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ModelArtifact {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        artifact
            .validate()
            .map_err(|reason| ConfigError::ModelArtifact {
                path: path.clone(),
                reason,
            })?;

        tracing::info!(
            %uri,
            resolved = %resolved,
            n_features = artifact.n_features(),
            "Loaded model from registry"
        );
        Ok(BoundModel {
            uri: uri.clone(),
            resolved,
            model: Arc::new(artifact),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write_artifact(root: &Path, name: &str, reference: &str, json: &str) {
        let dir = root.join(name).join(reference);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(ARTIFACT_FILE), json).unwrap();
    }

    const LOGISTIC: &str = r#"{"kind":"logistic","weights":[3.0],"bias":-1.5}"#;

    #[test]
    fn parses_stage_uri() {
        let uri: ModelUri = "models:/disease_predictor/Production".parse().unwrap();
        assert_eq!(uri.name, "disease_predictor");
        assert_eq!(uri.reference, "Production");
        assert_eq!(uri.to_string(), "models:/disease_predictor/Production");
    }

    #[test]
    fn rejects_malformed_uris() {
        for bad in [
            "disease_predictor/Production",
            "models:/disease_predictor",
            "models://Production",
            "models:/../etc",
            "models:/a/b/c",
            "runs:/abc/model",
        ] {
            assert!(bad.parse::<ModelUri>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn loads_stage_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "disease_predictor", "Production", LOGISTIC);
        let registry = FileModelRegistry::new(dir.path());

        let bound = registry
            .load(&"models:/disease_predictor/Production".parse().unwrap())
            .unwrap();
        assert_eq!(bound.resolved, "Production");
        assert_eq!(bound.model.n_features(), 1);
    }

    #[test]
    fn latest_picks_highest_version() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "m", "2", LOGISTIC);
        write_artifact(dir.path(), "m", "10", LOGISTIC);
        write_artifact(dir.path(), "m", "Staging", LOGISTIC);
        let registry = FileModelRegistry::new(dir.path());

        let bound = registry.load(&"models:/m/latest".parse().unwrap()).unwrap();
        assert_eq!(bound.resolved, "10");
    }

    #[test]
    fn missing_model_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileModelRegistry::new(dir.path());
        let err = registry
            .load(&"models:/absent/Production".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ModelNotFound { .. }));
    }

    #[test]
    fn overflowing_threshold_feature_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            "m",
            "Production",
            r#"{"kind":"threshold","feature":18446744073709551615,"cutoff":0.5}"#,
        );
        let registry = FileModelRegistry::new(dir.path());
        let err = registry.load(&"models:/m/Production".parse().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::ModelArtifact { .. }));
    }

    #[test]
    fn invalid_artifact_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "m", "1", r#"{"kind":"logistic","weights":[],"bias":0}"#);
        write_artifact(dir.path(), "m", "2", "not json");
        let registry = FileModelRegistry::new(dir.path());

        for reference in ["1", "2"] {
            let uri = ModelUri {
                name: "m".into(),
                reference: reference.into(),
            };
            assert!(matches!(
                registry.load(&uri).unwrap_err(),
                ConfigError::ModelArtifact { .. }
            ));
        }
    }
}
