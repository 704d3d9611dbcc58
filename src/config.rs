use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::drift::DEFAULT_DRIFT_THRESHOLD;
use crate::pipeline::error::ConfigError;
use crate::pipeline::scoring::{EncoderKind, ModelUri};

/// Application-level constants
pub const APP_NAME: &str = "Calmora";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_MAPPING_CSV_PATH: &str = "ml/symptom_mapping.csv";
pub const DEFAULT_REFERENCE_DATA_PATH: &str = "data/processed/processed_data.csv";
pub const DEFAULT_DRIFT_LOG_PATH: &str = "logs/drift_events.log";
pub const DEFAULT_MODEL_REGISTRY_ROOT: &str = "models";
pub const DEFAULT_MODEL_URI: &str = "models:/disease_predictor/Production";
pub const DEFAULT_NER_TIMEOUT_SECS: u64 = 30;

/// Max request body size for the HTTP API.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "calmora=info,tower_http=info"
}

/// Runtime configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `CALMORA_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `MAPPING_CSV_PATH`
    pub mapping_csv_path: PathBuf,
    /// `REFERENCE_DATA_PATH`
    pub reference_data_path: PathBuf,
    /// `REFERENCE_DATA_REQUIRED`: fail startup when the reference cannot be loaded.
    pub reference_data_required: bool,
    /// `DRIFT_LOG_PATH`
    pub drift_log_path: PathBuf,
    /// `DRIFT_THRESHOLD`
    pub drift_threshold: f64,
    /// `MODEL_REGISTRY_ROOT`
    pub model_registry_root: PathBuf,
    /// `MODEL_URI`
    pub model_uri: ModelUri,
    /// `NER_ENDPOINT`: remote recognizer; unset selects the built-in lexicon.
    pub ner_endpoint: Option<String>,
    /// `NER_TIMEOUT_SECS`
    pub ner_timeout_secs: u64,
    /// `FEATURE_ENCODER`
    pub feature_encoder: EncoderKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            mapping_csv_path: PathBuf::from(DEFAULT_MAPPING_CSV_PATH),
            reference_data_path: PathBuf::from(DEFAULT_REFERENCE_DATA_PATH),
            reference_data_required: false,
            drift_log_path: PathBuf::from(DEFAULT_DRIFT_LOG_PATH),
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            model_registry_root: PathBuf::from(DEFAULT_MODEL_REGISTRY_ROOT),
            model_uri: ModelUri {
                name: "disease_predictor".into(),
                reference: "Production".into(),
            },
            ner_endpoint: None,
            ner_timeout_secs: DEFAULT_NER_TIMEOUT_SECS,
            feature_encoder: EncoderKind::MappingScore,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let drift_threshold: f64 = parse_or(&get, "DRIFT_THRESHOLD", DEFAULT_DRIFT_THRESHOLD)?;
        if !(0.0..=1.0).contains(&drift_threshold) {
            return Err(ConfigError::InvalidSetting {
                key: "DRIFT_THRESHOLD",
                value: drift_threshold.to_string(),
                reason: "must be between 0 and 1".into(),
            });
        }

        let ner_timeout_secs: u64 = parse_or(&get, "NER_TIMEOUT_SECS", DEFAULT_NER_TIMEOUT_SECS)?;
        if ner_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "NER_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let model_uri = get("MODEL_URI")
            .unwrap_or_else(|| DEFAULT_MODEL_URI.to_string())
            .parse::<ModelUri>()?;
        let feature_encoder = match get("FEATURE_ENCODER") {
            Some(raw) => raw.parse::<EncoderKind>()?,
            None => EncoderKind::MappingScore,
        };

        Ok(Self {
            bind_addr: parse_or(
                &get,
                "CALMORA_BIND_ADDR",
                SocketAddr::from(([127, 0, 0, 1], 8000)),
            )?,
            mapping_csv_path: path_or(&get, "MAPPING_CSV_PATH", DEFAULT_MAPPING_CSV_PATH),
            reference_data_path: path_or(&get, "REFERENCE_DATA_PATH", DEFAULT_REFERENCE_DATA_PATH),
            reference_data_required: parse_flag(&get, "REFERENCE_DATA_REQUIRED")?,
            drift_log_path: path_or(&get, "DRIFT_LOG_PATH", DEFAULT_DRIFT_LOG_PATH),
            drift_threshold,
            model_registry_root: path_or(&get, "MODEL_REGISTRY_ROOT", DEFAULT_MODEL_REGISTRY_ROOT),
            model_uri,
            ner_endpoint: get("NER_ENDPOINT").map(|v| v.trim().to_string()),
            ner_timeout_secs,
            feature_encoder,
        })
    }
}

fn path_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> PathBuf {
    PathBuf::from(get(key).unwrap_or_else(|| default.to_string()))
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidSetting {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_flag(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<bool, ConfigError> {
    match get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::InvalidSetting {
            key,
            value: other.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.mapping_csv_path, PathBuf::from(DEFAULT_MAPPING_CSV_PATH));
        assert_eq!(config.drift_log_path, PathBuf::from(DEFAULT_DRIFT_LOG_PATH));
        assert_eq!(config.drift_threshold, 0.5);
        assert!(!config.reference_data_required);
        assert_eq!(config.model_uri.to_string(), DEFAULT_MODEL_URI);
        assert!(config.ner_endpoint.is_none());
        assert_eq!(config.feature_encoder, EncoderKind::MappingScore);
    }

    #[test]
    fn default_impl_matches_empty_environment() {
        let from_env = AppConfig::from_lookup(lookup(&[])).unwrap();
        let default = AppConfig::default();
        assert_eq!(from_env.bind_addr, default.bind_addr);
        assert_eq!(from_env.model_uri, default.model_uri);
        assert_eq!(from_env.reference_data_path, default.reference_data_path);
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CALMORA_BIND_ADDR", "0.0.0.0:9000"),
            ("DRIFT_THRESHOLD", "0.25"),
            ("REFERENCE_DATA_REQUIRED", "true"),
            ("MODEL_URI", "models:/triage/3"),
            ("NER_ENDPOINT", " http://localhost:8080/ner "),
            ("FEATURE_ENCODER", "symptom_indicators"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.drift_threshold, 0.25);
        assert!(config.reference_data_required);
        assert_eq!(config.model_uri.name, "triage");
        assert_eq!(config.ner_endpoint.as_deref(), Some("http://localhost:8080/ner"));
        assert_eq!(config.feature_encoder, EncoderKind::SymptomIndicators);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            AppConfig::from_lookup(lookup(&[("NER_ENDPOINT", "  "), ("DRIFT_THRESHOLD", "")]))
                .unwrap();
        assert!(config.ner_endpoint.is_none());
        assert_eq!(config.drift_threshold, DEFAULT_DRIFT_THRESHOLD);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for (key, value) in [
            ("DRIFT_THRESHOLD", "high"),
            ("DRIFT_THRESHOLD", "1.5"),
            ("NER_TIMEOUT_SECS", "0"),
            ("CALMORA_BIND_ADDR", "localhost"),
            ("REFERENCE_DATA_REQUIRED", "maybe"),
            ("FEATURE_ENCODER", "embeddings"),
        ] {
            let result = AppConfig::from_lookup(lookup(&[(key, value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidSetting { .. })),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_model_uri_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[("MODEL_URI", "s3://bucket/model")]));
        assert!(matches!(result, Err(ConfigError::InvalidModelUri(_))));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
