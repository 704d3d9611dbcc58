use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::comparator::ComparisonResult;
use super::dataset::{Dataset, FeatureRow};
use crate::pipeline::error::{ConfigError, ExternalCallError};
use crate::pipeline::traits::DriftComparator;

pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.5;

/// Outcome of one drift check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriftReport {
    pub drift_detected: bool,
    pub drift_score: f64,
    /// Full comparator output; `None` for no-op or failed checks.
    pub raw_report: Option<ComparisonResult>,
}

/// Append-only drift audit log. Writes are serialized so lines never interleave.
pub struct DriftLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DriftLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, drift_score: f64, drift_detected: bool) -> Result<(), ExternalCallError> {
        let line = format!(
            "{} | Drift Score: {:.3} | Drift Detected: {}\n",
            chrono::Local::now().to_rfc3339(),
            drift_score,
            drift_detected
        );

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ExternalCallError::Computation("drift log lock poisoned".into()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Compares request features against a reference distribution.
///
/// Without reference data the monitor is a no-op that always reports no drift.
pub struct DriftMonitor {
    reference: Option<Arc<Dataset>>,
    comparator: Arc<dyn DriftComparator>,
    threshold: f64,
    log: DriftLog,
}

impl DriftMonitor {
    pub fn new(
        reference: Option<Dataset>,
        comparator: Arc<dyn DriftComparator>,
        threshold: f64,
        log: DriftLog,
    ) -> Self {
        Self {
            reference: reference.map(Arc::new),
            comparator,
            threshold,
            log,
        }
    }

    /// Load reference data from `path`.
    ///
    /// A missing or unreadable reference degrades the monitor to a no-op,
    /// unless `required` is set, in which case startup fails.
    pub fn load(
        path: &Path,
        required: bool,
        comparator: Arc<dyn DriftComparator>,
        threshold: f64,
        log: DriftLog,
    ) -> Result<Self, ConfigError> {
        let reference = match Dataset::load(path) {
            Ok(data) => {
                tracing::info!(
                    path = %path.display(),
                    rows = data.n_rows(),
                    columns = data.columns().len(),
                    "Loaded reference data for drift monitoring"
                );
                Some(data)
            }
            Err(e) if required => {
                return Err(ConfigError::ReferenceDataRequired {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Reference data unavailable, drift monitoring disabled"
                );
                None
            }
        };
        Ok(Self::new(reference, comparator, threshold, log))
    }

    pub fn is_active(&self) -> bool {
        self.reference.is_some()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Check a batch of feature rows. Never fails.
    pub fn check_drift(&self, current_batch: &[FeatureRow]) -> DriftReport {
        self.check_dataset(&Dataset::from_rows(current_batch))
    }

    /// Check a whole dataset. Never fails.
    pub fn check_dataset(&self, current: &Dataset) -> DriftReport {
        let Some(reference) = &self.reference else {
            tracing::debug!("No reference data loaded for drift check");
            return DriftReport::default();
        };

        match self.compare_and_log(reference, current) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Drift check failed");
                DriftReport::default()
            }
        }
    }

    fn compare_and_log(
        &self,
        reference: &Dataset,
        current: &Dataset,
    ) -> Result<DriftReport, ExternalCallError> {
        let result = self.comparator.compare(reference, current)?;
        let drift_score = result.dataset_drift_score;
        let drift_detected = drift_score > self.threshold;
        self.log.append(drift_score, drift_detected)?;

        if drift_detected {
            tracing::warn!(
                drift_score,
                threshold = self.threshold,
                "Data drift detected"
            );
        } else {
            tracing::info!(drift_score, "No data drift detected");
        }

        Ok(DriftReport {
            drift_detected,
            drift_score,
            raw_report: Some(result),
        })
    }
}
