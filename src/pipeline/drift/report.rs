//! Offline drift report: compare two CSV files and write the result as JSON.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::comparator::{ColumnDrift, ComparisonResult};
use super::dataset::Dataset;
use crate::pipeline::error::ExternalCallError;
use crate::pipeline::traits::DriftComparator;

#[derive(Error, Debug)]
pub enum DriftReportError {
    #[error("Cannot load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Comparison failed: {0}")]
    Compare(#[from] ExternalCallError),

    #[error("Cannot write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDriftReport {
    pub generated_at: String,
    pub reference: PathBuf,
    pub current: PathBuf,
    pub reference_rows: usize,
    pub current_rows: usize,
    pub threshold: f64,
    pub drift_detected: bool,
    pub drift_score: f64,
    pub share_of_drifted_columns: f64,
    pub columns: Vec<ColumnDrift>,
}

fn load(path: &Path) -> Result<Dataset, DriftReportError> {
    Dataset::load(path).map_err(|source| DriftReportError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Compare `current` against `reference` with `comparator`.
pub fn compare_files(
    reference: &Path,
    current: &Path,
    threshold: f64,
    comparator: &dyn DriftComparator,
) -> Result<FileDriftReport, DriftReportError> {
    let reference_data = load(reference)?;
    let current_data = load(current)?;
    let ComparisonResult {
        dataset_drift_score,
        share_of_drifted_columns,
        columns,
    } = comparator.compare(&reference_data, &current_data)?;

    Ok(FileDriftReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        reference: reference.to_path_buf(),
        current: current.to_path_buf(),
        reference_rows: reference_data.n_rows(),
        current_rows: current_data.n_rows(),
        threshold,
        drift_detected: dataset_drift_score > threshold,
        drift_score: dataset_drift_score,
        share_of_drifted_columns,
        columns,
    })
}

/// Write `report` as pretty JSON, creating the parent directory if needed.
pub fn write_report(report: &FileDriftReport, output: &Path) -> Result<(), DriftReportError> {
    let write_err = |source: std::io::Error| DriftReportError::Write {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(output, json).map_err(write_err)?;
    tracing::info!(path = %output.display(), "Drift report saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::drift::KsDriftComparator;

    #[test]
    fn shifted_file_is_reported_as_drift() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.csv");
        let current = dir.path().join("cur.csv");
        std::fs::write(&reference, "flu,cold\n0,0\n0,0\n").unwrap();
        std::fs::write(&current, "flu,cold\n1,1\n1,1\n").unwrap();

        let report =
            compare_files(&reference, &current, 0.5, &KsDriftComparator::default()).unwrap();
        assert!(report.drift_detected);
        assert_eq!(report.drift_score, 1.0);
        assert_eq!(report.columns.len(), 2);

        let output = dir.path().join("reports").join("drift.json");
        write_report(&report, &output).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["drift_detected"], true);
        assert_eq!(json["columns"][0]["kind"], "numeric");
    }

    #[test]
    fn missing_input_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = compare_files(
            &dir.path().join("absent.csv"),
            &dir.path().join("absent.csv"),
            0.5,
            &KsDriftComparator::default(),
        );
        assert!(matches!(result, Err(DriftReportError::Load { .. })));
    }
}
