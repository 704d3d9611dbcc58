//! Default drift comparator.
//!
//! Columns present in both datasets are compared one by one:
//! - numeric: two-sample Kolmogorov–Smirnov statistic (max CDF distance)
//! - categorical: total variation distance between category frequencies
//!
//! Both statistics live in [0, 1]. The dataset-level score is their mean
//! over compared columns.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::dataset::{Column, ColumnKind, Dataset};
use crate::pipeline::error::ExternalCallError;
use crate::pipeline::traits::DriftComparator;

/// Per-column statistic above which a column counts as drifted.
pub const DEFAULT_COLUMN_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDrift {
    pub column: String,
    pub kind: ColumnKind,
    pub statistic: f64,
    pub drifted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Mean per-column statistic; 0.0 when no column could be compared.
    pub dataset_drift_score: f64,
    pub share_of_drifted_columns: f64,
    pub columns: Vec<ColumnDrift>,
}

#[derive(Debug, Clone, Copy)]
pub struct KsDriftComparator {
    column_threshold: f64,
}

impl KsDriftComparator {
    pub fn new(column_threshold: f64) -> Self {
        Self { column_threshold }
    }
}

impl Default for KsDriftComparator {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_THRESHOLD)
    }
}

impl DriftComparator for KsDriftComparator {
    fn compare(
        &self,
        reference: &Dataset,
        current: &Dataset,
    ) -> Result<ComparisonResult, ExternalCallError> {
        let mut columns = Vec::new();
        for ref_col in reference.columns() {
            let Some(cur_col) = current.column(&ref_col.name) else {
                continue;
            };
            if ref_col.present_count() == 0 || cur_col.present_count() == 0 {
                continue;
            }

            let numeric = ref_col.kind() == ColumnKind::Numeric
                && cur_col.kind() == ColumnKind::Numeric;
            let (kind, statistic) = if numeric {
                (
                    ColumnKind::Numeric,
                    ks_statistic(ref_col.numbers(), cur_col.numbers()),
                )
            } else {
                (ColumnKind::Categorical, total_variation(ref_col, cur_col))
            };
            if !statistic.is_finite() {
                return Err(ExternalCallError::Computation(format!(
                    "drift statistic for column '{}' is not finite",
                    ref_col.name
                )));
            }

            columns.push(ColumnDrift {
                column: ref_col.name.clone(),
                kind,
                statistic,
                drifted: statistic > self.column_threshold,
            });
        }

        if columns.is_empty() {
            tracing::debug!("No comparable columns between reference and current data");
            return Ok(ComparisonResult {
                dataset_drift_score: 0.0,
                share_of_drifted_columns: 0.0,
                columns,
            });
        }

        let n = columns.len() as f64;
        let dataset_drift_score = columns.iter().map(|c| c.statistic).sum::<f64>() / n;
        let share_of_drifted_columns = columns.iter().filter(|c| c.drifted).count() as f64 / n;
        Ok(ComparisonResult {
            dataset_drift_score,
            share_of_drifted_columns,
            columns,
        })
    }
}

/// Two-sample Kolmogorov–Smirnov statistic `sup |F_a(x) - F_b(x)|`.
pub fn ks_statistic(mut a: Vec<f64>, mut b: Vec<f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);
    let (n, m) = (a.len() as f64, b.len() as f64);

    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }
    d
}

fn frequencies(labels: Vec<String>) -> BTreeMap<String, f64> {
    let total = labels.len() as f64;
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0.0) += 1.0;
    }
    counts.values_mut().for_each(|c| *c /= total);
    counts
}

/// Total variation distance between the category distributions of two columns.
fn total_variation(reference: &Column, current: &Column) -> f64 {
    let p = frequencies(reference.labels());
    let q = frequencies(current.labels());
    let categories: BTreeSet<&String> = p.keys().chain(q.keys()).collect();
    0.5 * categories
        .into_iter()
        .map(|c| (p.get(c).unwrap_or(&0.0) - q.get(c).unwrap_or(&0.0)).abs())
        .sum::<f64>()
}
