//! Data drift monitoring for request features.

pub mod comparator;
pub mod dataset;
pub mod monitor;
pub mod report;

pub use comparator::{ColumnDrift, ComparisonResult, KsDriftComparator};
pub use dataset::{Cell, Dataset, FeatureRow};
pub use monitor::{DriftLog, DriftMonitor, DriftReport, DEFAULT_DRIFT_THRESHOLD};
pub use report::{compare_files, write_report, DriftReportError, FileDriftReport};
