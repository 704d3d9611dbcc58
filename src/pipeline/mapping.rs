//! Symptom → disease mapping.
//!
//! The mapping table is a CSV with columns `symptom,disease[,weight]`,
//! parsed and validated once at startup. A single malformed row rejects the
//! whole table. The mapper sums matched weights per disease and normalizes
//! by the largest sum, so the best-supported disease always scores 1.0.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::error::ConfigError;
use crate::models::{DiseaseScoreMap, SymptomSet, SymptomToken};

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// One validated row of the mapping table.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRow {
    pub symptom: SymptomToken,
    pub disease: String,
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
struct RawMappingRow {
    #[serde(default)]
    symptom: Option<String>,
    #[serde(default)]
    disease: Option<String>,
    #[serde(default)]
    weight: Option<String>,
}

/// Immutable, indexed symptom → disease table.
#[derive(Debug, Default)]
pub struct MappingTable {
    rows: Vec<MappingRow>,
    by_symptom: HashMap<SymptomToken, Vec<usize>>,
}

impl MappingTable {
    /// Load and validate the table from a CSV file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::error!(path = %path.display(), "Mapping file not found");
            return Err(ConfigError::MappingSourceMissing(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| ConfigError::MappingSourceUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            symptoms = table.by_symptom.len(),
            "Loaded symptom mapping table"
        );
        Ok(table)
    }

    /// Parse a table from any CSV source.
    pub fn from_reader<R: io::Read>(source: R) -> Result<Self, ConfigError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| malformed(1, e.to_string()))?
            .clone();
        for required in ["symptom", "disease"] {
            if !headers.iter().any(|h| h == required) {
                return Err(malformed(1, format!("missing column '{required}'")));
            }
        }

        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    return Err(malformed(line, e.to_string()));
                }
            }
            let line = record.position().map_or(0, |p| p.line());
            let raw: RawMappingRow = record
                .deserialize(Some(&headers))
                .map_err(|e| malformed(line, e.to_string()))?;
            rows.push(validate_row(raw, line)?);
        }

        Ok(Self::from_rows(rows))
    }

    /// Build a table from already-validated rows.
    pub fn from_rows(rows: Vec<MappingRow>) -> Self {
        let mut by_symptom: HashMap<SymptomToken, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            by_symptom.entry(row.symptom.clone()).or_default().push(idx);
        }
        Self { rows, by_symptom }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    /// Rows whose symptom equals `symptom` (case-insensitive), in table order.
    pub fn rows_for<'a>(&'a self, symptom: &SymptomToken) -> impl Iterator<Item = &'a MappingRow> {
        self.by_symptom
            .get(symptom)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rows[idx])
    }
}

fn malformed(line: u64, reason: String) -> ConfigError {
    ConfigError::MalformedMappingRow { line, reason }
}

fn validate_row(raw: RawMappingRow, line: u64) -> Result<MappingRow, ConfigError> {
    let symptom = raw
        .symptom
        .as_deref()
        .and_then(SymptomToken::new)
        .ok_or_else(|| malformed(line, "symptom is empty".into()))?;

    let disease = raw
        .disease
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| malformed(line, "disease is empty".into()))?
        .to_string();

    let weight = match raw.weight.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_WEIGHT,
        Some(value) => {
            let parsed: f64 = value
                .parse()
                .map_err(|_| malformed(line, format!("weight '{value}' is not a number")))?;
            if !parsed.is_finite() || parsed < 0.0 {
                return Err(malformed(
                    line,
                    format!("weight must be a finite value >= 0, got {value}"),
                ));
            }
            parsed
        }
    };

    Ok(MappingRow {
        symptom,
        disease,
        weight,
    })
}

pub struct DiseaseMapper {
    table: Arc<MappingTable>,
}

impl DiseaseMapper {
    pub fn new(table: Arc<MappingTable>) -> Self {
        Self { table }
    }

    /// Score candidate diseases for a symptom set.
    ///
    /// Returns an empty map when nothing matched (or every matched weight is 0).
    pub fn map(&self, symptoms: &SymptomSet) -> DiseaseScoreMap {
        let mut totals = DiseaseScoreMap::new();
        for symptom in symptoms.iter() {
            for row in self.table.rows_for(symptom) {
                *totals.entry(row.disease.clone()).or_insert(0.0) += row.weight;
            }
        }

        let max = totals.values().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            if !totals.is_empty() {
                tracing::debug!(matched = totals.len(), "All matched weights are zero");
            }
            return DiseaseScoreMap::new();
        }

        for score in totals.values_mut() {
            *score /= max;
        }
        tracing::debug!(diseases = totals.len(), "Mapped symptoms to disease scores");
        totals
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const SAMPLE: &str = "\
symptom,disease,weight
fever,flu,2.0
cough,flu,1.0
fever,covid,1.5
cough,covid,
Shortness of Breath,covid,2
headache,migraine,3
nausea,migraine,1
";

    fn mapper() -> DiseaseMapper {
        let table = MappingTable::from_reader(SAMPLE.as_bytes()).unwrap();
        DiseaseMapper::new(Arc::new(table))
    }

    fn set(items: &[&str]) -> SymptomSet {
        items.iter().copied().collect()
    }

    #[test]
    fn parses_rows_with_default_weight() {
        let table = MappingTable::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 7);
        let cough_covid = &table.rows()[3];
        assert_eq!(cough_covid.disease, "covid");
        assert_eq!(cough_covid.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn weight_column_is_optional() {
        let table = MappingTable::from_reader("symptom,disease\nfever,flu\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0].weight, 1.0);
    }

    #[test]
    fn empty_set_maps_to_empty() {
        assert!(mapper().map(&SymptomSet::new()).is_empty());
    }

    #[test]
    fn unknown_symptoms_map_to_empty() {
        assert!(mapper().map(&set(&["itchy elbow"])).is_empty());
    }

    #[test]
    fn scores_are_normalized_with_max_exactly_one() {
        let scores = mapper().map(&set(&["fever", "cough"]));
        // flu: 3.0, covid: 2.5
        assert_eq!(scores["flu"], 1.0);
        assert!((scores["covid"] - 2.5 / 3.0).abs() < 1e-12);
        assert!(scores.values().all(|v| (0.0..=1.0).contains(v)));
        let max = scores.values().copied().fold(f64::MIN, f64::max);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn symptom_match_is_case_insensitive() {
        let scores = mapper().map(&set(&["SHORTNESS OF BREATH"]));
        assert_eq!(scores.get("covid"), Some(&1.0));
    }

    #[test]
    fn mapping_is_idempotent() {
        let mapper = mapper();
        let symptoms = set(&["fever", "nausea", "headache"]);
        assert_eq!(mapper.map(&symptoms), mapper.map(&symptoms));
    }

    #[test]
    fn all_zero_weights_map_to_empty() {
        let table = MappingTable::from_reader("symptom,disease,weight\nfever,flu,0\n".as_bytes())
            .unwrap();
        let mapper = DiseaseMapper::new(Arc::new(table));
        assert!(mapper.map(&set(&["fever"])).is_empty());
    }

    #[test]
    fn missing_disease_rejects_table() {
        let err = MappingTable::from_reader("symptom,disease\nfever,\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedMappingRow { line: 2, .. }));
    }

    #[test]
    fn negative_weight_rejects_table() {
        let err = MappingTable::from_reader("symptom,disease,weight\nfever,flu,-1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedMappingRow { .. }));
    }

    #[test]
    fn non_numeric_weight_rejects_table() {
        let err = MappingTable::from_reader("symptom,disease,weight\nfever,flu,heavy\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("heavy"));
    }

    #[test]
    fn missing_required_column_rejects_table() {
        let err = MappingTable::from_reader("symptom,weight\nfever,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("disease"));
    }

    #[test]
    fn ragged_row_rejects_table() {
        let err = MappingTable::from_reader("symptom,disease\nfever,flu,extra\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedMappingRow { .. }));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = MappingTable::load(Path::new("/nonexistent/mapping.csv")).unwrap_err();
        assert!(matches!(err, ConfigError::MappingSourceMissing(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let table = MappingTable::load(&path).unwrap();
        assert_eq!(table.len(), 7);
    }

    const VOCABULARY: [&str; 6] = ["fever", "cough", "headache", "nausea", "fatigue", "rash"];
    const DISEASES: [&str; 4] = ["flu", "covid", "migraine", "allergies"];

    fn table_rows() -> impl Strategy<Value = Vec<MappingRow>> {
        let weight = prop_oneof![Just(0.0), Just(DEFAULT_WEIGHT), 0.0..100.0_f64];
        proptest::collection::vec((0..VOCABULARY.len(), 0..DISEASES.len(), weight), 1..24)
            .prop_map(|rows| {
                rows.into_iter()
                    .map(|(symptom, disease, weight)| MappingRow {
                        symptom: SymptomToken::new(VOCABULARY[symptom]).unwrap(),
                        disease: DISEASES[disease].to_string(),
                        weight,
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn scores_stay_in_unit_range_and_peak_at_one(
            rows in table_rows(),
            picked in proptest::collection::vec(any::<bool>(), VOCABULARY.len()),
        ) {
            let mapper = DiseaseMapper::new(Arc::new(MappingTable::from_rows(rows)));
            let symptoms: SymptomSet = VOCABULARY
                .iter()
                .zip(&picked)
                .filter(|(_, keep)| **keep)
                .map(|(symptom, _)| *symptom)
                .collect();

            let scores = mapper.map(&symptoms);
            prop_assert!(scores.values().all(|v| (0.0..=1.0).contains(v)));
            if !scores.is_empty() {
                let max = scores.values().copied().fold(f64::MIN, f64::max);
                prop_assert_eq!(max, 1.0);
            }
            prop_assert_eq!(mapper.map(&symptoms), scores);
        }
    }
}
