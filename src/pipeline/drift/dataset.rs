//! Column-oriented tabular data for drift comparison.
//!
//! Cells are typed at parse time: numbers become `Cell::Number`, empty cells
//! `Cell::Missing`, anything else `Cell::Category`. A column is numeric when
//! every present cell is a number.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Category(String),
    Missing,
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Category(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Category label for categorical comparison; numbers are rendered as text.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Number(v) => Some(v.to_string()),
            Cell::Category(s) => Some(s.clone()),
            Cell::Missing => None,
        }
    }
}

/// One feature row of a current batch: column name → value.
pub type FeatureRow = BTreeMap<String, Cell>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    /// Numeric when at least one value is present and all present values are numbers.
    pub fn kind(&self) -> ColumnKind {
        let mut present = self.values.iter().filter(|c| !matches!(c, Cell::Missing)).peekable();
        if present.peek().is_some() && present.all(|c| matches!(c, Cell::Number(_))) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Cell::as_number).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().filter_map(Cell::as_label).collect()
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|c| !matches!(c, Cell::Missing)).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, csv::Error> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: io::Read>(source: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        let headers = reader.headers()?.clone();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();

        let mut n_rows = 0;
        for record in reader.records() {
            let record = record?;
            for (column, raw) in columns.iter_mut().zip(record.iter()) {
                column.values.push(Cell::parse(raw));
            }
            n_rows += 1;
        }
        Ok(Self { columns, n_rows })
    }

    /// Build a dataset from feature rows. Columns are the union of all keys.
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        let names: BTreeSet<&String> = rows.iter().flat_map(|r| r.keys()).collect();
        let columns = names
            .into_iter()
            .map(|name| Column {
                name: name.clone(),
                values: rows
                    .iter()
                    .map(|r| r.get(name).cloned().unwrap_or(Cell::Missing))
                    .collect(),
            })
            .collect();
        Self {
            columns,
            n_rows: rows.len(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
