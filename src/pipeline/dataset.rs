// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Training data checks run before a candidate is trained.
//!
//! The frame is a numeric CSV: a header row, then one row per example.
//! Quoted cells are accepted. Empty cells and `NaN` are missing values.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;

/// Columns every training file must carry. `target` is the label.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "age",
    "income",
    "account_balance",
    "transactions_last_30d",
    "is_premium",
    "target",
];

pub const TARGET_COLUMN: &str = "target";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Malformed CSV at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("Null values detected")]
    NullValues,

    #[error("Target column must be binary (0 or 1)")]
    NonBinaryTarget,
}

/// Parsed numeric training table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl TrainingFrame {
    pub fn from_csv_file(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_csv_str(&text)
    }

    pub fn from_csv_str(text: &str) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| parse_error(&e))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(DatasetError::Parse { line: 1, reason: "missing header".into() });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| parse_error(&e))?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let row = record
                .iter()
                .map(|cell| parse_cell(cell).map_err(|reason| DatasetError::Parse { line, reason }))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Required columns present, no missing values, binary target.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let present: BTreeSet<&str> = self.columns.iter().map(String::as_str).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !present.contains(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns(missing));
        }

        if self.rows.iter().flatten().any(Option::is_none) {
            return Err(DatasetError::NullValues);
        }

        let target = self.column_index(TARGET_COLUMN).ok_or_else(|| {
            DatasetError::MissingColumns(vec![TARGET_COLUMN.to_string()])
        })?;
        let binary = self
            .rows
            .iter()
            .all(|row| matches!(row[target], Some(v) if v == 0.0 || v == 1.0));
        if !binary {
            return Err(DatasetError::NonBinaryTarget);
        }
        Ok(())
    }
}

fn parse_error(e: &csv::Error) -> DatasetError {
    DatasetError::Parse {
        line: e.position().map_or(0, |p| p.line() as usize),
        reason: e.to_string(),
    }
}

fn parse_cell(cell: &str) -> Result<Option<f64>, String> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("not a number: {:?}", cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "age,income,account_balance,transactions_last_30d,is_premium,target
25,52000,1200,14,0,0
42,88000,5400,33,1,1
31,61000,2300,18,0,0
58,99000,15000,41,1,1
";

    #[test]
    fn test_happy_path() {
        let frame = TrainingFrame::from_csv_str(GOOD).unwrap();
        assert_eq!(frame.len(), 4);
        frame.validate().unwrap();
    }

    #[test]
    fn test_missing_column() {
        let text = GOOD.replace("income,", "").replace("52000,", "").replace("88000,", "")
            .replace("61000,", "").replace("99000,", "");
        let err = TrainingFrame::from_csv_str(&text).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("Missing required columns"));
        assert!(matches!(err, DatasetError::MissingColumns(ref c) if c == &vec!["income".to_string()]));
    }

    #[test]
    fn test_null_value() {
        let text = GOOD.replace("25,52000", ",52000");
        let err = TrainingFrame::from_csv_str(&text).unwrap().validate().unwrap_err();
        assert!(matches!(err, DatasetError::NullValues));
    }

    #[test]
    fn test_non_binary_target() {
        let text = GOOD.replace("58,99000,15000,41,1,1", "58,99000,15000,41,1,2");
        let err = TrainingFrame::from_csv_str(&text).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("Target column must be binary"));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let text = format!("{}1,2,3\n", GOOD);
        assert!(matches!(
            TrainingFrame::from_csv_str(&text),
            Err(DatasetError::Parse { line: 6, .. })
        ));
    }

    #[test]
    fn test_quoted_cells() {
        let text = "\"age\",income,account_balance,transactions_last_30d,is_premium,target\n\
                    \"25\",\" 52000 \",1200,14,0,1\n";
        let frame = TrainingFrame::from_csv_str(text).unwrap();
        assert_eq!(frame.columns()[0], "age");
        frame.validate().unwrap();
    }

    #[test]
    fn test_quoted_comma_is_one_cell() {
        let text = "age,income\n\"1,5\",2\n";
        let err = TrainingFrame::from_csv_str(text).unwrap_err();
        // One cell holding "1,5", not two cells.
        assert!(matches!(err, DatasetError::Parse { line: 2, ref reason } if reason.contains("1,5")));
    }
}
