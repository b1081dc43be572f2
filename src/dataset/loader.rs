//! CSV loading and validation.
//!
//! Parses the eleven-column bank customer churn schema into a
//! [`Dataset`], failing closed on missing columns or values outside
//! the declared domain.

use crate::error::{ChurnError, Result};
use crate::models::{CustomerRecord, Dataset, Gender, Geography};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Columns the loader requires. Extra columns present in the canonical
/// export (RowNumber, CustomerId, Surname) are ignored.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
    "Exited",
];

/// One raw CSV row before domain validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "CreditScore")]
    credit_score: i32,
    #[serde(rename = "Geography")]
    geography: String,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Tenure")]
    tenure: u32,
    #[serde(rename = "Balance")]
    balance: f64,
    #[serde(rename = "NumOfProducts")]
    num_of_products: u32,
    #[serde(rename = "HasCrCard")]
    has_cr_card: u8,
    #[serde(rename = "IsActiveMember")]
    is_active_member: u8,
    #[serde(rename = "EstimatedSalary")]
    estimated_salary: f64,
    #[serde(rename = "Exited")]
    exited: u8,
}

/// Load the churn dataset from a local CSV file.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(ChurnError::NotFound(path.display().to_string()));
    }

    info!("Loading dataset from {}", path.display());
    let file = File::open(path)?;
    let dataset = read_dataset(file)?;
    debug!("Loaded {} records", dataset.len());

    Ok(dataset)
}

/// Parse the churn dataset from any reader.
pub fn read_dataset<R: io::Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    validate_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawRecord>().enumerate() {
        // Header occupies line 1; data starts on line 2.
        let line = index + 2;
        let raw = row.map_err(|e| ChurnError::DataFormat(format!("line {}: {}", line, e)))?;
        records.push(validate_record(raw, line)?);
    }

    Ok(Dataset::new(records))
}

/// Check that every required column is present in the header row.
fn validate_headers(headers: &csv::StringRecord) -> Result<()> {
    let present: Vec<&str> = headers.iter().collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !present.contains(col))
        .collect();

    if !missing.is_empty() {
        return Err(ChurnError::DataFormat(format!(
            "missing required columns: {}. Available columns: {}",
            missing.join(", "),
            present.join(", ")
        )));
    }

    Ok(())
}

/// Enforce the declared value domains on a parsed row.
fn validate_record(raw: RawRecord, line: usize) -> Result<CustomerRecord> {
    let geography = Geography::parse(&raw.geography).ok_or_else(|| {
        ChurnError::DataFormat(format!(
            "line {}: unknown Geography '{}' (expected France, Germany or Spain)",
            line, raw.geography
        ))
    })?;

    let gender = Gender::parse(&raw.gender).ok_or_else(|| {
        ChurnError::DataFormat(format!(
            "line {}: unknown Gender '{}' (expected Female or Male)",
            line, raw.gender
        ))
    })?;

    if raw.num_of_products == 0 {
        return Err(ChurnError::DataFormat(format!(
            "line {}: NumOfProducts must be at least 1",
            line
        )));
    }

    if raw.balance < 0.0 {
        return Err(ChurnError::DataFormat(format!(
            "line {}: Balance must be non-negative, got {}",
            line, raw.balance
        )));
    }

    if raw.estimated_salary < 0.0 {
        return Err(ChurnError::DataFormat(format!(
            "line {}: EstimatedSalary must be non-negative, got {}",
            line, raw.estimated_salary
        )));
    }

    Ok(CustomerRecord {
        credit_score: raw.credit_score,
        geography,
        gender,
        age: raw.age,
        tenure: raw.tenure,
        balance: raw.balance,
        num_of_products: raw.num_of_products,
        has_cr_card: parse_flag(raw.has_cr_card, "HasCrCard", line)?,
        is_active_member: parse_flag(raw.is_active_member, "IsActiveMember", line)?,
        estimated_salary: raw.estimated_salary,
        exited: parse_flag(raw.exited, "Exited", line)?,
    })
}

/// A 0/1 column; anything else is out of domain.
fn parse_flag(value: u8, column: &str, line: usize) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ChurnError::DataFormat(format!(
            "line {}: {} must be 0 or 1, got {}",
            line, column, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Exited";

    fn create_test_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_valid_csv() {
        let file = create_test_csv(&[
            "619,France,Female,42,2,0.0,1,1,1,101348.88,1",
            "608,Spain,Female,41,1,83807.86,1,0,1,112542.58,0",
            "502,Germany,Male,42,8,159660.8,3,1,0,113931.57,1",
        ]);

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.churned_count(), 2);

        let first = &dataset.records()[0];
        assert_eq!(first.credit_score, 619);
        assert_eq!(first.geography, Geography::France);
        assert_eq!(first.gender, Gender::Female);
        assert_eq!(first.age, 42);
        assert!(first.exited);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "RowNumber,CustomerId,Surname,CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Exited\n\
                   1,15634602,Hargrave,619,France,Female,42,2,0.0,1,1,1,101348.88,1\n";

        let dataset = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].credit_score, 619);
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/churn.csv")).unwrap_err();
        assert!(matches!(err, ChurnError::NotFound(_)));
    }

    #[test]
    fn test_missing_column() {
        let csv = "CreditScore,Geography,Gender,Age\n619,France,Female,42\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();

        match err {
            ChurnError::DataFormat(msg) => {
                assert!(msg.contains("missing required columns"));
                assert!(msg.contains("Exited"));
            }
            other => panic!("expected DataFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_exited_out_of_domain() {
        let file = create_test_csv(&["619,France,Female,42,2,0.0,1,1,1,101348.88,2"]);
        let err = load_dataset(file.path()).unwrap_err();

        match err {
            ChurnError::DataFormat(msg) => {
                assert!(msg.contains("Exited"));
                assert!(msg.contains("line 2"));
            }
            other => panic!("expected DataFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_geography() {
        let file = create_test_csv(&["619,Italy,Female,42,2,0.0,1,1,1,101348.88,1"]);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, ChurnError::DataFormat(msg) if msg.contains("Italy")));
    }

    #[test]
    fn test_zero_products_rejected() {
        let file = create_test_csv(&["619,France,Female,42,2,0.0,0,1,1,101348.88,1"]);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, ChurnError::DataFormat(msg) if msg.contains("NumOfProducts")));
    }

    #[test]
    fn test_negative_balance_rejected() {
        let file = create_test_csv(&["619,France,Female,42,2,-1.5,1,1,1,101348.88,1"]);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, ChurnError::DataFormat(msg) if msg.contains("Balance")));
    }

    #[test]
    fn test_unparseable_value() {
        let file = create_test_csv(&["not-a-number,France,Female,42,2,0.0,1,1,1,101348.88,1"]);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, ChurnError::DataFormat(msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_headers_only_yields_empty_dataset() {
        let file = create_test_csv(&[]);
        let dataset = load_dataset(file.path()).unwrap();
        assert!(dataset.is_empty());
    }
}
