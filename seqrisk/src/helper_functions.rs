use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::errors::{AnalysisError, Result};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Reads every column as text; callers cast numeric columns explicitly so
/// identifiers such as `001` keep their spelling.
pub fn read_csv(file_path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()
}

pub fn dataframe_to_csv(df: &mut DataFrame, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(file_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;
    Ok(())
}

/// Fails with a schema error naming every required column `df` lacks.
pub fn require_columns(df: &DataFrame, required: &[&str], source_name: &str) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<String> = required
        .iter()
        .filter(|&&name| !present.iter().any(|c| c.as_str() == name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::Schema {
            source_name: source_name.to_string(),
            missing,
        })
    }
}

/// Reads a column as finite floats; nulls, unparseable cells and NaN/inf are
/// reported with their row.
pub fn f64_values(df: &DataFrame, column: &str, source_name: &str) -> Result<Vec<f64>> {
    let casted = df.column(column)?.cast(&DataType::Float64)?;
    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(invalid_record(source_name, row, format!("{column} is {v}"))),
            None => Err(invalid_record(source_name, row, format!("{column} is missing or not a number"))),
        })
        .collect()
}

pub fn string_values(df: &DataFrame, column: &str, source_name: &str) -> Result<Vec<String>> {
    let casted = df.column(column)?.cast(&DataType::String)?;
    casted
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| invalid_record(source_name, row, format!("{column} is missing")))
        })
        .collect()
}

/// Like [`string_values`] but an empty cell reads as the empty string.
pub fn string_values_or_empty(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let casted = df.column(column)?.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

pub fn invalid_record(source_name: &str, row: usize, reason: String) -> AnalysisError {
    AnalysisError::InvalidRecord {
        source_name: source_name.to_string(),
        row,
        reason,
    }
}
