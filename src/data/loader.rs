//! CSV Data Loader Module
//! Reads the student habits file into a Polars DataFrame.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Options for parsing the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field separator byte.
    pub separator: u8,
    /// Rows scanned to infer column types (`None` scans the whole file).
    pub infer_schema_length: Option<usize>,
    /// Turn unparseable cells into nulls instead of failing the load.
    pub ignore_errors: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            infer_schema_length: Some(10000),
            ignore_errors: true,
        }
    }
}

/// Handles CSV file loading with Polars.
#[derive(Debug, Default)]
pub struct DataLoader {
    options: LoadOptions,
    file_path: Option<PathBuf>,
}

impl DataLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            file_path: None,
        }
    }

    /// Load a CSV file. Empty cells become nulls; the file handle is released
    /// once the frame is collected.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        self.file_path = Some(file_path.to_path_buf());

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_separator(self.options.separator)
            .with_infer_schema_length(self.options.infer_schema_length)
            .with_ignore_errors(self.options.ignore_errors)
            .finish()?
            .collect()?;

        if df.width() == 0 {
            return Err(LoaderError::NoData);
        }

        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "Loaded student dataset"
        );
        Ok(df)
    }

    /// Path of the last file passed to [`DataLoader::load_csv`].
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

/// Get list of column names in table order.
pub fn get_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Get list of numeric column names in table order.
pub fn get_numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn loads_header_and_infers_types() {
        let file = write_csv(
            "student_id,age,exam_score,gender\nS1,20,71.5,Female\nS2,,88.0,Male\n",
        );
        let mut loader = DataLoader::default();
        let df = loader.load_csv(file.path()).expect("load csv");

        assert_eq!(df.height(), 2);
        assert_eq!(
            get_columns(&df),
            vec!["student_id", "age", "exam_score", "gender"]
        );
        assert_eq!(get_numeric_columns(&df), vec!["age", "exam_score"]);
        assert_eq!(df.column("age").unwrap().null_count(), 1);
        assert_eq!(loader.get_file_path().map(|p| p.as_path()), Some(file.path()));
    }

    #[test]
    fn honours_custom_separator() {
        let file = write_csv("age;exam_score\n19;60\n23;75\n");
        let mut loader = DataLoader::new(LoadOptions {
            separator: b';',
            ..LoadOptions::default()
        });
        let df = loader.load_csv(file.path()).expect("load csv");
        assert_eq!(get_columns(&df), vec!["age", "exam_score"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut loader = DataLoader::default();
        let result = loader.load_csv(Path::new("/definitely/not/here.csv"));
        assert!(result.is_err());
    }
}
