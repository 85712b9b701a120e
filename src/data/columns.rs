//! Column access helpers shared by the pipeline stages.
//!
//! Values are pulled out of a DataFrame into plain vectors, processed row by
//! row, and written back as whole columns.

use polars::prelude::*;

use crate::error::{AnalysisError, Result};

pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| AnalysisError::ColumnNotFound {
        column: name.to_string(),
    })
}

/// Numeric values of a column. Cells that do not parse as numbers, and
/// NaN or infinite values, are `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?;
    let values = column.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()))
        .collect())
}

/// String values of a column, kept verbatim. Blank or whitespace-only cells
/// are `None`.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?;
    let values = column.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|value| {
            value
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        })
        .collect())
}

pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_i32_column(df: &mut DataFrame, name: &str, values: Vec<Option<i32>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_string_column(df: &mut DataFrame, name: &str, values: Vec<String>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Format a float without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        return format!("{v:.0}");
    }
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
