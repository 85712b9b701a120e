//! Data Cleaner Module
//! Drops the identifier column and repairs missing or malformed values.

use polars::prelude::*;
use tracing::{debug, info, warn};

use super::columns::{
    f64_values, require_column, set_f64_column, set_i32_column, set_string_column, string_values,
};
use crate::error::{AnalysisError, Result};
use crate::schema::{StudentColumn, parse_yes_no};
use crate::stats::StatsCalculator;

/// Median imputation applied to one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFill {
    pub column: StudentColumn,
    /// `None` when the table has no rows.
    pub median: Option<f64>,
    pub filled: usize,
    /// Non-empty cells that did not parse as finite numbers.
    pub malformed: usize,
}

/// What [`Cleaner::clean`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub numeric: Vec<NumericFill>,
    pub education_mode: Option<String>,
    pub education_filled: usize,
}

impl CleanReport {
    pub fn total_filled(&self) -> usize {
        self.numeric.iter().map(|fill| fill.filled).sum::<usize>() + self.education_filled
    }
}

/// Handles the cleaning pass over a student table.
pub struct Cleaner;

impl Cleaner {
    /// Clean the table in place.
    ///
    /// Work happens on a copy; `df` is only replaced when every step
    /// succeeds.
    pub fn clean(df: &mut DataFrame) -> Result<CleanReport> {
        let mut work = df.clone();
        let mut report = CleanReport::default();

        Self::drop_identifier(&mut work)?;
        for column in StudentColumn::NUMERIC {
            report.numeric.push(Self::fill_numeric(&mut work, column)?);
        }
        let (mode, filled) = Self::fill_education(&mut work)?;
        report.education_mode = mode;
        report.education_filled = filled;
        for column in StudentColumn::YES_NO {
            Self::map_yes_no(&mut work, column)?;
        }

        *df = work;
        info!(
            rows = df.height(),
            filled = report.total_filled(),
            "Cleaning complete"
        );
        Ok(report)
    }

    fn drop_identifier(df: &mut DataFrame) -> Result<()> {
        let name = StudentColumn::StudentId.name();
        df.drop_in_place(name)
            .map_err(|_| AnalysisError::ColumnNotFound {
                column: name.to_string(),
            })?;
        Ok(())
    }

    /// Replace missing entries with the median of the observed ones.
    fn fill_numeric(df: &mut DataFrame, column: StudentColumn) -> Result<NumericFill> {
        let name = column.name();
        let raw = require_column(df, name)?;
        let raw_missing = raw.null_count();
        let values = f64_values(df, name)?;

        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        let missing = values.len() - observed.len();
        let malformed = missing.saturating_sub(raw_missing);
        if malformed > 0 {
            warn!(column = name, malformed, "Unparseable or non-finite numeric cells treated as missing");
        }

        let median = StatsCalculator::median(&observed);
        let filled_values: Vec<Option<f64>> = match median {
            Some(median) => values
                .into_iter()
                .map(|value| Some(value.unwrap_or(median)))
                .collect(),
            None if values.is_empty() => values,
            None => {
                return Err(AnalysisError::NoObservedValues {
                    column: name.to_string(),
                });
            }
        };
        set_f64_column(df, name, filled_values)?;

        debug!(column = name, ?median, filled = missing, "Filled numeric column");
        Ok(NumericFill {
            column,
            median,
            filled: missing,
            malformed,
        })
    }

    /// Replace missing education levels with the most common one.
    fn fill_education(df: &mut DataFrame) -> Result<(Option<String>, usize)> {
        let name = StudentColumn::ParentalEducationLevel.name();
        let values = string_values(df, name)?;

        let mode = StatsCalculator::mode(values.iter().flatten().map(String::as_str))
            .map(str::to_string);
        let Some(mode) = mode else {
            if values.is_empty() {
                set_string_column(df, name, Vec::new())?;
                return Ok((None, 0));
            }
            return Err(AnalysisError::NoObservedValues {
                column: name.to_string(),
            });
        };

        let mut filled = 0usize;
        let repaired: Vec<String> = values
            .into_iter()
            .map(|value| {
                value.unwrap_or_else(|| {
                    filled += 1;
                    mode.clone()
                })
            })
            .collect();
        set_string_column(df, name, repaired)?;

        debug!(column = name, mode = %mode, filled, "Filled categorical column");
        Ok((Some(mode), filled))
    }

    /// Map Yes/No to 1/0. Missing stays missing.
    fn map_yes_no(df: &mut DataFrame, column: StudentColumn) -> Result<()> {
        let name = column.name();
        let values = string_values(df, name)?;

        let mut mapped: Vec<Option<i32>> = Vec::with_capacity(values.len());
        for (row, value) in values.into_iter().enumerate() {
            let flag = match value {
                None => None,
                Some(token) => Some(parse_yes_no(&token).ok_or_else(|| {
                    AnalysisError::InvalidCategoricalValue {
                        column: name.to_string(),
                        row,
                        value: token.clone(),
                    }
                })?),
            };
            mapped.push(flag);
        }
        set_i32_column(df, name, mapped)
    }
}
