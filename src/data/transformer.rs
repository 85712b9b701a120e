//! Data Transformer Module
//! Derives leisure, efficiency, age bucket and education score columns.

use polars::prelude::*;
use tracing::info;

use super::columns::{
    f64_values, require_column, set_f64_column, set_i32_column, set_string_column, string_values,
};
use crate::error::{AnalysisError, Result};
use crate::schema::{AgeGroup, EducationLevel, StudentColumn};

/// Handles the derivation pass over a cleaned student table.
pub struct Transformer;

impl Transformer {
    /// Append the derived columns to a cleaned table.
    ///
    /// Derivation order: `total_leisure_hours`, `study_efficiency`,
    /// `age_group`, `parental_education_numeric`. The table is only replaced
    /// when all four succeed.
    pub fn transform(df: &mut DataFrame) -> Result<()> {
        Self::check_cleaned(df)?;

        let mut work = df.clone();
        let social = Self::cleaned_f64(&work, StudentColumn::SocialMediaHours)?;
        let netflix = Self::cleaned_f64(&work, StudentColumn::NetflixHours)?;
        let scores = Self::cleaned_f64(&work, StudentColumn::ExamScore)?;
        let hours = Self::cleaned_f64(&work, StudentColumn::StudyHoursPerDay)?;
        let ages = Self::cleaned_f64(&work, StudentColumn::Age)?;

        let leisure = total_leisure_hours(&social, &netflix);
        set_f64_column(
            &mut work,
            StudentColumn::TotalLeisureHours.name(),
            leisure.into_iter().map(Some).collect(),
        )?;

        let efficiency = study_efficiency_column(&scores, &hours)?;
        set_f64_column(
            &mut work,
            StudentColumn::StudyEfficiency.name(),
            efficiency.into_iter().map(Some).collect(),
        )?;

        let groups: Vec<String> = ages
            .iter()
            .map(|&age| AgeGroup::from_age(age).label().to_string())
            .collect();
        set_string_column(&mut work, StudentColumn::AgeGroup.name(), groups)?;

        let education = Self::education_numeric(&work)?;
        set_i32_column(
            &mut work,
            StudentColumn::ParentalEducationNumeric.name(),
            education.into_iter().map(Some).collect(),
        )?;

        *df = work;
        info!(rows = df.height(), "Transformation complete");
        Ok(())
    }

    /// The identifier must be gone and the imputed columns complete.
    fn check_cleaned(df: &DataFrame) -> Result<()> {
        if df.column(StudentColumn::StudentId.name()).is_ok() {
            return Err(AnalysisError::PreconditionViolation(
                "transform requires a cleaned table (student_id is still present)".to_string(),
            ));
        }
        let imputed = StudentColumn::NUMERIC
            .into_iter()
            .chain([StudentColumn::ParentalEducationLevel]);
        for column in imputed {
            let nulls = require_column(df, column.name())?.null_count();
            if nulls > 0 {
                return Err(AnalysisError::PreconditionViolation(format!(
                    "transform requires a cleaned table ({column} has {nulls} missing values)"
                )));
            }
        }
        Ok(())
    }

    fn cleaned_f64(df: &DataFrame, column: StudentColumn) -> Result<Vec<f64>> {
        f64_values(df, column.name())?
            .into_iter()
            .map(|value| {
                value.ok_or_else(|| {
                    AnalysisError::PreconditionViolation(format!(
                        "{column} holds non-numeric values"
                    ))
                })
            })
            .collect()
    }

    fn education_numeric(df: &DataFrame) -> Result<Vec<i32>> {
        string_values(df, StudentColumn::ParentalEducationLevel.name())?
            .into_iter()
            .enumerate()
            .map(|(row, label)| {
                let label = label.unwrap_or_default();
                EducationLevel::from_label(&label)
                    .map(EducationLevel::numeric)
                    .ok_or(AnalysisError::UnknownCategory { value: label, row })
            })
            .collect()
    }
}

pub fn total_leisure_hours(social: &[f64], netflix: &[f64]) -> Vec<f64> {
    social.iter().zip(netflix).map(|(s, n)| s + n).collect()
}

/// Exam score per study hour; zero study hours yields zero.
pub fn study_efficiency(score: f64, hours: f64) -> f64 {
    if hours == 0.0 { 0.0 } else { score / hours }
}

fn study_efficiency_column(scores: &[f64], hours: &[f64]) -> Result<Vec<f64>> {
    scores
        .iter()
        .zip(hours)
        .enumerate()
        .map(|(row, (&score, &hours))| {
            let value = study_efficiency(score, hours);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(AnalysisError::PreconditionViolation(format!(
                    "study_efficiency is not finite at row {row} (exam_score={score}, study_hours_per_day={hours})"
                )))
            }
        })
        .collect()
}
