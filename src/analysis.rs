//! Student analysis pipeline.
//! Owns the table and walks it through loading, cleaning and transformation.

use std::fmt;
use std::path::Path;

use polars::prelude::*;
use tracing::info_span;

use crate::data::{CleanReport, Cleaner, DataLoader, LoadOptions, Transformer};
use crate::error::{AnalysisError, Result};
use crate::schema::StudentColumn;
use crate::stats::{MissingCount, QueryEngine, ScoreGroup, ValueCount};

/// How far the table has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Loaded,
    Cleaned,
    Transformed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Loaded => "loaded",
            PipelineStage::Cleaned => "cleaned",
            PipelineStage::Transformed => "transformed",
        };
        f.write_str(label)
    }
}

/// A student habits table and the pipeline stage it has reached.
#[derive(Debug, Clone)]
pub struct StudentAnalysis {
    df: DataFrame,
    stage: PipelineStage,
}

impl StudentAnalysis {
    pub fn from_csv(path: &Path, options: &LoadOptions) -> Result<Self> {
        let mut loader = DataLoader::new(options.clone());
        let df = loader.load_csv(path)?;
        Ok(Self::from_dataframe(df))
    }

    pub fn from_dataframe(df: DataFrame) -> Self {
        Self {
            df,
            stage: PipelineStage::Loaded,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Drop `student_id`, impute numeric medians and the education mode, and
    /// map Yes/No flags to 1/0. Only valid on a freshly loaded table.
    pub fn clean(&mut self) -> Result<CleanReport> {
        self.expect_stage(PipelineStage::Loaded, "clean")?;
        let _span = info_span!("clean").entered();
        let report = Cleaner::clean(&mut self.df)?;
        self.stage = PipelineStage::Cleaned;
        Ok(report)
    }

    /// Derive the analytic columns. Only valid right after [`clean`](Self::clean).
    pub fn transform(&mut self) -> Result<()> {
        self.expect_stage(PipelineStage::Cleaned, "transform")?;
        let _span = info_span!("transform").entered();
        Transformer::transform(&mut self.df)?;
        self.stage = PipelineStage::Transformed;
        Ok(())
    }

    /// Clean then transform.
    pub fn prepare(&mut self) -> Result<CleanReport> {
        let report = self.clean()?;
        self.transform()?;
        Ok(report)
    }

    pub fn queries(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.df)
    }

    pub fn get_summary(&self) -> Result<DataFrame> {
        self.queries().get_summary()
    }

    pub fn get_missing_values(&self) -> Vec<MissingCount> {
        self.queries().get_missing_values()
    }

    pub fn get_score_mean(&self) -> Result<f64> {
        self.queries().get_score_mean()
    }

    pub fn score_by_column(&self, column: &str) -> Result<Vec<ScoreGroup>> {
        self.queries().score_by_column(column)
    }

    pub fn score_by(&self, column: StudentColumn) -> Result<Vec<ScoreGroup>> {
        self.queries().score_by(column)
    }

    pub fn score_by_study_hours(&self) -> Result<Vec<ScoreGroup>> {
        self.queries().score_by_study_hours()
    }

    pub fn get_age_value_counts(&self) -> Result<Vec<ValueCount>> {
        self.queries().get_age_value_counts()
    }

    pub fn get_study_hours_value_counts(&self) -> Result<Vec<ValueCount>> {
        self.queries().get_study_hours_value_counts()
    }

    pub fn get_min_score(&self) -> Result<f64> {
        self.queries().get_min_score()
    }

    pub fn get_max_score(&self) -> Result<f64> {
        self.queries().get_max_score()
    }

    pub fn get_total_study_hours(&self) -> Result<f64> {
        self.queries().get_total_study_hours()
    }

    pub fn get_total_social_media_hours(&self) -> Result<f64> {
        self.queries().get_total_social_media_hours()
    }

    fn expect_stage(&self, expected: PipelineStage, operation: &str) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(AnalysisError::PreconditionViolation(format!(
                "{operation} requires a {expected} table, but the table is {}",
                self.stage
            )))
        }
    }
}
