//! Student Habits - cleaning, feature derivation and exam score queries
//! over a student habits and performance dataset.
//!
//! ```no_run
//! use std::path::Path;
//! use student_habits::{LoadOptions, StudentAnalysis};
//!
//! let mut analysis =
//!     StudentAnalysis::from_csv(Path::new("student_habits_performance.csv"), &LoadOptions::default())?;
//! analysis.clean()?;
//! analysis.transform()?;
//! println!("mean score: {}", analysis.get_score_mean()?);
//! # Ok::<(), student_habits::AnalysisError>(())
//! ```

pub mod analysis;
pub mod data;
pub mod error;
pub mod logging;
pub mod report;
pub mod schema;
pub mod stats;

pub use analysis::{PipelineStage, StudentAnalysis};
pub use data::{CleanReport, Cleaner, DataLoader, LoadOptions, LoaderError, Transformer};
pub use error::{AnalysisError, Result};
pub use report::AnalysisReport;
pub use schema::{AgeGroup, EducationLevel, StudentColumn};
pub use stats::{GroupKey, MissingCount, QueryEngine, ScoreGroup, ValueCount};
