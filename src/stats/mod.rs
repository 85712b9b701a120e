//! Stats module - descriptive statistics and read-only queries

mod calculator;
mod query;

pub use calculator::{DescriptiveStats, StatsCalculator};
pub use query::{GroupKey, MissingCount, QueryEngine, ScoreGroup, ValueCount};
