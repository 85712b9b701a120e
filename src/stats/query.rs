//! Query Engine Module
//! Read-only summaries and groupings over a cleaned, transformed table.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

use super::calculator::{DescriptiveStats, StatsCalculator};
use crate::data::columns::{f64_values, format_numeric, require_column};
use crate::data::get_numeric_columns;
use crate::error::{AnalysisError, Result};
use crate::schema::StudentColumn;

/// A distinct value of a grouping column.
///
/// Keys order numerically or lexicographically; the missing key sorts last.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl GroupKey {
    fn rank(&self) -> u8 {
        match self {
            GroupKey::Boolean(_) => 0,
            GroupKey::Integer(_) | GroupKey::Float(_) => 1,
            GroupKey::Text(_) => 2,
            GroupKey::Missing => 3,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupKey::Integer(v) => Some(*v as f64),
            GroupKey::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Boolean(a), GroupKey::Boolean(b)) => a.cmp(b),
            (GroupKey::Integer(a), GroupKey::Integer(b)) => a.cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            (GroupKey::Missing, GroupKey::Missing) => Ordering::Equal,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Boolean(v) => write!(f, "{v}"),
            GroupKey::Integer(v) => write!(f, "{v}"),
            GroupKey::Float(v) => f.write_str(&format_numeric(*v)),
            GroupKey::Text(v) => f.write_str(v),
            GroupKey::Missing => f.write_str("<missing>"),
        }
    }
}

/// Mean exam score of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreGroup {
    pub key: GroupKey,
    pub mean_score: f64,
    /// Rows in the group.
    pub count: usize,
}

/// Number of rows holding one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: GroupKey,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Read-only queries over a student table.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    df: &'a DataFrame,
}

impl<'a> QueryEngine<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    /// Descriptive statistics of every numeric column.
    ///
    /// The first column, `statistic`, labels the rows
    /// (`count, mean, std, min, 25%, 50%, 75%, max`); the remaining columns
    /// follow table order.
    pub fn get_summary(&self) -> Result<DataFrame> {
        let mut columns = vec![Column::new(
            "statistic".into(),
            DescriptiveStats::LABELS.to_vec(),
        )];
        for name in get_numeric_columns(self.df) {
            let observed: Vec<f64> = f64_values(self.df, &name)?.into_iter().flatten().collect();
            let stats = StatsCalculator::compute_descriptive_stats(&observed);
            columns.push(Column::new(name.as_str().into(), stats.as_row().to_vec()));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Missing entries per column, in table order.
    pub fn get_missing_values(&self) -> Vec<MissingCount> {
        self.df
            .get_columns()
            .iter()
            .map(|column| MissingCount {
                column: column.name().to_string(),
                missing: column.null_count(),
            })
            .collect()
    }

    pub fn get_score_mean(&self) -> Result<f64> {
        self.require_rows("get_score_mean")?;
        let scores = self.observed(StudentColumn::ExamScore)?;
        Ok(StatsCalculator::mean(&scores).unwrap_or(f64::NAN))
    }

    /// Mean exam score per distinct value of `column`.
    pub fn score_by_column(&self, column: &str) -> Result<Vec<ScoreGroup>> {
        require_column(self.df, column)?;
        self.require_rows("score_by_column")?;

        let keys = group_keys(require_column(self.df, column)?)?;
        let scores = f64_values(self.df, StudentColumn::ExamScore.name())?;

        let mut groups: BTreeMap<GroupKey, (f64, usize, usize)> = BTreeMap::new();
        for (key, score) in keys.into_iter().zip(scores) {
            let entry = groups.entry(key).or_insert((0.0, 0, 0));
            if let Some(score) = score {
                entry.0 += score;
                entry.1 += 1;
            }
            entry.2 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(key, (sum, scored, rows))| ScoreGroup {
                key,
                mean_score: if scored == 0 {
                    f64::NAN
                } else {
                    sum / scored as f64
                },
                count: rows,
            })
            .collect())
    }

    pub fn score_by(&self, column: StudentColumn) -> Result<Vec<ScoreGroup>> {
        self.score_by_column(column.name())
    }

    pub fn score_by_study_hours(&self) -> Result<Vec<ScoreGroup>> {
        self.score_by(StudentColumn::StudyHoursPerDay)
    }

    pub fn get_age_value_counts(&self) -> Result<Vec<ValueCount>> {
        self.value_counts(StudentColumn::Age, "get_age_value_counts")
    }

    pub fn get_study_hours_value_counts(&self) -> Result<Vec<ValueCount>> {
        self.value_counts(
            StudentColumn::StudyHoursPerDay,
            "get_study_hours_value_counts",
        )
    }

    pub fn get_min_score(&self) -> Result<f64> {
        self.require_rows("get_min_score")?;
        Ok(Statistics::min(&self.observed(StudentColumn::ExamScore)?))
    }

    pub fn get_max_score(&self) -> Result<f64> {
        self.require_rows("get_max_score")?;
        Ok(Statistics::max(&self.observed(StudentColumn::ExamScore)?))
    }

    pub fn get_total_study_hours(&self) -> Result<f64> {
        Ok(self.observed(StudentColumn::StudyHoursPerDay)?.iter().sum())
    }

    pub fn get_total_social_media_hours(&self) -> Result<f64> {
        Ok(self.observed(StudentColumn::SocialMediaHours)?.iter().sum())
    }

    /// Rows per distinct value, most frequent first; ties keep first-seen order.
    fn value_counts(&self, column: StudentColumn, operation: &'static str) -> Result<Vec<ValueCount>> {
        let source = require_column(self.df, column.name())?;
        self.require_rows(operation)?;

        let mut index: BTreeMap<GroupKey, usize> = BTreeMap::new();
        let mut counts: Vec<ValueCount> = Vec::new();
        for key in group_keys(source)? {
            match index.get(&key) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    index.insert(key.clone(), counts.len());
                    counts.push(ValueCount {
                        value: key,
                        count: 1,
                    });
                }
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }

    fn observed(&self, column: StudentColumn) -> Result<Vec<f64>> {
        Ok(f64_values(self.df, column.name())?
            .into_iter()
            .flatten()
            .collect())
    }

    fn require_rows(&self, operation: &'static str) -> Result<()> {
        if self.df.height() == 0 {
            Err(AnalysisError::EmptyTableError { operation })
        } else {
            Ok(())
        }
    }
}

fn group_keys(column: &Column) -> Result<Vec<GroupKey>> {
    let keys = match column.dtype() {
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .map(|v| v.map_or(GroupKey::Missing, GroupKey::Boolean))
            .collect(),
        DataType::Float32 | DataType::Float64 => column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            // -0.0 and 0.0 are the same value
            .map(|v| v.map_or(GroupKey::Missing, |v| GroupKey::Float(v + 0.0)))
            .collect(),
        dtype if crate::data::is_numeric_dtype(dtype) => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map_or(GroupKey::Missing, GroupKey::Integer))
            .collect(),
        _ => column
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(GroupKey::Missing, |s| GroupKey::Text(s.to_string())))
            .collect(),
    };
    Ok(keys)
}
