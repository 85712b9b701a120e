//! Text and JSON rendering of query results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::analysis::StudentAnalysis;
use crate::data::columns::format_numeric;
use crate::error::Result;
use crate::stats::{MissingCount, ScoreGroup, ValueCount};

/// Every query result for one prepared table.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub summary: DataFrame,
    pub missing: Vec<MissingCount>,
    pub score_mean: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub total_study_hours: f64,
    pub total_social_media_hours: f64,
    pub by_study_hours: Vec<ScoreGroup>,
    /// Grouping by an extra column, with the column name.
    pub by_column: Option<(String, Vec<ScoreGroup>)>,
    pub age_counts: Vec<ValueCount>,
    pub study_hours_counts: Vec<ValueCount>,
}

impl AnalysisReport {
    pub fn collect(analysis: &StudentAnalysis, group_by: Option<&str>) -> Result<Self> {
        let by_column = match group_by {
            Some(column) => Some((column.to_string(), analysis.score_by_column(column)?)),
            None => None,
        };
        Ok(Self {
            summary: analysis.get_summary()?,
            missing: analysis.get_missing_values(),
            score_mean: analysis.get_score_mean()?,
            min_score: analysis.get_min_score()?,
            max_score: analysis.get_max_score()?,
            total_study_hours: analysis.get_total_study_hours()?,
            total_social_media_hours: analysis.get_total_social_media_hours()?,
            by_study_hours: analysis.score_by_study_hours()?,
            by_column,
            age_counts: analysis.get_age_value_counts()?,
            study_hours_counts: analysis.get_study_hours_value_counts()?,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let mut section = |title: &str, body: String| {
            out.push_str(title);
            out.push('\n');
            out.push_str(&body);
            out.push_str("\n\n");
        };

        section("Summary", render_dataframe(&self.summary).to_string());
        section("Missing values", render_missing(&self.missing).to_string());
        section("Exam scores", render_scalars(&[
            ("mean", self.score_mean),
            ("min", self.min_score),
            ("max", self.max_score),
        ])
        .to_string());
        section("Totals", render_scalars(&[
            ("study_hours_per_day", self.total_study_hours),
            ("social_media_hours", self.total_social_media_hours),
        ])
        .to_string());
        section(
            "Mean exam score by study_hours_per_day",
            render_groups("study_hours_per_day", &self.by_study_hours).to_string(),
        );
        if let Some((column, groups)) = &self.by_column {
            section(
                &format!("Mean exam score by {column}"),
                render_groups(column, groups).to_string(),
            );
        }
        section("Age value counts", render_counts("age", &self.age_counts).to_string());
        section(
            "Study hours value counts",
            render_counts("study_hours_per_day", &self.study_hours_counts).to_string(),
        );
        out.trim_end().to_string()
    }

    pub fn to_json(&self) -> Value {
        let mut report = Map::new();
        report.insert("summary".into(), summary_json(&self.summary));
        report.insert("missing_values".into(), to_value(&self.missing));
        report.insert(
            "exam_score".into(),
            json!({
                "mean": self.score_mean,
                "min": self.min_score,
                "max": self.max_score,
            }),
        );
        report.insert(
            "totals".into(),
            json!({
                "study_hours_per_day": self.total_study_hours,
                "social_media_hours": self.total_social_media_hours,
            }),
        );
        report.insert("score_by_study_hours".into(), to_value(&self.by_study_hours));
        if let Some((column, groups)) = &self.by_column {
            report.insert(
                "score_by_column".into(),
                json!({ "column": column, "groups": to_value(groups) }),
            );
        }
        report.insert("age_value_counts".into(), to_value(&self.age_counts));
        report.insert(
            "study_hours_value_counts".into(),
            to_value(&self.study_hours_counts),
        );
        Value::Object(report)
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Summary frame as `{column: {statistic: value}}`; NaN becomes null.
fn summary_json(summary: &DataFrame) -> Value {
    let labels: Vec<String> = summary
        .column("statistic")
        .ok()
        .and_then(|col| col.str().ok())
        .map(|ca| ca.into_iter().map(|v| v.unwrap_or_default().to_string()).collect())
        .unwrap_or_default();

    let mut columns = Map::new();
    for column in summary.get_columns().iter().skip(1) {
        let Ok(values) = column.f64() else {
            continue;
        };
        let stats: Map<String, Value> = labels
            .iter()
            .zip(values.into_iter())
            .map(|(label, value)| (label.clone(), json!(value.filter(|v| v.is_finite()))))
            .collect();
        columns.insert(column.name().to_string(), Value::Object(stats));
    }
    Value::Object(columns)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn align_right_from(table: &mut Table, first: usize) {
    let count = table.column_count();
    for index in first..count {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn number_cell(value: f64) -> Cell {
    if value.is_nan() {
        Cell::new("NaN")
    } else {
        Cell::new(format_numeric((value * 1e6).round() / 1e6))
    }
}

/// Render any DataFrame cell by cell.
pub fn render_dataframe(df: &DataFrame) -> Table {
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    let mut table = new_table(names.iter().map(String::as_str).collect());
    for row in 0..df.height() {
        let cells: Vec<Cell> = df
            .get_columns()
            .iter()
            .map(|column| match column.get(row) {
                Ok(AnyValue::Float64(v)) => number_cell(v),
                Ok(AnyValue::Float32(v)) => number_cell(f64::from(v)),
                Ok(AnyValue::Null) | Err(_) => Cell::new(""),
                Ok(AnyValue::String(s)) => Cell::new(s),
                Ok(other) => Cell::new(other.to_string()),
            })
            .collect();
        table.add_row(cells);
    }
    align_right_from(&mut table, 1);
    table
}

pub fn render_missing(missing: &[MissingCount]) -> Table {
    let mut table = new_table(vec!["column", "missing"]);
    for entry in missing {
        table.add_row(vec![Cell::new(&entry.column), Cell::new(entry.missing)]);
    }
    align_right_from(&mut table, 1);
    table
}

pub fn render_groups(column: &str, groups: &[ScoreGroup]) -> Table {
    let mut table = new_table(vec![column, "mean exam_score", "rows"]);
    for group in groups {
        table.add_row(vec![
            Cell::new(group.key.to_string()),
            number_cell(group.mean_score),
            Cell::new(group.count),
        ]);
    }
    align_right_from(&mut table, 1);
    table
}

pub fn render_counts(column: &str, counts: &[ValueCount]) -> Table {
    let mut table = new_table(vec![column, "count"]);
    for entry in counts {
        table.add_row(vec![Cell::new(entry.value.to_string()), Cell::new(entry.count)]);
    }
    align_right_from(&mut table, 1);
    table
}

fn render_scalars(values: &[(&str, f64)]) -> Table {
    let mut table = new_table(vec!["metric", "value"]);
    for (name, value) in values {
        table.add_row(vec![Cell::new(name), number_cell(*value)]);
    }
    align_right_from(&mut table, 1);
    table
}
