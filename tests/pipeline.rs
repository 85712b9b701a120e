use std::io::Write;

use polars::prelude::*;
use student_habits::data::columns::{f64_values, string_values};
use student_habits::{
    AnalysisError, AnalysisReport, GroupKey, LoadOptions, PipelineStage, StudentAnalysis,
    StudentColumn,
};

const SAMPLE: &str = "\
student_id,age,gender,study_hours_per_day,social_media_hours,netflix_hours,part_time_job,attendance_percentage,parental_education_level,extracurricular_participation,exam_score
S1000,17,Female,0.0,2.0,1.0,No,85.0,Master,Yes,50.0
S1001,20,Male,6.9,2.8,2.3,No,97.3,High School,No,100.0
S1002,21,Male,1.4,3.1,1.3,No,94.8,High School,No,34.3
S1003,,Female,1.0,3.9,1.0,Yes,71.0,,Yes,26.8
S1004,22,Female,5.0,4.4,0.5,No,90.9,Bachelor,No,
S1005,18,Other,7.2,1.3,0.0,Yes,82.9,None,No,100.0
";

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write csv");
    file
}

fn loaded() -> (tempfile::NamedTempFile, StudentAnalysis) {
    let file = write_csv(SAMPLE);
    let analysis =
        StudentAnalysis::from_csv(file.path(), &LoadOptions::default()).expect("load sample");
    (file, analysis)
}

fn prepared() -> StudentAnalysis {
    let (_file, mut analysis) = loaded();
    analysis.prepare().expect("prepare sample");
    analysis
}

#[test]
fn missing_values_before_cleaning() {
    let (_file, analysis) = loaded();
    let missing = analysis.get_missing_values();
    assert_eq!(missing.len(), 11);
    let lookup = |name: &str| {
        missing
            .iter()
            .find(|m| m.column == name)
            .map(|m| m.missing)
            .expect("column listed")
    };
    assert_eq!(lookup("age"), 1);
    assert_eq!(lookup("parental_education_level"), 1);
    assert_eq!(lookup("exam_score"), 1);
    assert_eq!(lookup("gender"), 0);
    assert_eq!(missing[0].column, "student_id");
}

#[test]
fn cleaning_establishes_invariants() {
    let (_file, mut analysis) = loaded();
    let report = analysis.clean().expect("clean");
    let df = analysis.dataframe();

    assert!(df.column("student_id").is_err());
    for column in StudentColumn::NUMERIC {
        assert_eq!(df.column(column.name()).unwrap().null_count(), 0, "{column}");
    }
    assert_eq!(df.column("parental_education_level").unwrap().null_count(), 0);
    for column in StudentColumn::YES_NO {
        let values = df.column(column.name()).unwrap().i32().unwrap();
        assert!(values.into_iter().flatten().all(|v| v == 0 || v == 1));
    }

    assert_eq!(f64_values(df, "age").unwrap()[3], Some(20.0));
    assert_eq!(f64_values(df, "exam_score").unwrap()[4], Some(50.0));
    assert_eq!(
        string_values(df, "parental_education_level").unwrap()[3].as_deref(),
        Some("High School")
    );
    assert_eq!(report.education_mode.as_deref(), Some("High School"));
    assert_eq!(report.total_filled(), 3);
}

#[test]
fn transformation_matches_worked_example() {
    let analysis = prepared();
    let df = analysis.dataframe();

    let leisure = f64_values(df, "total_leisure_hours").unwrap();
    let efficiency = f64_values(df, "study_efficiency").unwrap();
    let groups = string_values(df, "age_group").unwrap();

    assert_eq!(leisure[0], Some(3.0));
    assert_eq!(efficiency[0], Some(0.0));
    assert_eq!(groups[0].as_deref(), Some("<18"));

    assert_eq!(efficiency[4], Some(10.0));
    assert_eq!(groups[4].as_deref(), Some("22+"));
    assert_eq!(groups[5].as_deref(), Some("18-21"));

    let education: Vec<Option<i32>> = df
        .column("parental_education_numeric")
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        education,
        vec![Some(3), Some(1), Some(1), Some(1), Some(2), Some(0)]
    );
}

#[test]
fn leisure_is_exact_sum() {
    let analysis = prepared();
    let df = analysis.dataframe();
    let social = f64_values(df, "social_media_hours").unwrap();
    let netflix = f64_values(df, "netflix_hours").unwrap();
    let leisure = f64_values(df, "total_leisure_hours").unwrap();
    for ((s, n), l) in social.iter().zip(&netflix).zip(&leisure) {
        assert_eq!(l.unwrap(), s.unwrap() + n.unwrap());
    }
}

#[test]
fn score_queries() {
    let analysis = prepared();

    let mean = analysis.get_score_mean().unwrap();
    assert!((mean - 60.183_333_333_333_33).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&mean));

    let min = analysis.get_min_score().unwrap();
    let max = analysis.get_max_score().unwrap();
    assert_eq!(min, 26.8);
    assert_eq!(max, 100.0);
    assert!(min <= max);

    let raw_hours: f64 = f64_values(analysis.dataframe(), "study_hours_per_day")
        .unwrap()
        .into_iter()
        .flatten()
        .sum();
    assert_eq!(analysis.get_total_study_hours().unwrap(), raw_hours);

    let raw_social: f64 = [2.0, 2.8, 3.1, 3.9, 4.4, 1.3].iter().sum();
    assert_eq!(analysis.get_total_social_media_hours().unwrap(), raw_social);
}

#[test]
fn grouping_by_flags_and_passthrough_columns() {
    let analysis = prepared();

    let jobs = analysis.score_by(StudentColumn::PartTimeJob).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].key, GroupKey::Integer(0));
    assert!((jobs[0].mean_score - 58.575).abs() < 1e-9);
    assert_eq!(jobs[1].key, GroupKey::Integer(1));
    assert!((jobs[1].mean_score - 63.4).abs() < 1e-9);

    let genders = analysis.score_by_column("gender").unwrap();
    let keys: Vec<String> = genders.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, vec!["Female", "Male", "Other"]);
    assert!((genders[1].mean_score - 67.15).abs() < 1e-9);

    let groups = analysis.score_by_column("age_group").unwrap();
    let keys: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, vec!["18-21", "22+", "<18"]);

    assert!(matches!(
        analysis.score_by_column("favourite_colour"),
        Err(AnalysisError::ColumnNotFound { .. })
    ));
}

#[test]
fn study_hour_groups_and_value_counts() {
    let analysis = prepared();
    let rows = analysis.dataframe().height();

    let by_hours = analysis.score_by_study_hours().unwrap();
    assert_eq!(by_hours.len(), 6);
    let keys: Vec<f64> = by_hours.iter().filter_map(|g| g.key.as_f64()).collect();
    let mut sorted = keys.clone();
    sorted.sort_by(f64::total_cmp);
    assert_eq!(keys, sorted);

    let ages = analysis.get_age_value_counts().unwrap();
    assert_eq!(ages.iter().map(|c| c.count).sum::<usize>(), rows);
    assert_eq!(ages[0].value, GroupKey::Float(20.0));
    assert_eq!(ages[0].count, 2);

    let hours = analysis.get_study_hours_value_counts().unwrap();
    assert_eq!(hours.iter().map(|c| c.count).sum::<usize>(), rows);
    assert_eq!(hours.len(), 6);
    assert_eq!(hours[0].value, GroupKey::Float(0.0));
}

#[test]
fn summary_covers_numeric_columns() {
    let analysis = prepared();
    let summary = analysis.get_summary().unwrap();
    let names: Vec<String> = summary
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "statistic",
            "age",
            "study_hours_per_day",
            "social_media_hours",
            "netflix_hours",
            "part_time_job",
            "attendance_percentage",
            "extracurricular_participation",
            "exam_score",
            "total_leisure_hours",
            "study_efficiency",
            "parental_education_numeric",
        ]
    );
    let labels: Vec<Option<&str>> = summary
        .column("statistic")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(labels[0], Some("count"));
    assert_eq!(labels[1], Some("mean"));
    assert_eq!(labels[2], Some("std"));
}

#[test]
fn stage_guards() {
    let (_file, mut analysis) = loaded();
    assert!(matches!(
        analysis.transform(),
        Err(AnalysisError::PreconditionViolation(_))
    ));
    analysis.clean().unwrap();
    assert!(matches!(
        analysis.clean(),
        Err(AnalysisError::PreconditionViolation(_))
    ));
    analysis.transform().unwrap();
    assert_eq!(analysis.stage(), PipelineStage::Transformed);
    assert!(matches!(
        analysis.transform(),
        Err(AnalysisError::PreconditionViolation(_))
    ));
}

#[test]
fn invalid_flag_token_fails_clean() {
    let contents = SAMPLE.replace("S1002,21,Male,1.4,3.1,1.3,No", "S1002,21,Male,1.4,3.1,1.3,Maybe");
    let file = write_csv(&contents);
    let mut analysis = StudentAnalysis::from_csv(file.path(), &LoadOptions::default()).unwrap();
    let err = analysis.clean().unwrap_err();
    match err {
        AnalysisError::InvalidCategoricalValue { column, row, value } => {
            assert_eq!(column, "part_time_job");
            assert_eq!(row, 2);
            assert_eq!(value, "Maybe");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(analysis.dataframe().column("student_id").is_ok());
    assert_eq!(analysis.stage(), PipelineStage::Loaded);
}

#[test]
fn unknown_education_level_fails_transform() {
    let contents = SAMPLE.replace("Bachelor", "Doctorate");
    let file = write_csv(&contents);
    let mut analysis = StudentAnalysis::from_csv(file.path(), &LoadOptions::default()).unwrap();
    analysis.clean().unwrap();
    let err = analysis.transform().unwrap_err();
    assert!(matches!(err, AnalysisError::UnknownCategory { value, row: 4 } if value == "Doctorate"));
    assert_eq!(analysis.stage(), PipelineStage::Cleaned);
    assert!(analysis.dataframe().column("total_leisure_hours").is_err());
}

#[test]
fn empty_table_queries() {
    let header = SAMPLE.lines().next().unwrap();
    let file = write_csv(&format!("{header}\n"));
    let mut analysis = StudentAnalysis::from_csv(file.path(), &LoadOptions::default()).unwrap();
    analysis.prepare().unwrap();

    assert_eq!(analysis.dataframe().height(), 0);
    assert!(analysis.get_missing_values().iter().all(|m| m.missing == 0));
    let summary = analysis.get_summary().unwrap();
    assert_eq!(summary.height(), 8);
    assert!(matches!(
        analysis.get_score_mean(),
        Err(AnalysisError::EmptyTableError { .. })
    ));
    assert!(matches!(
        analysis.score_by_study_hours(),
        Err(AnalysisError::EmptyTableError { .. })
    ));
    assert_eq!(analysis.get_total_study_hours().unwrap(), 0.0);
    assert_eq!(analysis.get_total_social_media_hours().unwrap(), 0.0);
}

#[test]
fn report_renders_every_section() {
    let analysis = prepared();
    let report = AnalysisReport::collect(&analysis, Some("gender")).unwrap();

    let text = report.render_text();
    for title in [
        "Summary",
        "Missing values",
        "Exam scores",
        "Totals",
        "Mean exam score by study_hours_per_day",
        "Mean exam score by gender",
        "Age value counts",
        "Study hours value counts",
    ] {
        assert!(text.contains(title), "missing section {title}");
    }

    let json = report.to_json();
    assert_eq!(json["exam_score"]["max"], serde_json::json!(100.0));
    assert_eq!(json["score_by_column"]["column"], "gender");
    assert_eq!(json["summary"]["exam_score"]["count"], serde_json::json!(6.0));
}

#[test]
fn dataframe_input_groups_by_flag() {
    let df = df!(
        "student_id" => ["a", "b"],
        "age" => [19i64, 20],
        "exam_score" => [80.0, 60.0],
        "study_hours_per_day" => [2.0, 1.0],
        "social_media_hours" => [1.0, 1.0],
        "netflix_hours" => [1.0, 1.0],
        "parental_education_level" => ["Master", "None"],
        "part_time_job" => ["Yes", "No"],
        "extracurricular_participation" => ["No", "No"]
    )
    .unwrap();
    let mut analysis = StudentAnalysis::from_dataframe(df);
    analysis.prepare().unwrap();

    let groups = analysis.score_by_column("part_time_job").unwrap();
    let pairs: Vec<(GroupKey, f64)> = groups.into_iter().map(|g| (g.key, g.mean_score)).collect();
    assert_eq!(
        pairs,
        vec![(GroupKey::Integer(0), 60.0), (GroupKey::Integer(1), 80.0)]
    );
}
