//! Known columns of the student habits dataset and their categorical domains.

use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Columns the pipeline knows by name.
///
/// Anything else in the input file is a passthrough column: it is carried
/// through cleaning and transformation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StudentColumn {
    StudentId,
    Age,
    ExamScore,
    StudyHoursPerDay,
    SocialMediaHours,
    NetflixHours,
    ParentalEducationLevel,
    PartTimeJob,
    ExtracurricularParticipation,
    TotalLeisureHours,
    StudyEfficiency,
    AgeGroup,
    ParentalEducationNumeric,
}

impl StudentColumn {
    pub const ALL: [StudentColumn; 13] = [
        StudentColumn::StudentId,
        StudentColumn::Age,
        StudentColumn::ExamScore,
        StudentColumn::StudyHoursPerDay,
        StudentColumn::SocialMediaHours,
        StudentColumn::NetflixHours,
        StudentColumn::ParentalEducationLevel,
        StudentColumn::PartTimeJob,
        StudentColumn::ExtracurricularParticipation,
        StudentColumn::TotalLeisureHours,
        StudentColumn::StudyEfficiency,
        StudentColumn::AgeGroup,
        StudentColumn::ParentalEducationNumeric,
    ];

    /// Numeric columns that get median imputation during cleaning.
    pub const NUMERIC: [StudentColumn; 5] = [
        StudentColumn::Age,
        StudentColumn::ExamScore,
        StudentColumn::StudyHoursPerDay,
        StudentColumn::SocialMediaHours,
        StudentColumn::NetflixHours,
    ];

    /// Yes/No columns mapped to 1/0 during cleaning.
    pub const YES_NO: [StudentColumn; 2] = [
        StudentColumn::PartTimeJob,
        StudentColumn::ExtracurricularParticipation,
    ];

    /// Columns produced by the transformer, in derivation order.
    pub const DERIVED: [StudentColumn; 4] = [
        StudentColumn::TotalLeisureHours,
        StudentColumn::StudyEfficiency,
        StudentColumn::AgeGroup,
        StudentColumn::ParentalEducationNumeric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StudentColumn::StudentId => "student_id",
            StudentColumn::Age => "age",
            StudentColumn::ExamScore => "exam_score",
            StudentColumn::StudyHoursPerDay => "study_hours_per_day",
            StudentColumn::SocialMediaHours => "social_media_hours",
            StudentColumn::NetflixHours => "netflix_hours",
            StudentColumn::ParentalEducationLevel => "parental_education_level",
            StudentColumn::PartTimeJob => "part_time_job",
            StudentColumn::ExtracurricularParticipation => "extracurricular_participation",
            StudentColumn::TotalLeisureHours => "total_leisure_hours",
            StudentColumn::StudyEfficiency => "study_efficiency",
            StudentColumn::AgeGroup => "age_group",
            StudentColumn::ParentalEducationNumeric => "parental_education_numeric",
        }
    }
}

impl fmt::Display for StudentColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StudentColumn {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudentColumn::ALL
            .into_iter()
            .find(|column| column.name() == s)
            .ok_or_else(|| AnalysisError::ColumnNotFound {
                column: s.to_string(),
            })
    }
}

/// Parental education level, ordered by attainment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EducationLevel {
    None,
    HighSchool,
    Bachelor,
    Master,
}

impl EducationLevel {
    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::None => "None",
            EducationLevel::HighSchool => "High School",
            EducationLevel::Bachelor => "Bachelor",
            EducationLevel::Master => "Master",
        }
    }

    pub fn numeric(self) -> i32 {
        match self {
            EducationLevel::None => 0,
            EducationLevel::HighSchool => 1,
            EducationLevel::Bachelor => 2,
            EducationLevel::Master => 3,
        }
    }

    /// Exact, case-sensitive label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "None" => Some(EducationLevel::None),
            "High School" => Some(EducationLevel::HighSchool),
            "Bachelor" => Some(EducationLevel::Bachelor),
            "Master" => Some(EducationLevel::Master),
            _ => None,
        }
    }
}

/// Age bucket derived from `age`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Under18,
    From18To21,
    From22,
}

impl AgeGroup {
    pub fn from_age(age: f64) -> Self {
        if age >= 22.0 {
            AgeGroup::From22
        } else if age >= 18.0 {
            AgeGroup::From18To21
        } else {
            AgeGroup::Under18
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Under18 => "<18",
            AgeGroup::From18To21 => "18-21",
            AgeGroup::From22 => "22+",
        }
    }
}

/// Parse a Yes/No flag. `None` means the token is not recognized.
pub fn parse_yes_no(token: &str) -> Option<i32> {
    match token {
        "Yes" => Some(1),
        "No" => Some(0),
        _ => None,
    }
}
