use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status code of students counted as active
pub const STATUS_ACTIVE: &str = "Aktif";
/// Status code of graduated students
pub const STATUS_GRADUATED: &str = "Mezun";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusType {
    pub status_id: Uuid,
    pub status_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramType {
    pub program_type_id: Uuid,
    pub program_name: String,
    pub program_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub student_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub student_number: Option<String>,
    pub program_type_id: Option<Uuid>,
    pub program: Option<ProgramType>,
    pub advisor_id: Option<Uuid>,
    pub enrollment_date: Option<NaiveDate>,
    pub graduation_date: Option<NaiveDate>,
    pub status_id: Option<Uuid>,
}

impl StudentRecord {
    /// "first last", trimmed; missing parts render as empty.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Current stage of one student. Callers supply at most one per student.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOccupancy {
    pub student_id: Uuid,
    pub stage_code: String,
    pub stage_name: String,
    pub delay_semesters: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorRecord {
    pub advisor_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
}

impl AdvisorRecord {
    /// "title first last", trimmed.
    pub fn display_name(&self) -> String {
        format!(
            "{} {} {}",
            self.title.as_deref().unwrap_or(""),
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub total_students: usize,
    pub year_change: String,
    pub risky_count: usize,
    pub avg_completion: f64,
    pub expected_completion: f64,
    pub this_semester_graduates: usize,
    pub current_semester: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage_code: String,
    pub stage_name: String,
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDistribution {
    pub stages: Vec<StageCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DurationStatus {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Gecikme")]
    Delayed,
}

impl DurationStatus {
    pub fn label(self) -> &'static str {
        match self {
            DurationStatus::Normal => "Normal",
            DurationStatus::Delayed => "Gecikme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationBlock {
    pub avg_duration: f64,
    pub expected_duration: f64,
    pub delay: f64,
    pub status: DurationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationAnalysis {
    pub thesis_writing: DurationBlock,
    pub course_period: DurationBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DelaySeverity {
    Medium,
    High,
    Critical,
}

impl DelaySeverity {
    pub fn label(self) -> &'static str {
        match self {
            DelaySeverity::Medium => "medium",
            DelaySeverity::High => "high",
            DelaySeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedStudentView {
    pub student_id: Uuid,
    pub name: String,
    pub student_no: String,
    pub program: String,
    pub program_code: String,
    pub current_stage: String,
    pub stage_code: String,
    pub advisor: String,
    pub delay_semesters: f64,
    pub delay_status: DelaySeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayedStudents {
    pub students: Vec<DelayedStudentView>,
}

/// Optional filters for the delayed-student list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedFilters {
    pub program_id: Option<Uuid>,
    pub advisor_id: Option<Uuid>,
    pub semester: Option<String>,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
