//! In-memory store, optionally loaded from a directory of CSV exports.
//!
//! Expected files: `status_types.csv`, `students.csv`,
//! `stage_occupancy.csv` and (optionally) `advisors.csv`.

use std::fs::File;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AdvisorRecord, ProgramType, StageOccupancy, StatusType, StudentRecord};
use crate::store::{OccupancyQuery, StageStore, StudentQuery};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub status_types: Vec<StatusType>,
    pub students: Vec<StudentRecord>,
    pub occupancies: Vec<StageOccupancy>,
    pub advisors: Vec<AdvisorRecord>,
}

#[derive(Deserialize)]
struct StatusRow {
    status_id: Uuid,
    status_code: String,
}

#[derive(Deserialize)]
struct StudentRow {
    student_id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    student_number: Option<String>,
    program_type_id: Option<Uuid>,
    program_name: Option<String>,
    program_code: Option<String>,
    advisor_id: Option<Uuid>,
    enrollment_date: Option<NaiveDate>,
    graduation_date: Option<NaiveDate>,
    status_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct OccupancyRow {
    student_id: Uuid,
    stage_code: String,
    stage_name: Option<String>,
    delay_semesters: Option<f64>,
}

#[derive(Deserialize)]
struct AdvisorRow {
    advisor_id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    title: Option<String>,
}

impl From<StudentRow> for StudentRecord {
    fn from(row: StudentRow) -> Self {
        let program = match row.program_type_id {
            Some(id) if row.program_name.is_some() || row.program_code.is_some() => {
                Some(ProgramType {
                    program_type_id: id,
                    program_name: row.program_name.unwrap_or_default(),
                    program_code: row.program_code.unwrap_or_default(),
                })
            }
            _ => None,
        };

        StudentRecord {
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            student_number: row.student_number,
            program_type_id: row.program_type_id,
            program,
            advisor_id: row.advisor_id,
            enrollment_date: row.enrollment_date,
            graduation_date: row.graduation_date,
            status_id: row.status_id,
        }
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result?);
    }
    Ok(rows)
}

impl MemoryStore {
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let status_types = read_rows::<StatusRow>(&dir.join("status_types.csv"))?
            .into_iter()
            .map(|r| StatusType {
                status_id: r.status_id,
                status_code: r.status_code,
            })
            .collect();

        let students = read_rows::<StudentRow>(&dir.join("students.csv"))?
            .into_iter()
            .map(StudentRecord::from)
            .collect();

        let occupancies = read_rows::<OccupancyRow>(&dir.join("stage_occupancy.csv"))?
            .into_iter()
            .map(|r| StageOccupancy {
                student_id: r.student_id,
                stage_code: r.stage_code,
                stage_name: r.stage_name.unwrap_or_default(),
                delay_semesters: r.delay_semesters.unwrap_or(0.0),
            })
            .collect();

        let advisors_path = dir.join("advisors.csv");
        let advisors = if advisors_path.exists() {
            read_rows::<AdvisorRow>(&advisors_path)?
                .into_iter()
                .map(|r| AdvisorRecord {
                    advisor_id: r.advisor_id,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    title: r.title,
                })
                .collect()
        } else {
            Vec::new()
        };

        let store = MemoryStore {
            status_types,
            students,
            occupancies,
            advisors,
        };
        info!(
            dir = %dir.display(),
            students = store.students.len(),
            occupancies = store.occupancies.len(),
            advisors = store.advisors.len(),
            "snapshot loaded"
        );
        Ok(store)
    }
}

#[async_trait]
impl StageStore for MemoryStore {
    async fn status_types(&self) -> Result<Vec<StatusType>> {
        let mut types = self.status_types.clone();
        types.sort_by_key(|t| t.status_id);
        Ok(types)
    }

    async fn students(&self, query: &StudentQuery) -> Result<Vec<StudentRecord>> {
        let mut students: Vec<StudentRecord> = self
            .students
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        students.sort_by_key(|s| s.student_id);
        Ok(students)
    }

    async fn occupancies(&self, query: &OccupancyQuery) -> Result<Vec<StageOccupancy>> {
        let mut rows: Vec<StageOccupancy> = self
            .occupancies
            .iter()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        rows.sort_by_key(|o| o.student_id);
        Ok(rows)
    }

    async fn advisors(&self, ids: &[Uuid]) -> Result<Vec<AdvisorRecord>> {
        let mut advisors: Vec<AdvisorRecord> = self
            .advisors
            .iter()
            .filter(|a| ids.contains(&a.advisor_id))
            .cloned()
            .collect();
        advisors.sort_by_key(|a| a.advisor_id);
        Ok(advisors)
    }
}
