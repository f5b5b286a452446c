//! Read-only access to the student snapshot.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AdvisorRecord, StageOccupancy, StatusType, StudentRecord};
use crate::risk;

/// Student fetch filters; set fields are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    pub ids: Option<Vec<Uuid>>,
    pub status_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub advisor_id: Option<Uuid>,
}

impl StudentQuery {
    pub fn matches(&self, student: &StudentRecord) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&student.student_id) {
                return false;
            }
        }
        if self.status_id.is_some() && student.status_id != self.status_id {
            return false;
        }
        if self.program_id.is_some() && student.program_type_id != self.program_id {
            return false;
        }
        if self.advisor_id.is_some() && student.advisor_id != self.advisor_id {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyQuery {
    /// Only rows with `delay_semesters > 0`
    pub delayed_only: bool,
    pub stage_code: Option<String>,
}

impl OccupancyQuery {
    pub fn delayed() -> Self {
        OccupancyQuery {
            delayed_only: true,
            stage_code: None,
        }
    }

    pub fn stage(code: &str) -> Self {
        OccupancyQuery {
            delayed_only: false,
            stage_code: Some(code.to_string()),
        }
    }

    pub fn matches(&self, occupancy: &StageOccupancy) -> bool {
        if self.delayed_only && !risk::is_delayed(occupancy.delay_semesters) {
            return false;
        }
        match &self.stage_code {
            Some(code) => occupancy.stage_code == *code,
            None => true,
        }
    }
}

/// Source of student, stage and advisor rows.
///
/// Implementations return rows ordered by their primary id so repeated calls
/// over the same data are identical.
#[async_trait]
pub trait StageStore: Send + Sync {
    async fn status_types(&self) -> Result<Vec<StatusType>>;

    async fn students(&self, query: &StudentQuery) -> Result<Vec<StudentRecord>>;

    async fn occupancies(&self, query: &OccupancyQuery) -> Result<Vec<StageOccupancy>>;

    async fn advisors(&self, ids: &[Uuid]) -> Result<Vec<AdvisorRecord>>;
}
