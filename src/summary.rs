use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    round1, StageOccupancy, StatusType, StudentRecord, SummaryResult, STATUS_ACTIVE,
    STATUS_GRADUATED,
};
use crate::risk;
use crate::semester::{current_semester, semester_date_range};
use crate::store::{OccupancyQuery, StageStore, StudentQuery};

/// Expected time to graduate, in semesters.
pub const EXPECTED_COMPLETION: f64 = 4.0;
/// Graduates sampled for the average completion time.
pub const COMPLETION_SAMPLE: usize = 100;
/// Reported change when there is no prior-year baseline.
pub const FALLBACK_YEAR_CHANGE: i64 = 12;

const DAYS_PER_MONTH: f64 = 30.0;
const MONTHS_PER_SEMESTER: f64 = 6.0;

pub async fn get_summary(store: &dyn StageStore, today: NaiveDate) -> Result<SummaryResult> {
    info!(%today, "computing stage-tracking summary");

    let all_students = StudentQuery::default();
    let delayed = OccupancyQuery::delayed();
    let (status_types, students, occupancies) = tokio::try_join!(
        store.status_types(),
        store.students(&all_students),
        store.occupancies(&delayed),
    )?;
    debug!(
        status_types = status_types.len(),
        students = students.len(),
        delayed = occupancies.len(),
        "summary inputs loaded"
    );

    Ok(compute_summary(&students, &occupancies, &status_types, today))
}

pub fn compute_summary(
    students: &[StudentRecord],
    occupancies: &[StageOccupancy],
    status_types: &[StatusType],
    today: NaiveDate,
) -> SummaryResult {
    let active_id = status_id(status_types, STATUS_ACTIVE);
    let graduated_id = status_id(status_types, STATUS_GRADUATED);

    let total_students = match active_id {
        Some(id) => count_with_status(students, id),
        None => {
            warn!("status type {STATUS_ACTIVE:?} missing; active population defaults to 0");
            0
        }
    };

    // No prior-year snapshot exists yet; the baseline is the current count.
    let baseline = total_students;
    let year_change = format_year_change(year_change_percent(total_students, baseline));

    let risky_count = occupancies
        .iter()
        .filter(|o| risk::is_delayed(o.delay_semesters))
        .count();

    let semester = current_semester(today);
    let (avg_completion, this_semester_graduates) = match graduated_id {
        Some(id) => {
            let graduates: Vec<&StudentRecord> = students
                .iter()
                .filter(|s| s.status_id == Some(id))
                .collect();
            let graduates_in_term = match semester_date_range(&semester) {
                Ok((start, end)) => graduates
                    .iter()
                    .filter(|s| {
                        s.graduation_date
                            .map(|d| d >= start && d <= end)
                            .unwrap_or(false)
                    })
                    .count(),
                Err(err) => {
                    warn!(%err, "no date range for current semester");
                    0
                }
            };
            (average_completion(&graduates), graduates_in_term)
        }
        None => {
            warn!("status type {STATUS_GRADUATED:?} missing; completion metrics default to 0");
            (0.0, 0)
        }
    };

    SummaryResult {
        total_students,
        year_change,
        risky_count,
        avg_completion: round1(avg_completion),
        expected_completion: EXPECTED_COMPLETION,
        this_semester_graduates,
        current_semester: semester.to_string(),
    }
}

fn status_id(status_types: &[StatusType], code: &str) -> Option<Uuid> {
    status_types
        .iter()
        .find(|s| s.status_code == code)
        .map(|s| s.status_id)
}

fn count_with_status(students: &[StudentRecord], id: Uuid) -> usize {
    students.iter().filter(|s| s.status_id == Some(id)).count()
}

/// Mean time to graduate, in semesters, over the first sampled graduates
/// that have both dates.
fn average_completion(graduates: &[&StudentRecord]) -> f64 {
    let durations: Vec<f64> = graduates
        .iter()
        .filter_map(|s| match (s.enrollment_date, s.graduation_date) {
            (Some(start), Some(end)) => Some(duration_semesters(start, end)),
            _ => None,
        })
        .take(COMPLETION_SAMPLE)
        .collect();

    if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    }
}

/// Elapsed time between two dates, counting 30-day months and 6-month semesters.
pub fn duration_semesters(start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days().abs() as f64;
    days / DAYS_PER_MONTH / MONTHS_PER_SEMESTER
}

pub fn year_change_percent(current: usize, baseline: usize) -> i64 {
    if baseline == 0 {
        return FALLBACK_YEAR_CHANGE;
    }
    let change = (current as f64 - baseline as f64) / baseline as f64 * 100.0;
    change.round() as i64
}

pub fn format_year_change(percent: i64) -> String {
    if percent > 0 {
        format!("+{percent}%")
    } else {
        format!("{percent}%")
    }
}
