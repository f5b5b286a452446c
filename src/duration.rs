use tracing::{debug, info};

use crate::error::Result;
use crate::models::{round1, DurationAnalysis, DurationBlock, DurationStatus, StageOccupancy};
use crate::stage::{COURSEWORK, THESIS_WRITING};
use crate::store::{OccupancyQuery, StageStore};

/// Expected semesters in the thesis-writing stage.
pub const THESIS_EXPECTED: f64 = 2.0;
/// Expected semesters in the coursework stage.
pub const COURSE_EXPECTED: f64 = 2.0;

/// Average delay above which a stage is reported as delayed.
const THESIS_DELAY_THRESHOLD: f64 = 0.0;
const COURSE_DELAY_THRESHOLD: f64 = 0.5;

pub async fn get_duration_analysis(store: &dyn StageStore) -> Result<DurationAnalysis> {
    info!("computing stage duration analysis");

    let thesis_query = OccupancyQuery::stage(THESIS_WRITING);
    let course_query = OccupancyQuery::stage(COURSEWORK);
    let (mut rows, course_rows) = tokio::try_join!(
        store.occupancies(&thesis_query),
        store.occupancies(&course_query),
    )?;
    debug!(
        thesis = rows.len(),
        coursework = course_rows.len(),
        "duration inputs loaded"
    );

    rows.extend(course_rows);
    Ok(analyze_durations(&rows))
}

pub fn analyze_durations(occupancies: &[StageOccupancy]) -> DurationAnalysis {
    DurationAnalysis {
        thesis_writing: analyze_stage(
            occupancies,
            THESIS_WRITING,
            THESIS_EXPECTED,
            THESIS_DELAY_THRESHOLD,
        ),
        course_period: analyze_stage(
            occupancies,
            COURSEWORK,
            COURSE_EXPECTED,
            COURSE_DELAY_THRESHOLD,
        ),
    }
}

/// Each row's duration is the expected duration plus its delay. The status
/// is decided on the unrounded average delay.
fn analyze_stage(
    occupancies: &[StageOccupancy],
    stage_code: &str,
    expected: f64,
    threshold: f64,
) -> DurationBlock {
    let durations: Vec<f64> = occupancies
        .iter()
        .filter(|o| o.stage_code == stage_code)
        .map(|o| expected + o.delay_semesters)
        .collect();

    let (avg_duration, delay) = if durations.is_empty() {
        (0.0, 0.0)
    } else {
        let avg = durations.iter().sum::<f64>() / durations.len() as f64;
        (avg, avg - expected)
    };

    DurationBlock {
        avg_duration: round1(avg_duration),
        expected_duration: expected,
        delay: round1(delay),
        status: if delay > threshold {
            DurationStatus::Delayed
        } else {
            DurationStatus::Normal
        },
    }
}
