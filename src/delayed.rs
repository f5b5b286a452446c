//! Ranked list of delayed students.
//!
//! Two phases: rank occupancy rows by delay and keep the top
//! [`DELAYED_LIMIT`], then fetch (and filter) the matching students, enrich
//! them with stage and advisor details and sort the result again by delay.
//! Filters only ever shrink the ranked set; students cut by the limit are
//! never brought back.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AdvisorRecord, DelayedFilters, DelayedStudentView, DelayedStudents, StageOccupancy,
    StudentRecord,
};
use crate::risk;
use crate::semester::SemesterLabel;
use crate::store::{OccupancyQuery, StageStore, StudentQuery};

/// Delayed rows considered before any filtering.
pub const DELAYED_LIMIT: usize = 50;

pub async fn get_delayed_students(
    store: &dyn StageStore,
    filters: &DelayedFilters,
) -> Result<DelayedStudents> {
    info!(
        program_id = ?filters.program_id,
        advisor_id = ?filters.advisor_id,
        semester = ?filters.semester,
        "listing delayed students"
    );
    if let Some(label) = &filters.semester {
        match label.parse::<SemesterLabel>() {
            Ok(semester) => {
                debug!(%semester, "semester filter accepted; it does not narrow the list")
            }
            Err(err) => warn!(%err, "ignoring unrecognised semester filter"),
        }
    }

    let delayed = store.occupancies(&OccupancyQuery::delayed()).await?;
    let ranked = top_delayed(&delayed);
    if ranked.is_empty() {
        debug!("no delayed students");
        return Ok(DelayedStudents { students: vec![] });
    }

    let query = student_query(&ranked, filters);
    let students = store.students(&query).await?;

    let advisor_ids = distinct_advisor_ids(&students);
    let advisors = if advisor_ids.is_empty() {
        Vec::new()
    } else {
        store.advisors(&advisor_ids).await?
    };
    debug!(
        ranked = ranked.len(),
        students = students.len(),
        advisors = advisors.len(),
        "delayed student inputs loaded"
    );

    Ok(DelayedStudents {
        students: assemble_views(&ranked, &students, &advisors),
    })
}

/// In-memory equivalent of [`get_delayed_students`] over full snapshots.
pub fn rank_delayed_students(
    occupancies: &[StageOccupancy],
    students: &[StudentRecord],
    advisors: &[AdvisorRecord],
    filters: &DelayedFilters,
) -> DelayedStudents {
    let ranked = top_delayed(occupancies);
    if ranked.is_empty() {
        return DelayedStudents { students: vec![] };
    }

    let query = student_query(&ranked, filters);
    let selected: Vec<StudentRecord> = students
        .iter()
        .filter(|s| query.matches(s))
        .cloned()
        .collect();

    let advisor_ids: HashSet<Uuid> = distinct_advisor_ids(&selected).into_iter().collect();
    let advisors: Vec<AdvisorRecord> = advisors
        .iter()
        .filter(|a| advisor_ids.contains(&a.advisor_id))
        .cloned()
        .collect();

    DelayedStudents {
        students: assemble_views(&ranked, &selected, &advisors),
    }
}

/// Delayed rows, most delayed first, capped at [`DELAYED_LIMIT`].
pub fn top_delayed(occupancies: &[StageOccupancy]) -> Vec<StageOccupancy> {
    let mut ranked: Vec<StageOccupancy> = occupancies
        .iter()
        .filter(|o| risk::is_delayed(o.delay_semesters))
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.delay_semesters.total_cmp(&a.delay_semesters));
    ranked.truncate(DELAYED_LIMIT);
    ranked
}

fn student_query(ranked: &[StageOccupancy], filters: &DelayedFilters) -> StudentQuery {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = ranked
        .iter()
        .map(|o| o.student_id)
        .filter(|id| seen.insert(*id))
        .collect();

    StudentQuery {
        ids: Some(ids),
        status_id: None,
        program_id: filters.program_id,
        advisor_id: filters.advisor_id,
    }
}

fn distinct_advisor_ids(students: &[StudentRecord]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    students
        .iter()
        .filter_map(|s| s.advisor_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Join students with their ranked stage row and advisor, most delayed first.
pub fn assemble_views(
    ranked: &[StageOccupancy],
    students: &[StudentRecord],
    advisors: &[AdvisorRecord],
) -> Vec<DelayedStudentView> {
    let mut stages: HashMap<Uuid, &StageOccupancy> = HashMap::new();
    for occupancy in ranked {
        stages.entry(occupancy.student_id).or_insert(occupancy);
    }
    let advisors: HashMap<Uuid, &AdvisorRecord> =
        advisors.iter().map(|a| (a.advisor_id, a)).collect();

    let mut views: Vec<DelayedStudentView> = students
        .iter()
        .map(|student| {
            let stage = stages.get(&student.student_id);
            let advisor = student.advisor_id.and_then(|id| advisors.get(&id));
            let delay_semesters = stage.map(|s| s.delay_semesters).unwrap_or(0.0);

            DelayedStudentView {
                student_id: student.student_id,
                name: student.full_name(),
                student_no: student.student_number.clone().unwrap_or_default(),
                program: student
                    .program
                    .as_ref()
                    .map(|p| p.program_name.clone())
                    .unwrap_or_default(),
                program_code: student
                    .program
                    .as_ref()
                    .map(|p| p.program_code.clone())
                    .unwrap_or_default(),
                current_stage: stage.map(|s| s.stage_name.clone()).unwrap_or_default(),
                stage_code: stage.map(|s| s.stage_code.clone()).unwrap_or_default(),
                advisor: advisor.map(|a| a.display_name()).unwrap_or_default(),
                delay_semesters,
                delay_status: risk::classify(delay_semesters),
            }
        })
        .collect();

    views.sort_by(|a, b| b.delay_semesters.total_cmp(&a.delay_semesters));
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DelaySeverity, ProgramType};

    fn occupancy(student_id: Uuid, delay: f64) -> StageOccupancy {
        StageOccupancy {
            student_id,
            stage_code: "TEZ_CALISMASI".to_string(),
            stage_name: "Tez Çalışması".to_string(),
            delay_semesters: delay,
        }
    }

    fn student(student_id: Uuid, program: Option<Uuid>, advisor: Option<Uuid>) -> StudentRecord {
        StudentRecord {
            student_id,
            first_name: Some("Elif".to_string()),
            last_name: Some("Demir".to_string()),
            student_number: Some("2019042".to_string()),
            program_type_id: program,
            program: program.map(|id| ProgramType {
                program_type_id: id,
                program_name: "Bilgisayar Mühendisliği Doktora".to_string(),
                program_code: "BM-DR".to_string(),
            }),
            advisor_id: advisor,
            enrollment_date: None,
            graduation_date: None,
            status_id: None,
        }
    }

    #[test]
    fn ranks_by_delay_and_caps() {
        let rows: Vec<StageOccupancy> = (0..60)
            .map(|i| occupancy(Uuid::new_v4(), f64::from(i % 7)))
            .collect();
        let ranked = top_delayed(&rows);
        assert_eq!(ranked.len(), DELAYED_LIMIT);
        assert!(ranked.iter().all(|o| o.delay_semesters > 0.0));
        assert!(ranked
            .windows(2)
            .all(|w| w[0].delay_semesters >= w[1].delay_semesters));
    }

    #[test]
    fn filters_never_backfill_past_the_cap() {
        let program = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut rows = Vec::new();
        let mut students = Vec::new();

        // Top 50: five in the requested program, 45 elsewhere.
        for i in 0..50 {
            let id = Uuid::new_v4();
            rows.push(occupancy(id, 10.0 + f64::from(i)));
            students.push(student(id, Some(if i < 5 { program } else { other }), None));
        }
        // Ten less-delayed students in the requested program.
        for _ in 0..10 {
            let id = Uuid::new_v4();
            rows.push(occupancy(id, 1.0));
            students.push(student(id, Some(program), None));
        }

        let filters = DelayedFilters {
            program_id: Some(program),
            ..Default::default()
        };
        let result = rank_delayed_students(&rows, &students, &[], &filters);
        assert_eq!(result.students.len(), 5);
        assert!(result.students.iter().all(|s| s.delay_semesters >= 10.0));
    }

    #[test]
    fn final_order_is_by_delay_not_student_order() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let ranked = vec![
            occupancy(ids[0], 3.0),
            occupancy(ids[1], 2.0),
            occupancy(ids[2], 1.0),
        ];
        let students = vec![
            student(ids[2], None, None),
            student(ids[0], None, None),
            student(ids[1], None, None),
        ];
        let views = assemble_views(&ranked, &students, &[]);
        let delays: Vec<f64> = views.iter().map(|v| v.delay_semesters).collect();
        assert_eq!(delays, vec![3.0, 2.0, 1.0]);
        assert_eq!(views[0].delay_status, DelaySeverity::Critical);
        assert_eq!(views[1].delay_status, DelaySeverity::High);
        assert_eq!(views[2].delay_status, DelaySeverity::Medium);
    }

    #[test]
    fn first_occupancy_wins_for_duplicates() {
        let id = Uuid::new_v4();
        let mut later = occupancy(id, 1.0);
        later.stage_code = "DERS_DONEMI".to_string();
        let ranked = vec![occupancy(id, 4.0), later];
        let views = assemble_views(&ranked, &[student(id, None, None)], &[]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].stage_code, "TEZ_CALISMASI");
        assert_eq!(views[0].delay_semesters, 4.0);
    }

    #[test]
    fn view_fields_are_formatted_and_defaulted() {
        let id = Uuid::new_v4();
        let advisor_id = Uuid::new_v4();
        let program = Uuid::new_v4();
        let advisors = vec![AdvisorRecord {
            advisor_id,
            first_name: Some("Ahmet".to_string()),
            last_name: Some("Öz".to_string()),
            title: Some("Prof. Dr.".to_string()),
        }];
        let mut bare = student(Uuid::new_v4(), None, None);
        bare.first_name = None;
        bare.student_number = None;

        let ranked = vec![occupancy(id, 2.0), occupancy(bare.student_id, 1.0)];
        let students = vec![student(id, Some(program), Some(advisor_id)), bare];
        let views = assemble_views(&ranked, &students, &advisors);

        assert_eq!(views[0].name, "Elif Demir");
        assert_eq!(views[0].advisor, "Prof. Dr. Ahmet Öz");
        assert_eq!(views[0].program_code, "BM-DR");
        assert_eq!(views[0].current_stage, "Tez Çalışması");

        assert_eq!(views[1].name, "Demir");
        assert_eq!(views[1].student_no, "");
        assert_eq!(views[1].program, "");
        assert_eq!(views[1].advisor, "");
    }

    #[test]
    fn nothing_delayed_gives_empty_list() {
        let id = Uuid::new_v4();
        let result = rank_delayed_students(
            &[occupancy(id, 0.0)],
            &[student(id, None, None)],
            &[],
            &DelayedFilters::default(),
        );
        assert!(result.students.is_empty());
    }

    #[test]
    fn view_serializes_with_wire_names() {
        let id = Uuid::new_v4();
        let views = assemble_views(&[occupancy(id, 3.0)], &[student(id, None, None)], &[]);
        let json = serde_json::to_value(&views[0]).unwrap();
        assert_eq!(json["studentNo"], "2019042");
        assert_eq!(json["delayStatus"], "critical");
        assert_eq!(json["stageCode"], "TEZ_CALISMASI");
    }
}
