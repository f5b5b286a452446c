use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{
    DelayedStudents, DurationAnalysis, DurationBlock, StageDistribution, SummaryResult,
};

/// Rows listed in the delayed-student section.
const REPORT_STUDENT_ROWS: usize = 20;

pub fn build_report(
    as_of: NaiveDate,
    summary: &SummaryResult,
    distribution: &StageDistribution,
    durations: &DurationAnalysis,
    delayed: &DelayedStudents,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Stage Tracking Report");
    let _ = writeln!(
        output,
        "Generated {} for the {} semester",
        as_of, summary.current_semester
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- Active students: {} ({} year over year)",
        summary.total_students, summary.year_change
    );
    let _ = writeln!(output, "- Delayed students: {}", summary.risky_count);
    let _ = writeln!(
        output,
        "- Average completion: {:.1} semesters (expected {:.1})",
        summary.avg_completion, summary.expected_completion
    );
    let _ = writeln!(
        output,
        "- Graduates this semester: {}",
        summary.this_semester_graduates
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Stage Distribution");

    if distribution.stages.is_empty() {
        let _ = writeln!(output, "No stage records found.");
    } else {
        for stage in distribution.stages.iter() {
            let _ = writeln!(
                output,
                "- {} ({}): {} students",
                stage.stage_name, stage.stage_code, stage.student_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Duration Analysis");
    write_duration(&mut output, "Thesis writing", &durations.thesis_writing);
    write_duration(&mut output, "Coursework", &durations.course_period);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Delayed Students");

    if delayed.students.is_empty() {
        let _ = writeln!(output, "No delayed students.");
    } else {
        for student in delayed.students.iter().take(REPORT_STUDENT_ROWS) {
            let advisor = if student.advisor.is_empty() {
                "no advisor"
            } else {
                student.advisor.as_str()
            };
            let _ = writeln!(
                output,
                "- {} ({}, {}) in {}: {:.1} semesters behind [{}], advisor {}",
                student.name,
                student.student_no,
                student.program_code,
                student.current_stage,
                student.delay_semesters,
                student.delay_status.label(),
                advisor
            );
        }
        if delayed.students.len() > REPORT_STUDENT_ROWS {
            let _ = writeln!(
                output,
                "- ... and {} more",
                delayed.students.len() - REPORT_STUDENT_ROWS
            );
        }
    }

    output
}

fn write_duration(output: &mut String, label: &str, block: &DurationBlock) {
    let _ = writeln!(
        output,
        "- {}: {:.1} semesters on average (expected {:.1}, delay {:.1}) - {}",
        label,
        block.avg_duration,
        block.expected_duration,
        block.delay,
        block.status.label()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DelaySeverity, DelayedStudentView, DurationStatus, StageCount};
    use uuid::Uuid;

    fn summary() -> SummaryResult {
        SummaryResult {
            total_students: 42,
            year_change: "0%".to_string(),
            risky_count: 7,
            avg_completion: 4.6,
            expected_completion: 4.0,
            this_semester_graduates: 3,
            current_semester: "2023-2024 Bahar".to_string(),
        }
    }

    fn block(status: DurationStatus) -> DurationBlock {
        DurationBlock {
            avg_duration: 2.4,
            expected_duration: 2.0,
            delay: 0.4,
            status,
        }
    }

    #[test]
    fn report_lists_every_section() {
        let distribution = StageDistribution {
            stages: vec![StageCount {
                stage_code: "DERS_DONEMI".to_string(),
                stage_name: "Ders Dönemi".to_string(),
                student_count: 12,
            }],
        };
        let durations = DurationAnalysis {
            thesis_writing: block(DurationStatus::Delayed),
            course_period: block(DurationStatus::Normal),
        };
        let delayed = DelayedStudents {
            students: vec![DelayedStudentView {
                student_id: Uuid::new_v4(),
                name: "Can Yıldız".to_string(),
                student_no: "2018011".to_string(),
                program: "Kimya Doktora".to_string(),
                program_code: "KM-DR".to_string(),
                current_stage: "Tez Çalışması".to_string(),
                stage_code: "TEZ_CALISMASI".to_string(),
                advisor: String::new(),
                delay_semesters: 3.0,
                delay_status: DelaySeverity::Critical,
            }],
        };

        let as_of = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let report = build_report(as_of, &summary(), &distribution, &durations, &delayed);

        assert!(report.contains("Generated 2024-03-15 for the 2023-2024 Bahar semester"));
        assert!(report.contains("- Active students: 42 (0% year over year)"));
        assert!(report.contains("- Ders Dönemi (DERS_DONEMI): 12 students"));
        assert!(report.contains("- Thesis writing: 2.4 semesters on average (expected 2.0, delay 0.4) - Gecikme"));
        assert!(report.contains("- Coursework: 2.4 semesters on average (expected 2.0, delay 0.4) - Normal"));
        assert!(report.contains("3.0 semesters behind [critical], advisor no advisor"));
    }

    #[test]
    fn empty_sections_have_placeholders() {
        let durations = DurationAnalysis {
            thesis_writing: block(DurationStatus::Normal),
            course_period: block(DurationStatus::Normal),
        };
        let report = build_report(
            NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            &summary(),
            &StageDistribution { stages: vec![] },
            &durations,
            &DelayedStudents { students: vec![] },
        );
        assert!(report.contains("No stage records found."));
        assert!(report.contains("No delayed students."));
    }
}
