//! Academic semester labels ("2024-2025 Güz") and their date ranges.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Güz
    Fall,
    /// Bahar
    Spring,
}

impl Term {
    pub fn label(self) -> &'static str {
        match self {
            Term::Fall => "Güz",
            Term::Spring => "Bahar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemesterLabel {
    pub start_year: i32,
    pub term: Term,
}

impl fmt::Display for SemesterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {}",
            self.start_year,
            i64::from(self.start_year) + 1,
            self.term.label()
        )
    }
}

impl FromStr for SemesterLabel {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("invalid semester label: {value:?}"));

        let (years, term) = value.trim().split_once(' ').ok_or_else(invalid)?;
        let term = match term.trim() {
            "Güz" => Term::Fall,
            "Bahar" => Term::Spring,
            _ => return Err(invalid()),
        };
        let (start, end) = years.split_once('-').ok_or_else(invalid)?;
        let start_year: i32 = start.parse().map_err(|_| invalid())?;
        let end_year: i32 = end.parse().map_err(|_| invalid())?;
        if start_year.checked_add(1) != Some(end_year) {
            return Err(invalid());
        }

        Ok(SemesterLabel { start_year, term })
    }
}

/// Semester in progress on `today`.
///
/// September through January belong to the fall term starting in September
/// (so January falls in the preceding academic year); February through August
/// belong to the spring term of the academic year that started the previous
/// calendar year.
///
/// January differs from the legacy dashboard API, which labelled it with the
/// academic year starting in that same January (`2025-01-10` gave
/// `"2025-2026 Güz"`; here it is `"2024-2025 Güz"`).
pub fn current_semester(today: NaiveDate) -> SemesterLabel {
    let year = today.year();
    match today.month() {
        9..=12 => SemesterLabel {
            start_year: year,
            term: Term::Fall,
        },
        1 => SemesterLabel {
            start_year: year - 1,
            term: Term::Fall,
        },
        _ => SemesterLabel {
            start_year: year - 1,
            term: Term::Spring,
        },
    }
}

/// Inclusive `(start, end)` date range of a semester, both anchored on the
/// label's start year.
///
/// Fall runs Sep 1 to Jan 31 of the same calendar year, so its range is
/// empty; spring runs Feb 1 to Jun 30 of the start year. Consumers rely on
/// these exact bounds.
pub fn semester_date_range(label: &SemesterLabel) -> Result<(NaiveDate, NaiveDate)> {
    let year = label.start_year;
    let (start, end) = match label.term {
        Term::Fall => (
            NaiveDate::from_ymd_opt(year, 9, 1),
            NaiveDate::from_ymd_opt(year, 1, 31),
        ),
        Term::Spring => (
            NaiveDate::from_ymd_opt(year, 2, 1),
            NaiveDate::from_ymd_opt(year, 6, 30),
        ),
    };

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(Error::InvalidInput(format!(
            "semester year out of range: {label}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn autumn_months_start_a_new_academic_year() {
        assert_eq!(current_semester(date(2024, 10, 15)).to_string(), "2024-2025 Güz");
        assert_eq!(current_semester(date(2024, 9, 1)).to_string(), "2024-2025 Güz");
        assert_eq!(current_semester(date(2024, 12, 31)).to_string(), "2024-2025 Güz");
    }

    #[test]
    fn january_stays_in_the_previous_fall_term() {
        assert_eq!(current_semester(date(2025, 1, 10)).to_string(), "2024-2025 Güz");
    }

    #[test]
    fn remaining_months_are_spring() {
        assert_eq!(current_semester(date(2024, 3, 1)).to_string(), "2023-2024 Bahar");
        assert_eq!(current_semester(date(2024, 2, 1)).to_string(), "2023-2024 Bahar");
        assert_eq!(current_semester(date(2024, 8, 31)).to_string(), "2023-2024 Bahar");
    }

    #[test]
    fn labels_parse_back() {
        let label: SemesterLabel = "2023-2024 Bahar".parse().unwrap();
        assert_eq!(
            label,
            SemesterLabel {
                start_year: 2023,
                term: Term::Spring
            }
        );
        assert!("2023-2025 Bahar".parse::<SemesterLabel>().is_err());
        assert!("2023-2024 Yaz".parse::<SemesterLabel>().is_err());
        assert!("spring".parse::<SemesterLabel>().is_err());
    }

    #[test]
    fn start_year_at_integer_limit_is_rejected() {
        let label = format!("{}-0 Güz", i32::MAX);
        assert!(matches!(
            label.parse::<SemesterLabel>(),
            Err(Error::InvalidInput(_))
        ));
        let label = format!("{}-{} Bahar", i32::MAX, i32::MIN);
        assert!(label.parse::<SemesterLabel>().is_err());
    }

    #[test]
    fn display_does_not_overflow_at_integer_limit() {
        let label = SemesterLabel {
            start_year: i32::MAX,
            term: Term::Fall,
        };
        assert_eq!(label.to_string(), format!("{}-2147483648 Güz", i32::MAX));
    }

    #[test]
    fn spring_range_is_february_through_june_of_start_year() {
        let label: SemesterLabel = "2023-2024 Bahar".parse().unwrap();
        let (start, end) = semester_date_range(&label).unwrap();
        assert_eq!(start, date(2023, 2, 1));
        assert_eq!(end, date(2023, 6, 30));
    }

    #[test]
    fn fall_range_ends_in_january_of_start_year() {
        let label: SemesterLabel = "2024-2025 Güz".parse().unwrap();
        let (start, end) = semester_date_range(&label).unwrap();
        assert_eq!(start, date(2024, 9, 1));
        assert_eq!(end, date(2024, 1, 31));
        assert!(start > end);
    }
}
