use crate::models::DelaySeverity;

/// Severity tier for a delay measured in semesters.
///
/// Zero-delay rows are filtered out before this is called, so anything below
/// two semesters is `Medium`.
pub fn classify(delay_semesters: f64) -> DelaySeverity {
    if delay_semesters >= 3.0 {
        DelaySeverity::Critical
    } else if delay_semesters >= 2.0 {
        DelaySeverity::High
    } else {
        DelaySeverity::Medium
    }
}

/// Whether an occupancy row counts as delayed at all.
pub fn is_delayed(delay_semesters: f64) -> bool {
    delay_semesters > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_inclusive_boundaries() {
        assert_eq!(classify(1.9), DelaySeverity::Medium);
        assert_eq!(classify(2.0), DelaySeverity::High);
        assert_eq!(classify(2.99), DelaySeverity::High);
        assert_eq!(classify(3.0), DelaySeverity::Critical);
        assert_eq!(classify(7.0), DelaySeverity::Critical);
    }

    #[test]
    fn small_delays_are_still_medium() {
        assert_eq!(classify(0.0), DelaySeverity::Medium);
        assert_eq!(classify(1.0), DelaySeverity::Medium);
    }

    #[test]
    fn only_positive_delay_counts() {
        assert!(!is_delayed(0.0));
        assert!(is_delayed(0.5));
    }
}
