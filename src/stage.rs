//! Fixed catalog of academic stages.

pub const COURSEWORK: &str = "DERS_DONEMI";
pub const QUALIFICATION: &str = "YETERLILIK";
pub const PROPOSAL: &str = "TEZ_ONERISI";
pub const THESIS_WRITING: &str = "TEZ_CALISMASI";
pub const DEFENSE: &str = "TEZ_SAVUNMASI";

/// Rank of codes missing from the catalog.
pub const UNKNOWN_RANK: u32 = 99;

/// Display rank used to order stage distributions; unknown codes sort last.
pub fn stage_rank(code: &str) -> u32 {
    match code {
        COURSEWORK => 1,
        QUALIFICATION => 2,
        PROPOSAL => 3,
        THESIS_WRITING => 4,
        DEFENSE => 5,
        _ => UNKNOWN_RANK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_follows_pipeline_order() {
        let ranks: Vec<u32> = [COURSEWORK, QUALIFICATION, PROPOSAL, THESIS_WRITING, DEFENSE]
            .iter()
            .map(|code| stage_rank(code))
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unknown_codes_sort_last() {
        assert_eq!(stage_rank("STAJ"), UNKNOWN_RANK);
        assert_eq!(stage_rank(""), UNKNOWN_RANK);
    }
}
