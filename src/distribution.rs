use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::{StageCount, StageDistribution, StageOccupancy};
use crate::stage::stage_rank;
use crate::store::{OccupancyQuery, StageStore};

pub async fn get_stage_distribution(store: &dyn StageStore) -> Result<StageDistribution> {
    info!("computing stage distribution");
    let occupancies = store.occupancies(&OccupancyQuery::default()).await?;
    debug!(rows = occupancies.len(), "occupancy rows loaded");
    Ok(compute_distribution(&occupancies))
}

/// Student count per stage, in pipeline order. Not filtered by status.
pub fn compute_distribution(occupancies: &[StageOccupancy]) -> StageDistribution {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stages: Vec<StageCount> = Vec::new();

    for occupancy in occupancies {
        let slot = *index.entry(occupancy.stage_code.as_str()).or_insert_with(|| {
            stages.push(StageCount {
                stage_code: occupancy.stage_code.clone(),
                stage_name: occupancy.stage_name.clone(),
                student_count: 0,
            });
            stages.len() - 1
        });
        stages[slot].student_count += 1;
    }

    // Stable: unknown codes keep first-seen order among themselves.
    stages.sort_by_key(|s| stage_rank(&s.stage_code));
    StageDistribution { stages }
}
