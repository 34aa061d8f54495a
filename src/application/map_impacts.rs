use crate::domain::error::DomainError;
use crate::domain::impact::compute_impacts;
use crate::domain::mappings::AssetMappings;
use crate::domain::ports::entity_repository::EntityRepository;
use crate::domain::ports::impact_repository::ImpactRepository;
use std::sync::Arc;
use tracing::{info, warn};

pub struct MapImpactsUseCase {
    entities: Arc<dyn EntityRepository>,
    impacts: Arc<dyn ImpactRepository>,
    mappings: Arc<AssetMappings>,
}

impl MapImpactsUseCase {
    pub fn new(
        entities: Arc<dyn EntityRepository>,
        impacts: Arc<dyn ImpactRepository>,
        mappings: Arc<AssetMappings>,
    ) -> Self {
        Self {
            entities,
            impacts,
            mappings,
        }
    }

    /// Compute and store impact records for every entity row not yet mapped
    /// (anti-join against impact rows). Returns stories processed.
    pub fn execute(&self) -> Result<usize, DomainError> {
        let bags = self.entities.fetch_unmapped()?;
        let mut mapped = 0;

        for bag in &bags {
            let (records, summary) = compute_impacts(bag, &self.mappings);
            match self.impacts.save_all(&bag.story_id, &records, &summary) {
                Ok(()) => mapped += 1,
                Err(e) => warn!(story_id = %bag.story_id, error = %e, "failed to save impacts"),
            }
        }

        info!(stories = bags.len(), mapped, "impact mapping complete");
        Ok(mapped)
    }
}
