use crate::domain::error::DomainError;
use crate::domain::mappings::Gazetteer;
use crate::domain::normalize::{chunk_words, merge_entities};
use crate::domain::ports::entity_extractor::EntityExtractor;
use crate::domain::ports::entity_repository::EntityRepository;
use crate::domain::ports::story_repository::StoryRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Words per independent NER call. Chunks fail independently: a throwing
/// chunk contributes no entities but never kills the story or the run.
const CHUNK_WORDS: usize = 250;

pub struct ExtractEntitiesUseCase {
    stories: Arc<dyn StoryRepository>,
    entities: Arc<dyn EntityRepository>,
    extractor: Arc<dyn EntityExtractor>,
    gazetteer: Arc<Gazetteer>,
}

impl ExtractEntitiesUseCase {
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        entities: Arc<dyn EntityRepository>,
        extractor: Arc<dyn EntityExtractor>,
        gazetteer: Arc<Gazetteer>,
    ) -> Self {
        Self {
            stories,
            entities,
            extractor,
            gazetteer,
        }
    }

    /// Extract and store an entity bag for every story without one.
    /// Returns the number of entity rows written.
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let stories = self.stories.fetch_without_entities()?;
        let mut saved = 0;

        for story in &stories {
            let mut mentions = Vec::new();
            for (idx, chunk) in chunk_words(&story.combined_text, CHUNK_WORDS)
                .iter()
                .enumerate()
            {
                match self.extractor.extract(chunk).await {
                    Ok(found) => mentions.extend(found),
                    Err(e) => {
                        warn!(story_id = %story.id, chunk = idx, error = %e, "NER chunk failed, skipping");
                    }
                }
            }

            let bag = merge_entities(&story.id, &story.combined_text, mentions, &self.gazetteer);
            match self.entities.save(&bag) {
                Ok(()) => saved += 1,
                Err(e) => warn!(story_id = %story.id, error = %e, "failed to save entities"),
            }
        }

        info!(stories = stories.len(), saved, "entity extraction complete");
        Ok(saved)
    }
}
