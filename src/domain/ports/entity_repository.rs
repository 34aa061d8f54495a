use crate::domain::entities::entity_bag::EntityBag;
use crate::domain::error::DomainError;

pub trait EntityRepository: Send + Sync {
    /// Insert or replace the entity row for a story. Re-running extraction
    /// overwrites; nothing else mutates entity rows.
    fn save(&self, bag: &EntityBag) -> Result<(), DomainError>;
    fn get(&self, story_id: &str) -> Result<Option<EntityBag>, DomainError>;
    /// Entity rows not yet run through impact mapping (anti-join against
    /// impact summaries; a no-impact story still has a summary row).
    fn fetch_unmapped(&self) -> Result<Vec<EntityBag>, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}
