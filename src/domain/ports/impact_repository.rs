use crate::domain::entities::impact_record::ImpactRecord;
use crate::domain::error::DomainError;

pub trait ImpactRepository: Send + Sync {
    /// Persist all impact records for one story plus the human-readable
    /// summary. Replaces any previous records for the story.
    fn save_all(
        &self,
        story_id: &str,
        records: &[ImpactRecord],
        summary: &str,
    ) -> Result<(), DomainError>;
    fn fetch_by_story(&self, story_id: &str) -> Result<Vec<ImpactRecord>, DomainError>;
    fn summary_for_story(&self, story_id: &str) -> Result<Option<String>, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}
