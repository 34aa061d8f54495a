use crate::domain::entities::story::Story;
use crate::domain::error::DomainError;

pub trait StoryRepository: Send + Sync {
    fn add(&self, story: &Story) -> Result<(), DomainError>;
    fn fetch_all(&self) -> Result<Vec<Story>, DomainError>;
    fn get_by_id(&self, id: &str) -> Result<Option<Story>, DomainError>;
    /// Fetch stories preserving the order of `ids`; unknown ids are skipped.
    fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Story>, DomainError>;
    /// Stories with no entity row yet (anti-join against entities).
    fn fetch_without_entities(&self) -> Result<Vec<Story>, DomainError>;
    /// Stories whose entity tags include the sector (case-insensitive).
    fn fetch_by_sector_tag(&self, sector: &str, limit: usize) -> Result<Vec<Story>, DomainError>;
    /// Stories whose entity tags include a company matching `company_like`
    /// (case-insensitive substring).
    fn fetch_by_company_tag(
        &self,
        company_like: &str,
        limit: usize,
    ) -> Result<Vec<Story>, DomainError>;
    /// Stories with no stored embedding vector.
    fn fetch_missing_vectors(&self) -> Result<Vec<Story>, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}
