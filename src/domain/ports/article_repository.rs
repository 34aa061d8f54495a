use crate::domain::entities::article::Article;
use crate::domain::error::DomainError;

pub trait ArticleRepository: Send + Sync {
    /// Insert an article. Returns false (and stores nothing) when an article
    /// with the same url already exists.
    fn add(&self, article: &Article) -> Result<bool, DomainError>;
    fn fetch_all(&self) -> Result<Vec<Article>, DomainError>;
    /// Articles not yet part of any story, in insertion order.
    fn fetch_unclustered(&self) -> Result<Vec<Article>, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}
