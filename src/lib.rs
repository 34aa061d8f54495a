pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::dedup::DedupUseCase;
use crate::application::extract_entities::ExtractEntitiesUseCase;
use crate::application::ingest::{IngestUseCase, RawArticle};
use crate::application::map_impacts::MapImpactsUseCase;
use crate::application::pipeline::{PipelineReport, PipelineUseCase, RetryPolicy};
use crate::application::query::QueryUseCase;
use crate::application::reindex::ReindexUseCase;
use crate::application::retrieve::{MappedAssets, RankedStory, RetrieveUseCase};
use crate::domain::entities::entity_bag::EntityBag;
use crate::domain::entities::impact_record::ImpactRecord;
use crate::domain::entities::story::Story;
use crate::domain::error::DomainError;
use crate::domain::mappings::{AssetMappings, Gazetteer};
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::entity_extractor::EntityExtractor;
use crate::domain::ports::entity_repository::EntityRepository;
use crate::domain::ports::impact_repository::ImpactRepository;
use crate::domain::ports::query_rewriter::QueryRewriter;
use crate::domain::ports::story_repository::StoryRepository;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::values::structured_query::StructuredQuery;
use crate::infrastructure::assets::loader::{load_gazetteer, load_mappings};
use crate::infrastructure::embeddings::noop::NoopProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use crate::infrastructure::llm::openai_rewriter::OpenAiRewriter;
use crate::infrastructure::llm::rule_based::RuleBasedRewriter;
use crate::infrastructure::ner::http::HttpExtractor;
use crate::infrastructure::ner::noop::NoopExtractor;
use crate::infrastructure::sqlite::article_repo::SqliteArticleRepo;
use crate::infrastructure::sqlite::entity_repo::SqliteEntityRepo;
use crate::infrastructure::sqlite::impact_repo::SqliteImpactRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::story_repo::SqliteStoryRepo;
use crate::infrastructure::sqlite::vector_store::SqliteVectorStore;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Everything a query call produces: the structured interpretation, the
/// assets it mapped to, and the ranked stories.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub structured: StructuredQuery,
    pub assets: MappedAssets,
    pub results: Vec<RankedStory>,
}

/// Row counts across the store.
#[derive(Debug, Serialize)]
pub struct EngineStats {
    pub articles: usize,
    pub stories: usize,
    pub entity_rows: usize,
    pub impact_rows: usize,
}

pub struct NewsImpact {
    articles: Arc<dyn ArticleRepository>,
    stories: Arc<dyn StoryRepository>,
    entities: Arc<dyn EntityRepository>,
    impacts: Arc<dyn ImpactRepository>,
    ingest_uc: Arc<IngestUseCase>,
    dedup_uc: Arc<DedupUseCase>,
    extract_uc: Arc<ExtractEntitiesUseCase>,
    map_impacts_uc: Arc<MapImpactsUseCase>,
    retrieve_uc: RetrieveUseCase,
    query_uc: QueryUseCase,
    reindex_uc: ReindexUseCase,
    pipeline_uc: PipelineUseCase,
}

impl NewsImpact {
    /// Build the engine from environment configuration. All collaborators
    /// default to their no-op implementations.
    pub fn new(db_path: &str, assets_dir: &Path) -> Result<Self, DomainError> {
        let provider =
            std::env::var("NEWSIMPACT_EMBEDDING_PROVIDER").unwrap_or_else(|_| "noop".into());
        let api_key = std::env::var("NEWSIMPACT_EMBEDDING_API_KEY").unwrap_or_default();
        let model = std::env::var("NEWSIMPACT_EMBEDDING_MODEL").ok();
        let embedder: Arc<dyn EmbeddingProvider> = match provider.as_str() {
            "openai" => Arc::new(OpenAiProvider::new(api_key, model)),
            _ => Arc::new(NoopProvider),
        };

        let ner_provider = std::env::var("NEWSIMPACT_NER_PROVIDER").unwrap_or_else(|_| "noop".into());
        let ner_key = std::env::var("NEWSIMPACT_NER_API_KEY").unwrap_or_default();
        let ner_model = std::env::var("NEWSIMPACT_NER_MODEL").ok();
        let extractor: Arc<dyn EntityExtractor> = match ner_provider.as_str() {
            "huggingface" => Arc::new(HttpExtractor::new(ner_key, ner_model)),
            _ => Arc::new(NoopExtractor),
        };

        let llm_provider = std::env::var("NEWSIMPACT_LLM_PROVIDER").unwrap_or_else(|_| "rule".into());
        let llm_key = std::env::var("NEWSIMPACT_LLM_API_KEY").unwrap_or_default();
        let llm_model = std::env::var("NEWSIMPACT_LLM_MODEL").ok();
        let rewriter: Arc<dyn QueryRewriter> = match llm_provider.as_str() {
            "openai" => Arc::new(OpenAiRewriter::new(llm_key, llm_model)),
            _ => Arc::new(RuleBasedRewriter),
        };

        Self::with_providers(db_path, assets_dir, embedder, extractor, rewriter)
    }

    pub fn with_providers(
        db_path: &str,
        assets_dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn EntityExtractor>,
        rewriter: Arc<dyn QueryRewriter>,
    ) -> Result<Self, DomainError> {
        fn open(db_path: &str) -> Result<Connection, DomainError> {
            let conn = Connection::open(db_path)
                .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
            Ok(conn)
        }

        let conn = open(db_path)?;
        run_migrations(&conn)?;

        let articles: Arc<dyn ArticleRepository> = Arc::new(SqliteArticleRepo::new(conn));
        let stories: Arc<dyn StoryRepository> = Arc::new(SqliteStoryRepo::new(open(db_path)?));
        let entities: Arc<dyn EntityRepository> = Arc::new(SqliteEntityRepo::new(open(db_path)?));
        let impacts: Arc<dyn ImpactRepository> = Arc::new(SqliteImpactRepo::new(open(db_path)?));
        let vector_store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(open(db_path)?));

        let mappings = Arc::new(load_mappings(assets_dir));
        let gazetteer = Arc::new(load_gazetteer(assets_dir));

        Self::assemble(
            articles,
            stories,
            entities,
            impacts,
            vector_store,
            embedder,
            extractor,
            rewriter,
            mappings,
            gazetteer,
        )
    }

    /// Wire the use cases from already-built adapters; the seam tests use
    /// to inject in-memory stores and stubs.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        articles: Arc<dyn ArticleRepository>,
        stories: Arc<dyn StoryRepository>,
        entities: Arc<dyn EntityRepository>,
        impacts: Arc<dyn ImpactRepository>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn EntityExtractor>,
        rewriter: Arc<dyn QueryRewriter>,
        mappings: Arc<AssetMappings>,
        gazetteer: Arc<Gazetteer>,
    ) -> Result<Self, DomainError> {
        let ingest_uc = Arc::new(IngestUseCase::new(articles.clone()));
        let dedup_uc = Arc::new(DedupUseCase::new(
            articles.clone(),
            stories.clone(),
            embedder.clone(),
            vector_store.clone(),
        ));
        let extract_uc = Arc::new(ExtractEntitiesUseCase::new(
            stories.clone(),
            entities.clone(),
            extractor,
            gazetteer.clone(),
        ));
        let map_impacts_uc = Arc::new(MapImpactsUseCase::new(
            entities.clone(),
            impacts.clone(),
            mappings.clone(),
        ));
        let pipeline_uc = PipelineUseCase::new(
            ingest_uc.clone(),
            dedup_uc.clone(),
            extract_uc.clone(),
            map_impacts_uc.clone(),
            RetryPolicy::default(),
        );

        Ok(Self {
            articles,
            stories: stories.clone(),
            entities,
            impacts,
            ingest_uc,
            dedup_uc,
            extract_uc,
            map_impacts_uc,
            retrieve_uc: RetrieveUseCase::new(
                stories.clone(),
                embedder.clone(),
                vector_store.clone(),
                mappings,
            ),
            query_uc: QueryUseCase::new(rewriter, gazetteer),
            reindex_uc: ReindexUseCase::new(stories, embedder, vector_store),
            pipeline_uc,
        })
    }

    // Delegating methods

    pub fn ingest(&self, raw: Vec<RawArticle>) -> Result<usize, DomainError> {
        self.ingest_uc.execute(raw)
    }

    pub async fn dedup(&self) -> Result<usize, DomainError> {
        self.dedup_uc.execute().await
    }

    pub async fn extract_entities(&self) -> Result<usize, DomainError> {
        self.extract_uc.execute().await
    }

    pub fn map_impacts(&self) -> Result<usize, DomainError> {
        self.map_impacts_uc.execute()
    }

    pub async fn run_pipeline(&self, raw: Vec<RawArticle>) -> Result<PipelineReport, DomainError> {
        self.pipeline_uc.run(raw).await
    }

    pub async fn query(&self, text: &str, top_k: usize) -> Result<QueryResponse, DomainError> {
        let structured = self.query_uc.process(text).await;
        let assets = self.retrieve_uc.map_query_to_assets(&structured);
        let results = self
            .retrieve_uc
            .get_relevant_news(&structured, &assets, top_k)
            .await?;
        Ok(QueryResponse {
            structured,
            assets,
            results,
        })
    }

    pub async fn reindex(&self) -> Result<usize, DomainError> {
        self.reindex_uc.execute().await
    }

    pub fn story(&self, id: &str) -> Result<Option<Story>, DomainError> {
        self.stories.get_by_id(id)
    }

    pub fn stories(&self) -> Result<Vec<Story>, DomainError> {
        self.stories.fetch_all()
    }

    pub fn story_entities(&self, story_id: &str) -> Result<Option<EntityBag>, DomainError> {
        self.entities.get(story_id)
    }

    pub fn story_impacts(
        &self,
        story_id: &str,
    ) -> Result<(Vec<ImpactRecord>, Option<String>), DomainError> {
        let records = self.impacts.fetch_by_story(story_id)?;
        let summary = self.impacts.summary_for_story(story_id)?;
        Ok((records, summary))
    }

    pub fn stats(&self) -> Result<EngineStats, DomainError> {
        Ok(EngineStats {
            articles: self.articles.count()?,
            stories: self.stories.count()?,
            entity_rows: self.entities.count()?,
            impact_rows: self.impacts.count()?,
        })
    }
}
