//! End-to-end run: ingest, dedup, extract, map, each stage retried with a
//! fixed linear backoff before the run is abandoned.

use crate::application::dedup::DedupUseCase;
use crate::application::extract_entities::ExtractEntitiesUseCase;
use crate::application::ingest::{IngestUseCase, RawArticle};
use crate::application::map_impacts::MapImpactsUseCase;
use crate::domain::error::DomainError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Fixed-delay retry. Attempts are sequential; after the last failure the
/// stage error is wrapped with the stage name and attempt count.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, F, Fut>(&self, stage: &str, mut op: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut last: Option<DomainError> = None;
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(stage, attempt, max = self.max_attempts, error = %e, "stage attempt failed");
                    last = Some(e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }
        Err(DomainError::Pipeline {
            stage: stage.to_string(),
            attempts: self.max_attempts,
            cause: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}

/// Counts reported by a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub ingested: usize,
    pub stories: usize,
    pub extracted: usize,
    pub mapped: usize,
}

pub struct PipelineUseCase {
    ingest: Arc<IngestUseCase>,
    dedup: Arc<DedupUseCase>,
    extract: Arc<ExtractEntitiesUseCase>,
    map_impacts: Arc<MapImpactsUseCase>,
    retry: RetryPolicy,
}

impl PipelineUseCase {
    pub fn new(
        ingest: Arc<IngestUseCase>,
        dedup: Arc<DedupUseCase>,
        extract: Arc<ExtractEntitiesUseCase>,
        map_impacts: Arc<MapImpactsUseCase>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            ingest,
            dedup,
            extract,
            map_impacts,
            retry,
        }
    }

    /// Run all four stages in order. A stage that exhausts its retries
    /// aborts the run; earlier stages keep their committed work, and the
    /// next run picks up where this one stopped (every stage reads "not yet
    /// processed" state from the store).
    pub async fn run(&self, raw: Vec<RawArticle>) -> Result<PipelineReport, DomainError> {
        let ingested = self
            .retry
            .run("ingest", || {
                let batch = raw.clone();
                async move { self.ingest.execute(batch) }
            })
            .await?;

        let stories = self.retry.run("dedup", || self.dedup.execute()).await?;
        let extracted = self
            .retry
            .run("extract_entities", || self.extract.execute())
            .await?;
        let mapped = self
            .retry
            .run("map_impacts", || async { self.map_impacts.execute() })
            .await?;

        let report = PipelineReport {
            ingested,
            stories,
            extracted,
            mapped,
        };
        info!(?report, "pipeline complete");
        Ok(report)
    }
}
