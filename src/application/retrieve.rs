//! Hybrid retrieval: tag channels (sector, company, regulator expansion)
//! plus a semantic nearest-neighbor channel, merged into one ranked list.

use crate::domain::cluster::normalize_unit;
use crate::domain::entities::story::Story;
use crate::domain::error::DomainError;
use crate::domain::mappings::AssetMappings;
use crate::domain::normalize::dedupe_preserving;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::story_repository::StoryRepository;
use crate::domain::ports::vector_store::VectorStore;
use crate::domain::resolve;
use crate::domain::values::query_type::QueryType;
use crate::domain::values::structured_query::StructuredQuery;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-channel fetch cap. The merge step dedupes across channels, so the
/// final list can still be shorter than the sum of caps.
const CHANNEL_LIMIT: usize = 25;

/// Assets a query maps to, for display alongside results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MappedAssets {
    pub companies: Vec<String>,
    pub sectors: Vec<String>,
    pub symbols: Vec<String>,
}

/// A story in retrieval output. `score` is the semantic similarity when the
/// semantic channel surfaced the story, `None` for tag-only hits.
#[derive(Debug, Clone, Serialize)]
pub struct RankedStory {
    pub id: String,
    pub title: String,
    pub combined_text: String,
    pub num_articles: usize,
    pub score: Option<f64>,
}

impl RankedStory {
    fn from_story(story: Story, score: Option<f64>) -> Self {
        Self {
            id: story.id,
            title: story.title,
            combined_text: story.combined_text,
            num_articles: story.num_articles,
            score,
        }
    }
}

pub struct RetrieveUseCase {
    stories: Arc<dyn StoryRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    mappings: Arc<AssetMappings>,
    /// Suffix-stripped and prefix keys over `company_to_symbol`, built once.
    company_index: HashMap<String, String>,
}

impl RetrieveUseCase {
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        mappings: Arc<AssetMappings>,
    ) -> Self {
        let company_index = build_company_index(&mappings);
        Self {
            stories,
            embedder,
            vector_store,
            mappings,
            company_index,
        }
    }

    /// Map query entities to companies, sectors and symbols according to the
    /// query type. Unknown entities are dropped silently; the output lists
    /// are deduplicated and order-preserving.
    pub fn map_query_to_assets(&self, structured: &StructuredQuery) -> MappedAssets {
        let mut assets = MappedAssets::default();
        let entities: Vec<String> = structured
            .entities
            .flattened()
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        for entity in &entities {
            match structured.query_type {
                QueryType::Company => self.map_company(entity, &mut assets),
                QueryType::Sector => self.map_sector(entity, &mut assets),
                QueryType::Regulator => {
                    self.map_rule(entity, &self.mappings.regulator_rules, &mut assets)
                }
                QueryType::Policy => {
                    self.map_rule(entity, &self.mappings.policy_rules, &mut assets)
                }
                QueryType::Index => self.map_index(entity, &mut assets),
                QueryType::Unknown => {
                    // Untyped queries try every table in priority order.
                    if self.mappings.sector_to_symbols.contains_key(entity) {
                        self.map_sector(entity, &mut assets);
                    } else if self.mappings.regulator_rules.contains_key(entity) {
                        self.map_rule(entity, &self.mappings.regulator_rules, &mut assets);
                    } else if self.mappings.policy_rules.contains_key(entity) {
                        self.map_rule(entity, &self.mappings.policy_rules, &mut assets);
                    } else {
                        self.map_company(entity, &mut assets);
                    }
                }
            }
        }

        assets.companies = dedupe_preserving(assets.companies);
        assets.sectors = dedupe_preserving(assets.sectors);
        assets.symbols = dedupe_preserving(assets.symbols);
        assets
    }

    fn map_company(&self, entity: &str, assets: &mut MappedAssets) {
        let symbol = self
            .company_index
            .get(entity)
            .cloned()
            .or_else(|| {
                resolve::resolve(entity, &self.mappings.company_to_symbol).map(|r| r.symbol)
            });
        match symbol {
            Some(symbol) => {
                assets.companies.push(entity.to_string());
                if let Some(info) = self.mappings.symbol_to_sector.get(&symbol) {
                    assets.sectors.push(info.sector.to_lowercase());
                }
                assets.symbols.push(symbol);
            }
            None => debug!(entity, "query company not resolved"),
        }
    }

    fn map_sector(&self, entity: &str, assets: &mut MappedAssets) {
        let symbols = self.mappings.symbols_for_sector(entity);
        if symbols.is_empty() {
            debug!(entity, "query sector unknown");
            return;
        }
        assets.sectors.push(entity.to_string());
        assets.symbols.extend(symbols.iter().cloned());
    }

    fn map_rule(
        &self,
        entity: &str,
        rules: &std::collections::BTreeMap<String, crate::domain::mappings::ImpactRule>,
        assets: &mut MappedAssets,
    ) {
        let rule = rules
            .get(entity)
            .or_else(|| rules.get(&entity.to_uppercase()));
        let Some(rule) = rule else {
            debug!(entity, "no impact rule for query entity");
            return;
        };
        for sector in &rule.sectors {
            let sector = sector.to_lowercase();
            assets
                .symbols
                .extend(self.mappings.symbols_for_sector(&sector).iter().cloned());
            assets.sectors.push(sector);
        }
    }

    fn map_index(&self, entity: &str, assets: &mut MappedAssets) {
        let constituents = self
            .mappings
            .index_to_symbols
            .get(entity)
            .or_else(|| self.mappings.index_to_symbols.get(&entity.to_uppercase()));
        match constituents {
            Some(symbols) => assets.symbols.extend(symbols.iter().cloned()),
            None => debug!(entity, "query index unknown"),
        }
    }

    /// Run the tag and semantic channels and merge. A failing semantic
    /// channel degrades to tag-only results, never an error.
    pub async fn get_relevant_news(
        &self,
        structured: &StructuredQuery,
        assets: &MappedAssets,
        top_k: usize,
    ) -> Result<Vec<RankedStory>, DomainError> {
        let mut candidates: Vec<Story> = Vec::new();

        for sector in &assets.sectors {
            candidates.extend(self.stories.fetch_by_sector_tag(sector, CHANNEL_LIMIT)?);
        }
        for symbol in &assets.symbols {
            if let Some(company) = self.mappings.company_for_symbol(symbol) {
                // Entity tags carry the colloquial name, so drop corporate
                // suffixes before the substring match.
                let company_like = company
                    .to_lowercase()
                    .replace("limited", "")
                    .replace("ltd", "")
                    .trim()
                    .to_string();
                candidates.extend(
                    self.stories
                        .fetch_by_company_tag(&company_like, CHANNEL_LIMIT)?,
                );
            }
        }
        // Regulator queries also pull stories tagged with the sectors the
        // regulator's rule names, even when the entity list had no sector.
        if structured.query_type == QueryType::Regulator {
            for entity in &structured.entities.regulators {
                let key = entity.trim().to_lowercase();
                let rule = self
                    .mappings
                    .regulator_rules
                    .get(&key)
                    .or_else(|| self.mappings.regulator_rules.get(&key.to_uppercase()));
                if let Some(rule) = rule {
                    for sector in &rule.sectors {
                        candidates.extend(
                            self.stories
                                .fetch_by_sector_tag(&sector.to_lowercase(), CHANNEL_LIMIT)?,
                        );
                    }
                }
            }
        }

        let semantic_scores = self.semantic_channel(&structured.rewritten, top_k).await;
        if !semantic_scores.is_empty() {
            // Pull in semantic hits the tag channels missed, in score order.
            let mut ranked: Vec<(&String, f64)> =
                semantic_scores.iter().map(|(id, &s)| (id, s)).collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            let missing: Vec<String> = ranked
                .iter()
                .map(|(id, _)| (*id).clone())
                .filter(|id| !candidates.iter().any(|s| &s.id == id))
                .collect();
            candidates.extend(self.stories.fetch_by_ids(&missing)?);
        }

        Ok(merge_and_rank(candidates, &semantic_scores))
    }

    async fn semantic_channel(&self, query: &str, top_k: usize) -> HashMap<String, f64> {
        let vectors = match self
            .embedder
            .embed(&[query.to_string()], InputType::Query)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query embedding failed; semantic channel skipped");
                return HashMap::new();
            }
        };
        let Some(vector) = vectors.into_iter().next().filter(|v| !v.is_empty()) else {
            return HashMap::new();
        };
        let mut vector = vector;
        normalize_unit(&mut vector);
        match self.vector_store.search_similar(&vector, top_k) {
            Ok(hits) => hits.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "vector search failed; semantic channel skipped");
                HashMap::new()
            }
        }
    }
}

/// Lookup keys for loose company matching: the full lowercase name, the name
/// with corporate suffixes stripped, and its first two tokens.
fn build_company_index(mappings: &AssetMappings) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for (name, symbol) in &mappings.company_to_symbol {
        let full = name.to_lowercase();
        let stripped = full
            .replace("limited", "")
            .replace("ltd", "")
            .trim()
            .to_string();
        let prefix = stripped
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(" ");
        for key in [full, stripped, prefix] {
            if !key.is_empty() {
                index.entry(key).or_insert_with(|| symbol.clone());
            }
        }
    }
    index
}

/// Merge tag and semantic candidates: first occurrence wins on duplicates,
/// scored stories sort before unscored ones, descending by score, and the
/// sort is stable so tag-channel order survives among unscored stories.
pub fn merge_and_rank(
    candidates: Vec<Story>,
    semantic_scores: &HashMap<String, f64>,
) -> Vec<RankedStory> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<RankedStory> = Vec::new();

    for story in candidates {
        if seen.contains_key(&story.id) {
            continue;
        }
        let score = semantic_scores.get(&story.id).copied();
        seen.insert(story.id.clone(), merged.len());
        merged.push(RankedStory::from_story(story, score));
    }

    merged.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, title: &str) -> Story {
        Story {
            id: id.to_string(),
            article_ids: vec![],
            title: title.to_string(),
            combined_text: title.to_string(),
            num_articles: 1,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn scored_before_unscored() {
        let scores: HashMap<String, f64> =
            [("b".to_string(), 0.73), ("c".to_string(), 0.91)].into();
        let ranked = merge_and_rank(
            vec![story("a", "tag only"), story("b", "both"), story("c", "semantic")],
            &scores,
        );
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
        assert_eq!(ranked[1].score, Some(0.73));
        assert_eq!(ranked[2].score, None);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let scores: HashMap<String, f64> = [("a".to_string(), 0.5)].into();
        let ranked = merge_and_rank(
            vec![story("a", "first"), story("a", "second")],
            &scores,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "first");
        assert_eq!(ranked[0].score, Some(0.5));
    }

    #[test]
    fn tag_order_stable_among_unscored() {
        let scores = HashMap::new();
        let ranked = merge_and_rank(
            vec![story("x", "one"), story("y", "two"), story("z", "three")],
            &scores,
        );
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["x", "y", "z"]);
    }

    #[test]
    fn company_index_matches_loose_forms() {
        let mut mappings = AssetMappings::default();
        mappings
            .company_to_symbol
            .insert("hdfc bank limited".to_string(), "HDFCBANK".to_string());
        let index = build_company_index(&mappings);
        assert_eq!(index.get("hdfc bank limited").unwrap(), "HDFCBANK");
        assert_eq!(index.get("hdfc bank").unwrap(), "HDFCBANK");
    }
}
