use crate::domain::mappings::Gazetteer;
use crate::domain::normalize::{dedupe_preserving, gazetteer_scan};
use crate::domain::ports::query_rewriter::QueryRewriter;
use crate::domain::values::query_type::{QueryType, TimeHorizon};
use crate::domain::values::structured_query::{QueryEntities, StructuredQuery};
use std::sync::Arc;
use tracing::warn;

/// Turns a raw user query into a `StructuredQuery`. The rewrite collaborator
/// is best-effort: on failure or malformed output the raw query and the
/// rule-based extraction carry the request alone.
pub struct QueryUseCase {
    rewriter: Arc<dyn QueryRewriter>,
    gazetteer: Arc<Gazetteer>,
}

impl QueryUseCase {
    pub fn new(rewriter: Arc<dyn QueryRewriter>, gazetteer: Arc<Gazetteer>) -> Self {
        Self { rewriter, gazetteer }
    }

    pub async fn process(&self, raw: &str) -> StructuredQuery {
        let rewritten = match self.rewriter.rewrite(raw).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => raw.to_string(),
            Err(e) => {
                warn!(error = %e, "query rewrite failed, using raw query");
                raw.to_string()
            }
        };

        let mut structured = match self.rewriter.classify(raw).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "query classification failed, using fallback");
                StructuredQuery::fallback(raw)
            }
        };
        structured.raw = raw.to_string();
        structured.rewritten = rewritten;

        // Rule-based extraction backstops the collaborator: gazetteer hits in
        // the rewritten text replace an empty or thinner entity set.
        let scanned = scan_query_entities(&structured.rewritten, &self.gazetteer);
        if !scanned.is_empty() {
            structured.entities = scanned;
            structured.query_type = classify_by_entities(&structured.entities, structured.query_type);
        }
        structured.time_horizon = TimeHorizon::from_query(&structured.rewritten);
        structured
    }
}

/// Gazetteer scan of the query text, one category per term list.
pub fn scan_query_entities(text: &str, gazetteer: &Gazetteer) -> QueryEntities {
    QueryEntities {
        companies: dedupe_preserving(gazetteer_scan(text, &gazetteer.companies_custom)),
        sectors: dedupe_preserving(gazetteer_scan(text, &gazetteer.sectors)),
        regulators: dedupe_preserving(gazetteer_scan(text, &gazetteer.regulators)),
        policies: dedupe_preserving(gazetteer_scan(text, &gazetteer.policies)),
        indices: dedupe_preserving(gazetteer_scan(text, &gazetteer.indices)),
    }
}

/// Query type from the extracted entities, most specific category first.
/// Falls back to the collaborator's verdict when nothing matched.
pub fn classify_by_entities(entities: &QueryEntities, fallback: QueryType) -> QueryType {
    if !entities.companies.is_empty() {
        QueryType::Company
    } else if !entities.regulators.is_empty() {
        QueryType::Regulator
    } else if !entities.policies.is_empty() {
        QueryType::Policy
    } else if !entities.sectors.is_empty() {
        QueryType::Sector
    } else if !entities.indices.is_empty() {
        QueryType::Index
    } else {
        fallback
    }
}
