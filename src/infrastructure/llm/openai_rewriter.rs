use crate::domain::error::DomainError;
use crate::domain::ports::query_rewriter::QueryRewriter;
use crate::domain::values::query_type::QueryType;
use crate::domain::values::structured_query::{QueryEntities, StructuredQuery};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

const REWRITE_PROMPT: &str = "Rewrite the user's financial news query into a short, \
search-optimized form. Keep entity names verbatim. Reply with the rewritten query only.";

const CLASSIFY_PROMPT: &str = "Classify the user's financial news query. Reply with JSON only: \
{\"query_type\": one of company|sector|regulator|policy|index|unknown, \
\"entities\": {\"companies\": [], \"sectors\": [], \"regulators\": [], \"policies\": [], \"indices\": []}}";

pub struct OpenAiRewriter {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Shape the classify prompt asks for. Unknown fields and bad values fall
/// back rather than erroring.
#[derive(Deserialize)]
struct ClassifyPayload {
    #[serde(default)]
    query_type: String,
    #[serde(default)]
    entities: QueryEntities,
}

impl OpenAiRewriter {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
                temperature: 0.0,
            })
            .send()
            .await
            .map_err(|e| DomainError::Parse(format!("OpenAI API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Parse(format!("OpenAI API {status}: {body}")));
        }

        let result: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("Parse error: {e}")))?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DomainError::Parse("empty chat response".to_string()))
    }
}

#[async_trait::async_trait]
impl QueryRewriter for OpenAiRewriter {
    async fn rewrite(&self, query: &str) -> Result<String, DomainError> {
        let text = self.chat(REWRITE_PROMPT, query).await?;
        Ok(text.trim().to_string())
    }

    async fn classify(&self, query: &str) -> Result<StructuredQuery, DomainError> {
        let raw = self.chat(CLASSIFY_PROMPT, query).await?;
        // Models sometimes wrap JSON in code fences; strip before parsing.
        let trimmed = raw
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        let payload: ClassifyPayload = match serde_json::from_str(trimmed) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "unparseable classification, using fallback");
                return Ok(StructuredQuery::fallback(query));
            }
        };
        let mut structured = StructuredQuery::fallback(query);
        structured.query_type = payload
            .query_type
            .parse()
            .unwrap_or(QueryType::Unknown);
        structured.entities = payload.entities;
        Ok(structured)
    }
}
