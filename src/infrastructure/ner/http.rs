use crate::domain::error::DomainError;
use crate::domain::ports::entity_extractor::{EntityExtractor, NerMention};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Token-classification over the Hugging Face inference API (or any service
/// speaking the same shape).
pub struct HttpExtractor {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct NerResponseItem {
    entity_group: String,
    word: String,
    score: f32,
    start: usize,
    end: usize,
}

impl HttpExtractor {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| "dslim/bert-base-NER".to_string());
        Self {
            client: Client::new(),
            api_key,
            endpoint: format!("https://api-inference.huggingface.co/models/{model}"),
        }
    }
}

#[async_trait::async_trait]
impl EntityExtractor for HttpExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<NerMention>, DomainError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&NerRequest { inputs: text })
            .send()
            .await
            .map_err(|e| DomainError::Extraction(format!("NER API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Extraction(format!("NER API {status}: {body}")));
        }

        let items: Vec<NerResponseItem> = resp
            .json()
            .await
            .map_err(|e| DomainError::Extraction(format!("Parse error: {e}")))?;
        Ok(items
            .into_iter()
            .map(|i| NerMention {
                label: i.entity_group,
                text: i.word,
                score: i.score,
                start: i.start,
                end: i.end,
            })
            .collect())
    }
}
