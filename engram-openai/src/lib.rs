//! OpenAI-compatible embeddings client.
//!
//! Implements the engram [`Embedder`] trait against the OpenAI `/embeddings`
//! endpoint. Any provider speaking the same wire format works by pointing
//! [`Client::with_base_url`] at it.

use async_trait::async_trait;
use engram_core::{EmbedError, Embedder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API root.
pub const OPENAI_V1: &str = "https://api.openai.com/v1";

pub const TEXT_EMBEDDING_3_SMALL: &str = "text-embedding-3-small";
pub const TEXT_EMBEDDING_3_LARGE: &str = "text-embedding-3-large";
pub const TEXT_EMBEDDING_ADA_002: &str = "text-embedding-ada-002";

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// OpenAI API client scoped to one embedding model.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    org: Option<String>,
    model: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Creates a client for the given API key and embedding model id.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_V1.to_string(),
            api_key: api_key.into(),
            org: None,
            model: model.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Creates a client from `OPENAI_API_KEY` and `OPENAI_ORG`, using
    /// [`TEXT_EMBEDDING_3_SMALL`]. Missing variables become empty values;
    /// the API rejects them on first use.
    pub fn from_env() -> Self {
        let mut client = Self::new(
            std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            TEXT_EMBEDDING_3_SMALL,
        );
        client.org = std::env::var("OPENAI_ORG").ok().filter(|org| !org.is_empty());
        client
    }

    /// Points the client at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// Requests one embedding per input text, in input order.
    pub async fn embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };

        let response = self
            .authorize(self.http_client.post(format!("{}/embeddings", self.base_url)))
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.json::<EmbeddingResponse>().await?;
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Lists the models visible to this API key.
    pub async fn models(&self) -> Result<Vec<Model>> {
        let response = self
            .authorize(self.http_client.get(format!("{}/models", self.base_url)))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.json::<ModelsResponse>().await?;
        Ok(body.data)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.bearer_auth(&self.api_key);
        match &self.org {
            Some(org) => builder.header("OpenAI-Organization", org),
            None => builder,
        }
    }

    /// Decodes the API error envelope on non-2xx responses.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error.message,
            Err(err) => err.to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Embedder for Client {
    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f64>>, EmbedError> {
        self.embeddings(texts).await.map_err(EmbedError::backend)
    }
}

/// A model listed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

// API wire types (internal)

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<Model>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_request_wire_shape() {
        let input = vec!["morning".to_string(), "night".to_string()];
        let request = EmbeddingRequest {
            model: TEXT_EMBEDDING_3_SMALL,
            input: &input,
            encoding_format: "float",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"][1], "night");
        assert_eq!(json["encoding_format"], "float");
    }

    #[test]
    fn test_embedding_response_decodes() {
        let body = r#"{
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [
                {"object": "embedding", "index": 0, "embedding": [0.1, -0.2, 0.3]},
                {"object": "embedding", "index": 1, "embedding": [0.4, 0.5, -0.6]}
            ],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;

        let response: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].embedding, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_error_envelope_decodes() {
        let body = r#"{
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        }"#;

        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "Incorrect API key provided");
    }

    #[test]
    fn test_models_response_decodes() {
        let body = r#"{
            "object": "list",
            "data": [
                {"id": "text-embedding-3-small", "object": "model", "created": 1705948997, "owned_by": "system"}
            ]
        }"#;

        let response: ModelsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data[0].id, "text-embedding-3-small");
        assert_eq!(response.data[0].owned_by, "system");
    }
}
