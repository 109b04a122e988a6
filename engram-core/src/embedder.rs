//! The injected embedding collaborator.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during embedding generation.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The embedding backend failed. The underlying cause is surfaced
    /// verbatim to the save/search caller.
    #[error("embedding backend: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EmbedError {
    /// Wraps a backend failure.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Converts text into vector embeddings.
///
/// This is the external, potentially slow collaborator of the memory: an HTTP
/// client against an embedding provider, a local model, or a deterministic
/// stub in tests. The memory batches its calls: one invocation per save or
/// search with all required texts.
///
/// # Contract
///
/// Implementations must return one vector per input text, in input order, of
/// uniform dimensionality across all calls for a given store instance. No
/// retries are expected; a failure fails the whole save/search call. Callers
/// needing deadlines wrap the call themselves.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}
