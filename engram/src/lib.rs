//! engram - in-process semantic document memory
//!
//! This is the convenience wrapper crate that re-exports the engram
//! components with optional feature flags for easy usage.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! engram = "0.1"  # Includes the OpenAI embeddings client by default
//! ```
//!
//! # Features
//!
//! - `openai` (default): OpenAI-compatible embeddings client

// Re-export core
pub use engram_core::*;

// Re-export the embeddings client if the feature is enabled
#[cfg(feature = "openai")]
pub use engram_openai as openai;

/// Prelude module for convenient imports
pub mod prelude {
    pub use engram_core::{
        Cosine, Distance, Document, DuplicatePolicy, Embedder, Euclidean, ExactText, Memory,
        SearchResult,
    };

    #[cfg(feature = "openai")]
    pub use engram_openai::Client as OpenAiClient;
}
