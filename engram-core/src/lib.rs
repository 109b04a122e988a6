//! engram-core - in-process semantic document memory
//!
//! Holds text documents with their vector embeddings, answers
//! nearest-neighbor queries by distance, and lets callers incrementally
//! correct search results (ignore a document, re-score it) without
//! recomputing embeddings. Meant to be embedded in a larger application,
//! typically a RAG pipeline, as the component that remembers what is known
//! and what was judged relevant last time.
//!
//! The embedding function, distance metric, and duplicate predicate are all
//! injected:
//!
//! - [`Embedder`]: batched text-to-vector conversion (an HTTP provider, a
//!   local model, a test stub)
//! - [`Distance`]: [`Cosine`] and [`Euclidean`] ship in-crate
//! - [`DuplicatePolicy`]: [`ExactText`] is the baseline
//!
//! Search is an exact linear scan; there is no approximate index and no
//! persistence.

mod cache;

pub mod dedup;
pub mod distance;
pub mod embedder;
pub mod memory;
pub mod types;

pub use dedup::{DuplicateError, DuplicatePolicy, ExactText};
pub use distance::{score, Cosine, Distance, DistanceError, Euclidean};
pub use embedder::{EmbedError, Embedder};
pub use memory::{Memory, MemoryError};
pub use types::{Document, SearchResult};
