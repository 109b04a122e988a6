//! Core data types for the document memory.

use serde::{Deserialize, Serialize};

/// A document stored in the memory.
///
/// Documents are the fundamental unit of storage. Each document carries the
/// original text, a caller-assigned identity, an optional grouping label used
/// for duplicate detection, and an opaque metadata payload the core never
/// interprets.
///
/// # Example
///
/// ```
/// use engram_core::Document;
///
/// let doc = Document::new("doc_1", "The sky is blue.", "weather")
///     .with_label("sky");
/// assert_eq!(doc.label, "sky");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<M = ()> {
    /// Caller-assigned identity, unique within the store.
    pub id: String,
    /// Grouping key for duplicate detection. Not unique; empty means unlabeled.
    pub label: String,
    /// The source text content.
    pub text: String,
    /// Caller-defined payload, carried through untouched.
    pub metadata: M,
    /// Editorial signal: excludes the document from scoring when set at save
    /// time, and marks a result for permanent exclusion when fed to
    /// [`Memory::modify`](crate::Memory::modify).
    pub ignore: bool,
}

impl<M> Document<M> {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: M) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            text: text.into(),
            metadata,
            ignore: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Marks the document as ignored.
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// A search result pairing a document with its similarity score.
///
/// Returned by search operations, ordered by descending score. Scores come
/// from [`score`](crate::distance::score) and lie in `(0, 1]`; higher means a
/// better match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<M = ()> {
    pub score: f64,
    pub document: Document<M>,
}
