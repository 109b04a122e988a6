//! Duplicate-resolution policy.
//!
//! Whether a newly saved document duplicates an existing one with the same
//! label is a judgment call, so the predicate is injected rather than baked
//! into the memory. [`ExactText`] is the baseline; a semantic policy (e.g.
//! embedding similarity above a threshold) plugs into the same seam.

use crate::types::Document;
use thiserror::Error;

/// A duplicate-predicate failure, wrapping the policy's underlying error.
#[derive(Debug, Error)]
#[error("duplicate check: {0}")]
pub struct DuplicateError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl DuplicateError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Result type for duplicate checks.
pub type Result<T> = std::result::Result<T, DuplicateError>;

/// Decides whether `latest` duplicates `existing`.
///
/// Invoked by [`Memory::save`](crate::Memory::save) when a document's label
/// already has a canonical representative. A failing policy aborts the whole
/// save batch.
pub trait DuplicatePolicy<M>: Send + Sync {
    fn is_duplicate(&self, latest: &Document<M>, existing: &Document<M>) -> Result<bool>;
}

/// Baseline policy: two documents are duplicates iff their text is identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactText;

impl<M> DuplicatePolicy<M> for ExactText {
    fn is_duplicate(&self, latest: &Document<M>, existing: &Document<M>) -> Result<bool> {
        Ok(latest.text == existing.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_text_matches_identical_text() {
        let a = Document::new("1", "the same words", ());
        let b = Document::new("2", "the same words", ());
        assert!(ExactText.is_duplicate(&a, &b).unwrap());
    }

    #[test]
    fn test_exact_text_rejects_different_text() {
        let a = Document::new("1", "one thing", ());
        let b = Document::new("2", "another thing", ());
        assert!(!ExactText.is_duplicate(&a, &b).unwrap());
    }
}
