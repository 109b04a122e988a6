//! The document memory: storage, search, and result correction.

use crate::cache::ResultCache;
use crate::dedup::{DuplicateError, DuplicatePolicy};
use crate::distance::{score, Distance, DistanceError};
use crate::embedder::{EmbedError, Embedder};
use crate::types::{Document, SearchResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Errors returned by memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The injected embedding function failed. Nothing was committed.
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedError),

    /// The embedding backend broke its contract and returned the wrong
    /// number of vectors for the batch.
    #[error("embedding backend returned {got} vectors for {expected} texts")]
    EmbeddingCount { expected: usize, got: usize },

    /// A stored embedding and the query embedding disagree on dimensionality.
    #[error("distance: {0}")]
    Distance(#[from] DistanceError),

    /// The injected duplicate predicate failed during save. The whole batch
    /// was aborted.
    #[error(transparent)]
    DuplicateCheck(#[from] DuplicateError),
}

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// In-process semantic document memory.
///
/// Owns the document set, their embeddings, the label index used for
/// duplicate detection, and the per-query result cache. The embedding
/// function, distance metric, and duplicate predicate are injected at
/// construction; the memory itself holds no I/O.
///
/// # Thread safety
///
/// `Memory` is `Clone` and can be shared freely across tasks and threads.
/// Documents, embeddings, and the label index live behind a single
/// reader/writer lock so they can never drift apart; the result cache has
/// its own lock. Embedding calls always happen before a lock is taken, so
/// lock hold times are bounded by in-memory work.
///
/// # Example
///
/// ```no_run
/// use engram_core::{Cosine, Document, ExactText, Memory};
/// use std::sync::Arc;
///
/// # async fn example(embedder: Arc<dyn engram_core::Embedder>) -> engram_core::memory::Result<()> {
/// let memory: Memory<()> = Memory::new(embedder, Arc::new(Cosine), Arc::new(ExactText));
///
/// memory.save(vec![Document::new("1", "1st document is about morning.", ())]).await?;
/// let results = memory.search("Night and day", 3).await?;
/// # Ok(())
/// # }
/// ```
pub struct Memory<M> {
    store: Arc<RwLock<Store<M>>>,
    cache: Arc<ResultCache<M>>,
    embedder: Arc<dyn Embedder>,
    distance: Arc<dyn Distance>,
    dedup: Arc<dyn DuplicatePolicy<M>>,
}

impl<M> Clone for Memory<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            embedder: Arc::clone(&self.embedder),
            distance: Arc::clone(&self.distance),
            dedup: Arc::clone(&self.dedup),
        }
    }
}

/// A live document together with its embedding and scoring eligibility.
/// Kept as one record so document and embedding can never go out of sync.
struct Record<M> {
    doc: Document<M>,
    embedding: Vec<f64>,
    /// Set when the duplicate predicate judged this document a duplicate of
    /// its label's canonical representative. Duplicates stay in the label
    /// index but are skipped during scoring.
    duplicate: bool,
}

struct Store<M> {
    records: HashMap<String, Record<M>>,
    /// Label -> member ids in insertion order. The first member is the
    /// label's canonical representative.
    labels: HashMap<String, Vec<String>>,
}

impl<M> Store<M> {
    fn canonical_of(&self, label: &str) -> Option<&Document<M>> {
        let id = self.labels.get(label)?.first()?;
        self.records.get(id).map(|record| &record.doc)
    }

    fn upsert(&mut self, doc: Document<M>, embedding: Vec<f64>, duplicate: bool) {
        if let Some(old) = self.records.get(&doc.id) {
            if old.doc.label != doc.label {
                let old_label = old.doc.label.clone();
                self.unlink_label(&old_label, &doc.id);
            }
        }

        if !doc.label.is_empty() {
            let group = self.labels.entry(doc.label.clone()).or_default();
            if !group.iter().any(|member| member == &doc.id) {
                group.push(doc.id.clone());
            }
        }

        self.records.insert(
            doc.id.clone(),
            Record {
                doc,
                embedding,
                duplicate,
            },
        );
    }

    /// Removes `id` from its label group. When the canonical representative
    /// leaves a non-empty group, the earliest remaining member is promoted
    /// and becomes eligible for scoring again.
    fn unlink_label(&mut self, label: &str, id: &str) {
        if label.is_empty() {
            return;
        }
        let Some(group) = self.labels.get_mut(label) else {
            return;
        };

        let was_canonical = group.first().is_some_and(|first| first == id);
        group.retain(|member| member != id);

        let empty = group.is_empty();
        let promoted = if !empty && was_canonical {
            Some(group[0].clone())
        } else {
            None
        };

        if empty {
            self.labels.remove(label);
        }
        if let Some(promoted) = promoted {
            if let Some(record) = self.records.get_mut(&promoted) {
                record.duplicate = false;
            }
        }
    }
}

impl<M: Clone> Memory<M> {
    /// Creates a memory with the given embedding function, distance metric,
    /// and duplicate predicate. There are no built-in defaults; tests inject
    /// deterministic stubs through the same seams.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        distance: Arc<dyn Distance>,
        dedup: Arc<dyn DuplicatePolicy<M>>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                records: HashMap::new(),
                labels: HashMap::new(),
            })),
            cache: Arc::new(ResultCache::new()),
            embedder,
            distance,
            dedup,
        }
    }

    /// Saves a batch of documents, embedding all of them in one call.
    ///
    /// All-or-nothing: if the embedding call or the duplicate predicate
    /// fails, no document from the batch is committed. A document whose id
    /// already exists is overwritten and its embedding recomputed; this is
    /// the update path. Every save re-embeds every document passed to it.
    ///
    /// A document with a non-empty label that already has a canonical
    /// (first-seen) representative is handed to the duplicate predicate;
    /// judged duplicates stay in the label index but are not scored by
    /// [`search`](Self::search).
    ///
    /// Stale cache entries for affected queries are deliberately left alone;
    /// corrections recorded via [`modify`](Self::modify) outlive corpus
    /// growth.
    pub async fn save(&self, docs: Vec<Document<M>>) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = docs.iter().map(|doc| doc.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(MemoryError::EmbeddingCount {
                expected: docs.len(),
                got: vectors.len(),
            });
        }

        let mut store = self.store.write().unwrap();

        // Resolve duplicate status for the whole batch before touching the
        // maps, so a failing predicate aborts with nothing committed.
        let duplicate = {
            let mut flags = Vec::with_capacity(docs.len());
            let mut batch_first: HashMap<&str, &Document<M>> = HashMap::new();
            for doc in &docs {
                let flag = if doc.label.is_empty() {
                    false
                } else if let Some(canonical) = store.canonical_of(&doc.label) {
                    if canonical.id == doc.id {
                        false
                    } else {
                        self.dedup.is_duplicate(doc, canonical)?
                    }
                } else {
                    match batch_first.get(doc.label.as_str()) {
                        Some(first) if first.id != doc.id => {
                            self.dedup.is_duplicate(doc, first)?
                        }
                        Some(_) => false,
                        None => {
                            batch_first.insert(&doc.label, doc);
                            false
                        }
                    }
                };
                flags.push(flag);
            }
            flags
        };

        debug!("saving batch of {} documents", docs.len());
        for ((doc, vector), flag) in docs.into_iter().zip(vectors).zip(duplicate) {
            store.upsert(doc, vector, flag);
        }

        Ok(())
    }

    /// Searches for the `top_n` documents most similar to `query`.
    ///
    /// Every live, non-duplicate, non-ignored document is scored with
    /// `score(distance(query, doc))`, then merged against the cache entry
    /// for this exact query string: ignored ids are excluded outright, and a
    /// cached result for an id is preferred over the freshly computed one,
    /// so corrections recorded via [`modify`](Self::modify) persist even as
    /// the corpus grows. On a cache miss the full fresh result set becomes
    /// the new entry.
    ///
    /// Results are ordered by descending score with ascending document id as
    /// the tie-break; `top_n` larger than the result count returns all.
    pub async fn search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult<M>>> {
        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        let query_vec = if vectors.len() == 1 {
            vectors.remove(0)
        } else {
            return Err(MemoryError::EmbeddingCount {
                expected: 1,
                got: vectors.len(),
            });
        };

        let fresh = {
            let store = self.store.read().unwrap();
            let mut fresh = Vec::with_capacity(store.records.len());
            for record in store.records.values() {
                if record.duplicate || record.doc.ignore {
                    continue;
                }
                let d = self.distance.distance(&query_vec, &record.embedding)?;
                fresh.push(SearchResult {
                    score: score(d),
                    document: record.doc.clone(),
                });
            }
            fresh
        };
        debug!("scored {} documents for query", fresh.len());

        let mut results = match self.cache.get(query) {
            None => {
                self.cache.put(query, fresh.clone());
                fresh
            }
            Some(cached) => {
                debug!("merging {} cached results", cached.len());
                let by_id: HashMap<&str, &SearchResult<M>> = cached
                    .iter()
                    .map(|r| (r.document.id.as_str(), r))
                    .collect();
                fresh
                    .into_iter()
                    .filter(|r| !self.cache.is_ignored(query, &r.document.id))
                    .map(|r| match by_id.get(r.document.id.as_str()) {
                        Some(cached) => (*cached).clone(),
                        None => r,
                    })
                    .collect()
            }
        };

        sort_results(&mut results);
        results.truncate(top_n);
        info!("search returned {} results", results.len());
        Ok(results)
    }

    /// Persists the caller's corrections for `query`.
    ///
    /// Every corrected result whose document carries the ignore flag is
    /// excluded from this query's results from now on; the corrected list
    /// replaces the cache entry wholesale, and subsequent searches for the
    /// same query string merge against it. Corrections are not validated
    /// against the live document set; a correction referencing a removed
    /// document is simply skipped by later searches.
    pub fn modify(&self, query: &str, corrected: Vec<SearchResult<M>>) {
        for result in &corrected {
            if result.document.ignore {
                debug!("ignoring {} for this query", result.document.id);
                self.cache.ignore(query, &result.document.id);
            }
        }

        let mut corrected = corrected;
        sort_results(&mut corrected);
        self.cache.put(query, corrected);
    }

    /// Returns every label carried by more than one live document, each
    /// group sorted by id ascending.
    pub fn dups(&self) -> BTreeMap<String, Vec<Document<M>>> {
        let store = self.store.read().unwrap();
        let mut groups = BTreeMap::new();
        for (label, ids) in &store.labels {
            if ids.len() < 2 {
                continue;
            }
            let mut docs: Vec<Document<M>> = ids
                .iter()
                .filter_map(|id| store.records.get(id))
                .map(|record| record.doc.clone())
                .collect();
            docs.sort_by(|a, b| a.id.cmp(&b.id));
            groups.insert(label.clone(), docs);
        }
        groups
    }

    /// Removes the listed documents, their embeddings, and their label-group
    /// memberships. Unknown ids are no-ops. Returns the number of documents
    /// actually removed.
    pub fn remove<S: AsRef<str>>(&self, ids: &[S]) -> usize {
        let mut store = self.store.write().unwrap();
        let mut removed = 0;
        for id in ids {
            let id = id.as_ref();
            if let Some(record) = store.records.remove(id) {
                store.unlink_label(&record.doc.label, id);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("removed {removed} documents");
        }
        removed
    }

    /// Snapshot of all live documents, sorted by id.
    pub fn docs(&self) -> Vec<Document<M>> {
        let store = self.store.read().unwrap();
        let mut docs: Vec<Document<M>> = store
            .records
            .values()
            .map(|record| record.doc.clone())
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        docs
    }

    /// Number of live documents.
    pub fn len(&self) -> usize {
        self.store.read().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descending score, ascending document id on ties.
fn sort_results<M>(results: &mut [SearchResult<M>]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.document.id.cmp(&b.document.id))
    });
}
