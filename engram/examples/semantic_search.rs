//! Example demonstrating save, search, and result correction.
//!
//! This example shows how to:
//! - Wire an OpenAI-compatible embeddings client into the memory
//! - Save a small corpus and run a nearest-neighbor search
//! - Ignore a result and watch the correction persist
//!
//! Requires `OPENAI_API_KEY` to be set.

use engram::openai::Client;
use engram::{Cosine, Document, ExactText, Memory};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let client = Client::from_env();
    let memory: Memory<&str> = Memory::new(Arc::new(client), Arc::new(Cosine), Arc::new(ExactText));

    memory
        .save(vec![
            Document::new("1", "1st document is about morning.", "John Doe"),
            Document::new("2", "2nd document is about night.", "John Doe"),
            Document::new("3", "3rd document is about breakfast.", "Jane Doe"),
        ])
        .await?;

    let query = "Night and day";
    println!("query: {query}\n");

    let results = memory.search(query, 3).await?;
    for r in &results {
        println!("{:.4}  {}  ({})", r.score, r.document.text, r.document.metadata);
    }

    // The night document was not what we wanted; exclude it for this query.
    let corrected = results
        .into_iter()
        .map(|mut r| {
            if r.document.id == "2" {
                r.document.ignore = true;
            }
            r
        })
        .collect();
    memory.modify(query, corrected);

    println!("\nafter correction:");
    for r in memory.search(query, 3).await? {
        println!("{:.4}  {}  ({})", r.score, r.document.text, r.document.metadata);
    }

    Ok(())
}
