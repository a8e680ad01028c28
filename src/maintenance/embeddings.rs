use futures::{StreamExt, TryStreamExt, stream};
use lintbase_schema::VectorRecord;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::db::{DbActorHandle, EmbeddingDocument};
use crate::error::LintBaseError;
use crate::upstream::AiClient;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingUpload {
    pub documents: usize,
    pub batches: usize,
}

/// `linter:12` -> `linter`.
fn document_kind(id: &str) -> &str {
    id.split_once(':').map_or(id, |(kind, _)| kind)
}

async fn upload_batch(ai: &AiClient, batch: Vec<EmbeddingDocument>) -> Result<usize, LintBaseError> {
    let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
    let vectors = ai.embed(texts).await?;

    let records: Vec<VectorRecord> = batch
        .into_iter()
        .zip(vectors)
        .map(|(doc, values)| VectorRecord {
            metadata: Some(json!({ "kind": document_kind(&doc.id) })),
            id: doc.id,
            values,
        })
        .collect();
    let count = records.len();
    ai.upsert_vectors(records).await?;
    debug!(vectors = count, "embedding batch upserted");
    Ok(count)
}

/// Embeds every linter and rule document and upserts the vectors in batches.
/// The first failing batch aborts the upload; already upserted batches stay.
pub async fn upload_embeddings(
    db: &DbActorHandle,
    ai: &AiClient,
) -> Result<EmbeddingUpload, LintBaseError> {
    let documents = db.list_embedding_documents().await?;
    let cfg = ai.config();
    let batch_size = cfg.batch_size.max(1);

    let batches: Vec<Vec<EmbeddingDocument>> = documents
        .chunks(batch_size)
        .map(<[EmbeddingDocument]>::to_vec)
        .collect();
    let summary = EmbeddingUpload {
        documents: documents.len(),
        batches: batches.len(),
    };
    info!(
        documents = summary.documents,
        batches = summary.batches,
        "embedding upload started"
    );

    let uploaded: Vec<usize> = stream::iter(batches)
        .map(|batch| upload_batch(ai, batch))
        .buffer_unordered(cfg.concurrency.max(1))
        .try_collect()
        .await?;

    info!(vectors = uploaded.iter().sum::<usize>(), "embedding upload finished");
    Ok(summary)
}
