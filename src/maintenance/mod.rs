//! Admin batch jobs that feed the catalog's AI-derived columns and the vector index.

mod embeddings;
mod summaries;

pub use embeddings::{EmbeddingUpload, upload_embeddings};
pub use summaries::{SummaryRun, generate_rule_summaries, rule_summary_prompt};
