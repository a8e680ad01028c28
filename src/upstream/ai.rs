use backon::ExponentialBuilder;
use lintbase_schema::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, EmbeddingRequest,
    EmbeddingResponse, VectorMatch, VectorQueryRequest, VectorQueryResponse, VectorRecord,
    VectorUpsertRequest,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::http::{self, ClientSettings};
use crate::config::AiResolvedConfig;
use crate::error::LintBaseError;

/// OpenAI-compatible completion/embedding endpoints plus a Pinecone-compatible
/// vector index.
#[derive(Clone)]
pub struct AiClient {
    client: reqwest::Client,
    cfg: Arc<AiResolvedConfig>,
    retry_policy: ExponentialBuilder,
}

impl AiClient {
    pub fn new(cfg: Arc<AiResolvedConfig>) -> Result<Self, LintBaseError> {
        let client = http::build_client(ClientSettings {
            user_agent: concat!("lintbase/", env!("CARGO_PKG_VERSION")),
            proxy: cfg.proxy.as_ref(),
            enable_multiplexing: cfg.enable_multiplexing,
            timeout: Duration::from_secs(60),
        })?;
        let retry_policy = http::retry_policy(cfg.retry_max_times.max(1));
        Ok(Self {
            client,
            cfg,
            retry_policy,
        })
    }

    pub fn config(&self) -> &AiResolvedConfig {
        &self.cfg
    }

    fn api_headers(&self) -> Result<HeaderMap, LintBaseError> {
        let key = self
            .cfg
            .api_key
            .as_deref()
            .ok_or(LintBaseError::UpstreamNotConfigured("AI API key"))?;
        http::bearer_headers(Some(key))
    }

    fn vector_endpoint(&self, path: &str) -> Result<(Url, HeaderMap), LintBaseError> {
        let base = self
            .cfg
            .vector_index_url
            .as_ref()
            .ok_or(LintBaseError::UpstreamNotConfigured("vector index"))?;
        let url = http::join_segments(base, path.split('/'))?;

        let mut headers = HeaderMap::new();
        if let Some(key) = self.cfg.vector_index_api_key.as_deref() {
            let value = HeaderValue::from_str(key).map_err(|_| {
                LintBaseError::UnexpectedError("vector index key is not a valid header".into())
            })?;
            headers.insert("api-key", value);
        }
        Ok((url, headers))
    }

    /// First choice of a chat completion.
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String, LintBaseError> {
        let body = ChatCompletionRequest {
            model: self.cfg.completion_model.clone(),
            messages,
            max_tokens,
            temperature: Some(0.2),
        };
        let resp: ChatCompletionResponse = http::post_json(
            "completion",
            &self.client,
            self.retry_policy,
            &self.cfg.completion_url,
            self.api_headers()?,
            &body,
        )
        .await?;
        resp.first_content()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| LintBaseError::UnexpectedError("completion returned no choices".into()))
    }

    /// One embedding per input, in input order.
    pub async fn embed(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, LintBaseError> {
        let expected = input.len();
        let body = EmbeddingRequest {
            model: self.cfg.embedding_model.clone(),
            input,
        };
        let resp: EmbeddingResponse = http::post_json(
            "embedding",
            &self.client,
            self.retry_policy,
            &self.cfg.embedding_url,
            self.api_headers()?,
            &body,
        )
        .await?;
        let vectors = resp.into_ordered();
        if vectors.len() != expected {
            return Err(LintBaseError::UnexpectedError(format!(
                "embedding count mismatch: sent {expected}, got {}",
                vectors.len()
            )));
        }
        Ok(vectors)
    }

    pub async fn upsert_vectors(&self, vectors: Vec<VectorRecord>) -> Result<(), LintBaseError> {
        let (url, headers) = self.vector_endpoint("vectors/upsert")?;
        let body = VectorUpsertRequest {
            vectors,
            namespace: self.cfg.vector_namespace.clone(),
        };
        let _: Value = http::post_json(
            "vector-index",
            &self.client,
            self.retry_policy,
            &url,
            headers,
            &body,
        )
        .await?;
        Ok(())
    }

    pub async fn query_vectors(
        &self,
        vector: Vec<f32>,
        top_k: u32,
        filter: Option<Value>,
    ) -> Result<Vec<VectorMatch>, LintBaseError> {
        let (url, headers) = self.vector_endpoint("query")?;
        let body = VectorQueryRequest {
            vector,
            top_k,
            include_metadata: false,
            namespace: self.cfg.vector_namespace.clone(),
            filter,
        };
        let resp: VectorQueryResponse = http::post_json(
            "vector-index",
            &self.client,
            self.retry_policy,
            &url,
            headers,
            &body,
        )
        .await?;
        Ok(resp.matches)
    }
}
