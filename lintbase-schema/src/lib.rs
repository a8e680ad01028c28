pub mod ai;
pub mod catalog;
pub mod discord;
pub mod github;
pub mod manifest;
pub mod npm;

pub use ai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, EmbeddingRequest,
    EmbeddingResponse, VectorMatch, VectorQueryRequest, VectorQueryResponse, VectorRecord,
    VectorUpsertRequest,
};
pub use catalog::{CatalogConfig, CatalogDocument, CatalogLinter, CatalogRule};
pub use discord::DiscordUser;
pub use github::{
    ContentDecodeError, GithubCommitSummary, GithubContentEntry, GithubContentKind,
    GithubFileContent, GithubRepository, GithubUser,
};
pub use manifest::PackageManifest;
pub use npm::{DownloadPoint, Packument};
