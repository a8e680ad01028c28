//! HTTP clients for everything LintBase reads from or writes to outside its
//! own database: GitHub, Discord, the npm registry and the AI endpoints.

mod ai;
mod bootstrap;
mod discord;
mod github;
mod http;
mod registry;

pub use ai::AiClient;
pub use bootstrap::Upstreams;
pub use discord::DiscordClient;
pub use github::GithubClient;
pub(crate) use github::split_full_name;
pub use registry::RegistryClient;
