//! Repository refresh: read a repository root, normalize its lint setup and
//! store the result as the repository's snapshot.

mod plan;
mod refresh;
mod source;

pub use plan::{PlanInput, plan_local_package};
pub use refresh::{RefreshOutcome, SkipReason, refresh_repository};
pub use source::{GithubContentSource, RepositoryContentSource};
