pub mod extract;
pub mod guards;
pub mod router;
pub mod routes;

pub use router::{LintBaseState, lintbase_router};
