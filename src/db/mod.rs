//! Database module: the single actor that owns the SQLite pool.
//!
//! Layout:
//! - `schema.rs`: SQL DDL applied at start
//! - `models.rs`: rows read back from SQLite
//! - `records.rs`: write payloads and query inputs
//! - `ops/`: the SQL behind each actor message

pub mod actor;
pub mod models;
pub mod page;
pub mod records;
pub mod schema;

mod ops;

pub use actor::{DbActorHandle, DbActorMessage, spawn};
pub use models::{
    ConfigRow, ConfigRuleRow, DbPackage, DbRepository, DbSessionUser, DbUser, EmbeddingDocument,
    LinterRow, LocalConfigRow, LocalFrameworkRow, LocalLinterRow, LocalPackageRow, LocalRuleRow,
    RuleConfigRow, RuleRow,
};
pub use page::{Page, PageRequest};
pub use records::{
    CatalogIndex, ConfigDetail, DerivedDeletion, ImportSummary, LinterDetail, LinterEnablement,
    LinterQuery, LocalPackageSnapshot, OauthProfile, PackageStats, RepositoryCreate,
    RepositorySnapshot, RepositorySnapshotView, RuleDetail, RuleEnablement, RuleQuery,
    SearchQuery, SnapshotCounts,
};
pub use schema::SQLITE_INIT;
