use crate::db::models::{
    DbPackage, DbRepository, DbSessionUser, DbUser, EmbeddingDocument, LinterRow, RuleRow,
};
use crate::db::ops::{account, catalog, maintenance, repository};
use crate::db::page::Page;
use crate::db::records::{
    CatalogIndex, ConfigDetail, DerivedDeletion, ImportSummary, LinterDetail, LinterQuery,
    OauthProfile, PackageStats, RepositoryCreate, RepositorySnapshot, RepositorySnapshotView,
    RuleDetail, RuleQuery, SearchQuery, SnapshotCounts,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::LintBaseError;
use chrono::{DateTime, Utc};
use lintbase_schema::CatalogDocument;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

type Reply<T> = RpcReplyPort<Result<T, LintBaseError>>;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Link a provider account to a user (creating both if new).
    UpsertOauthUser(OauthProfile, Reply<DbUser>),
    CreateSession(i64, String, DateTime<Utc>, Reply<()>),
    /// Resolve an unexpired session token to its user.
    FindSessionUser(String, Reply<Option<DbSessionUser>>),
    DeleteSession(String, Reply<u64>),
    /// Access token of the user's account at the given provider.
    GetAccountToken(i64, String, Reply<Option<String>>),

    AddRepository(RepositoryCreate, Reply<DbRepository>),
    /// Cascading delete of `(owner_id, full_name)`.
    RemoveRepository(i64, String, Reply<()>),
    GetRepository(i64, String, Reply<Option<DbRepository>>),
    ListRepositories(i64, Reply<Vec<DbRepository>>),
    /// Replace the scan snapshot of `(owner_id, full_name)` in one transaction.
    ReplaceSnapshot(RepositorySnapshot, Reply<SnapshotCounts>),
    LoadSnapshot(i64, String, Reply<Option<RepositorySnapshotView>>),

    ImportCatalog(CatalogDocument, Reply<ImportSummary>),
    /// Linter/config/rule ids of the given linter package names.
    ResolveCatalog(Vec<String>, Reply<CatalogIndex>),
    SearchLinters(LinterQuery, Reply<Page<LinterRow>>),
    GetLinter(i64, Reply<Option<LinterDetail>>),
    GetLintersByIds(Vec<i64>, Reply<Vec<LinterRow>>),
    ListLinterRules(i64, SearchQuery, Reply<Page<RuleRow>>),
    SearchRules(RuleQuery, Reply<Page<RuleRow>>),
    GetRule(i64, Reply<Option<RuleDetail>>),
    GetConfig(i64, Reply<Option<ConfigDetail>>),
    SearchPackages(SearchQuery, Reply<Page<DbPackage>>),

    DeleteDerivedData(Reply<DerivedDeletion>),
    ClearSummaries(Reply<(u64, u64)>),
    ListUnsummarizedRules(i64, Reply<Vec<RuleRow>>),
    SetRuleSummary(i64, String, Reply<()>),
    ListEmbeddingDocuments(Reply<Vec<EmbeddingDocument>>),
    ListPackageNames(Reply<Vec<String>>),
    UpdatePackageStats(Vec<PackageStats>, Reply<u64>),
}

/// Cloneable handle to the single database actor; injected through router state.
#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

fn rpc_failed(op: &'static str) -> impl FnOnce(ractor::RactorErr<DbActorMessage>) -> LintBaseError {
    move |e| LintBaseError::RactorError(format!("DbActor {op} RPC failed: {e}"))
}

impl DbActorHandle {
    pub async fn upsert_oauth_user(&self, profile: OauthProfile) -> Result<DbUser, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::UpsertOauthUser, profile)
            .map_err(rpc_failed("UpsertOauthUser"))?
    }

    pub async fn create_session(
        &self,
        user_id: i64,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), LintBaseError> {
        ractor::call!(
            self.actor,
            DbActorMessage::CreateSession,
            user_id,
            token,
            expires_at
        )
        .map_err(rpc_failed("CreateSession"))?
    }

    pub async fn find_session_user(
        &self,
        token: String,
    ) -> Result<Option<DbSessionUser>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::FindSessionUser, token)
            .map_err(rpc_failed("FindSessionUser"))?
    }

    pub async fn delete_session(&self, token: String) -> Result<u64, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::DeleteSession, token)
            .map_err(rpc_failed("DeleteSession"))?
    }

    pub async fn get_account_token(
        &self,
        user_id: i64,
        provider: &str,
    ) -> Result<Option<String>, LintBaseError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetAccountToken,
            user_id,
            provider.to_string()
        )
        .map_err(rpc_failed("GetAccountToken"))?
    }

    pub async fn add_repository(
        &self,
        create: RepositoryCreate,
    ) -> Result<DbRepository, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::AddRepository, create)
            .map_err(rpc_failed("AddRepository"))?
    }

    pub async fn remove_repository(
        &self,
        owner_id: i64,
        full_name: &str,
    ) -> Result<(), LintBaseError> {
        ractor::call!(
            self.actor,
            DbActorMessage::RemoveRepository,
            owner_id,
            full_name.to_string()
        )
        .map_err(rpc_failed("RemoveRepository"))?
    }

    pub async fn get_repository(
        &self,
        owner_id: i64,
        full_name: &str,
    ) -> Result<Option<DbRepository>, LintBaseError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetRepository,
            owner_id,
            full_name.to_string()
        )
        .map_err(rpc_failed("GetRepository"))?
    }

    pub async fn list_repositories(&self, owner_id: i64) -> Result<Vec<DbRepository>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ListRepositories, owner_id)
            .map_err(rpc_failed("ListRepositories"))?
    }

    pub async fn replace_snapshot(
        &self,
        snapshot: RepositorySnapshot,
    ) -> Result<SnapshotCounts, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ReplaceSnapshot, snapshot)
            .map_err(rpc_failed("ReplaceSnapshot"))?
    }

    pub async fn load_snapshot(
        &self,
        owner_id: i64,
        full_name: &str,
    ) -> Result<Option<RepositorySnapshotView>, LintBaseError> {
        ractor::call!(
            self.actor,
            DbActorMessage::LoadSnapshot,
            owner_id,
            full_name.to_string()
        )
        .map_err(rpc_failed("LoadSnapshot"))?
    }

    pub async fn import_catalog(
        &self,
        document: CatalogDocument,
    ) -> Result<ImportSummary, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ImportCatalog, document)
            .map_err(rpc_failed("ImportCatalog"))?
    }

    pub async fn resolve_catalog(&self, packages: Vec<String>) -> Result<CatalogIndex, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ResolveCatalog, packages)
            .map_err(rpc_failed("ResolveCatalog"))?
    }

    pub async fn search_linters(&self, query: LinterQuery) -> Result<Page<LinterRow>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::SearchLinters, query)
            .map_err(rpc_failed("SearchLinters"))?
    }

    pub async fn get_linter(&self, id: i64) -> Result<Option<LinterDetail>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::GetLinter, id).map_err(rpc_failed("GetLinter"))?
    }

    pub async fn get_linters_by_ids(&self, ids: Vec<i64>) -> Result<Vec<LinterRow>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::GetLintersByIds, ids)
            .map_err(rpc_failed("GetLintersByIds"))?
    }

    pub async fn list_linter_rules(
        &self,
        linter_id: i64,
        query: SearchQuery,
    ) -> Result<Page<RuleRow>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ListLinterRules, linter_id, query)
            .map_err(rpc_failed("ListLinterRules"))?
    }

    pub async fn search_rules(&self, query: RuleQuery) -> Result<Page<RuleRow>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::SearchRules, query)
            .map_err(rpc_failed("SearchRules"))?
    }

    pub async fn get_rule(&self, id: i64) -> Result<Option<RuleDetail>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::GetRule, id).map_err(rpc_failed("GetRule"))?
    }

    pub async fn get_config(&self, id: i64) -> Result<Option<ConfigDetail>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::GetConfig, id).map_err(rpc_failed("GetConfig"))?
    }

    pub async fn search_packages(&self, query: SearchQuery) -> Result<Page<DbPackage>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::SearchPackages, query)
            .map_err(rpc_failed("SearchPackages"))?
    }

    pub async fn delete_derived_data(&self) -> Result<DerivedDeletion, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::DeleteDerivedData)
            .map_err(rpc_failed("DeleteDerivedData"))?
    }

    pub async fn clear_summaries(&self) -> Result<(u64, u64), LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ClearSummaries)
            .map_err(rpc_failed("ClearSummaries"))?
    }

    pub async fn list_unsummarized_rules(&self, limit: i64) -> Result<Vec<RuleRow>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ListUnsummarizedRules, limit)
            .map_err(rpc_failed("ListUnsummarizedRules"))?
    }

    pub async fn set_rule_summary(&self, rule_id: i64, summary: String) -> Result<(), LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::SetRuleSummary, rule_id, summary)
            .map_err(rpc_failed("SetRuleSummary"))?
    }

    pub async fn list_embedding_documents(&self) -> Result<Vec<EmbeddingDocument>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ListEmbeddingDocuments)
            .map_err(rpc_failed("ListEmbeddingDocuments"))?
    }

    pub async fn list_package_names(&self) -> Result<Vec<String>, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::ListPackageNames)
            .map_err(rpc_failed("ListPackageNames"))?
    }

    pub async fn update_package_stats(&self, stats: Vec<PackageStats>) -> Result<u64, LintBaseError> {
        ractor::call!(self.actor, DbActorMessage::UpdatePackageStats, stats)
            .map_err(rpc_failed("UpdatePackageStats"))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::UpsertOauthUser(profile, reply) => {
                let _ = reply.send(account::upsert_oauth_user(pool, profile).await);
            }
            DbActorMessage::CreateSession(user_id, token, expires_at, reply) => {
                let res = account::create_session(pool, user_id, token, expires_at).await;
                let _ = reply.send(res);
            }
            DbActorMessage::FindSessionUser(token, reply) => {
                let _ = reply.send(account::find_session_user(pool, &token).await);
            }
            DbActorMessage::DeleteSession(token, reply) => {
                let _ = reply.send(account::delete_session(pool, &token).await);
            }
            DbActorMessage::GetAccountToken(user_id, provider, reply) => {
                let _ = reply.send(account::account_token(pool, user_id, &provider).await);
            }

            DbActorMessage::AddRepository(create, reply) => {
                let _ = reply.send(repository::add_repository(pool, create).await);
            }
            DbActorMessage::RemoveRepository(owner_id, full_name, reply) => {
                let res = repository::remove_repository(pool, owner_id, &full_name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetRepository(owner_id, full_name, reply) => {
                let res = repository::get_repository(pool, owner_id, &full_name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListRepositories(owner_id, reply) => {
                let _ = reply.send(repository::list_repositories(pool, owner_id).await);
            }
            DbActorMessage::ReplaceSnapshot(snapshot, reply) => {
                let _ = reply.send(repository::replace_snapshot(pool, snapshot).await);
            }
            DbActorMessage::LoadSnapshot(owner_id, full_name, reply) => {
                let res = repository::load_snapshot(pool, owner_id, &full_name).await;
                let _ = reply.send(res);
            }

            DbActorMessage::ImportCatalog(document, reply) => {
                let _ = reply.send(catalog::import_catalog(pool, document).await);
            }
            DbActorMessage::ResolveCatalog(packages, reply) => {
                let _ = reply.send(catalog::resolve_catalog(pool, packages).await);
            }
            DbActorMessage::SearchLinters(query, reply) => {
                let _ = reply.send(catalog::search_linters(pool, query).await);
            }
            DbActorMessage::GetLinter(id, reply) => {
                let _ = reply.send(catalog::get_linter(pool, id).await);
            }
            DbActorMessage::GetLintersByIds(ids, reply) => {
                let _ = reply.send(catalog::get_linters_by_ids(pool, ids).await);
            }
            DbActorMessage::ListLinterRules(linter_id, query, reply) => {
                let _ = reply.send(catalog::list_linter_rules(pool, linter_id, query).await);
            }
            DbActorMessage::SearchRules(query, reply) => {
                let _ = reply.send(catalog::search_rules(pool, query).await);
            }
            DbActorMessage::GetRule(id, reply) => {
                let _ = reply.send(catalog::get_rule(pool, id).await);
            }
            DbActorMessage::GetConfig(id, reply) => {
                let _ = reply.send(catalog::get_config(pool, id).await);
            }
            DbActorMessage::SearchPackages(query, reply) => {
                let _ = reply.send(catalog::search_packages(pool, query).await);
            }

            DbActorMessage::DeleteDerivedData(reply) => {
                let _ = reply.send(maintenance::delete_derived_data(pool).await);
            }
            DbActorMessage::ClearSummaries(reply) => {
                let _ = reply.send(maintenance::clear_summaries(pool).await);
            }
            DbActorMessage::ListUnsummarizedRules(limit, reply) => {
                let _ = reply.send(maintenance::list_unsummarized_rules(pool, limit).await);
            }
            DbActorMessage::SetRuleSummary(rule_id, summary, reply) => {
                let _ = reply.send(maintenance::set_rule_summary(pool, rule_id, summary).await);
            }
            DbActorMessage::ListEmbeddingDocuments(reply) => {
                let _ = reply.send(maintenance::list_embedding_documents(pool).await);
            }
            DbActorMessage::ListPackageNames(reply) => {
                let _ = reply.send(maintenance::list_package_names(pool).await);
            }
            DbActorMessage::UpdatePackageStats(stats, reply) => {
                let _ = reply.send(maintenance::update_package_stats(pool, stats).await);
            }
        }
        Ok(())
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, LintBaseError> {
    let (actor, _jh) = ractor::Actor::spawn(
        Some(format!("DbActor:{database_url}")),
        DbActor,
        database_url.to_string(),
    )
    .await
    .map_err(|e| LintBaseError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), LintBaseError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
