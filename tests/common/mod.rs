#![allow(dead_code)]

use lintbase::db::{DbActorHandle, OauthProfile};
use lintbase_schema::CatalogDocument;
use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// A throwaway SQLite file; removed (with its WAL files) on drop.
pub struct TempDb {
    pub path: PathBuf,
    pub url: String,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "lintbase-{tag}-{}-{nanos}.sqlite",
            std::process::id()
        ));
        let url = format!("sqlite:{}", path.display());
        Self { path, url }
    }

    pub async fn spawn(&self) -> DbActorHandle {
        lintbase::db::spawn(&self.url)
            .await
            .expect("failed to spawn DbActor")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(format!("{}-wal", self.path.display()));
        let _ = std::fs::remove_file(format!("{}-shm", self.path.display()));
    }
}

/// Core ESLint, eslint-plugin-react and eslint-plugin-import, each with a
/// couple of rules and configs.
pub fn sample_catalog() -> CatalogDocument {
    serde_json::from_value(json!({
        "linters": [
            {
                "package": "eslint",
                "description": "An AST-based pattern checker for JavaScript.",
                "rules": [
                    { "name": "no-unused-vars", "type": "problem", "description": "Disallow unused variables" },
                    { "name": "eqeqeq", "type": "suggestion", "fixable": true }
                ],
                "configs": [
                    { "name": "recommended", "rules": { "no-unused-vars": "error" } },
                    { "name": "all", "rules": { "no-unused-vars": "error", "eqeqeq": "error" } }
                ]
            },
            {
                "package": "eslint-plugin-react",
                "description": "React specific linting rules for ESLint",
                "rules": [
                    { "name": "jsx-key", "type": "problem" },
                    { "name": "jsx-uses-vars", "type": "problem" }
                ],
                "configs": [
                    {
                        "name": "recommended",
                        "rules": { "react/jsx-key": 2, "react/jsx-uses-vars": 2, "react/missing": 2 }
                    }
                ]
            },
            {
                "package": "eslint-plugin-import",
                "rules": [ { "name": "no-unresolved", "type": "problem" } ],
                "configs": [ { "name": "errors", "rules": { "import/no-unresolved": 2 } } ]
            }
        ]
    }))
    .expect("valid catalog document")
}

pub async fn sign_up(db: &DbActorHandle, login: &str) -> i64 {
    db.upsert_oauth_user(OauthProfile {
        provider: "github".to_string(),
        provider_account_id: format!("id-{login}"),
        login: Some(login.to_string()),
        name: Some(login.to_string()),
        email: Some(format!("{login}@example.com")),
        image: None,
        access_token: None,
    })
    .await
    .expect("upsert user")
    .id
}
