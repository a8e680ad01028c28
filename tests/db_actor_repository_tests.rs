mod common;

use chrono::Utc;
use common::{TempDb, sample_catalog, sign_up};
use lintbase::LintBaseError;
use lintbase::db::{
    CatalogIndex, DbActorHandle, LinterEnablement, LocalPackageSnapshot, RepositoryCreate,
    RepositorySnapshot, RepositorySnapshotView, RuleEnablement,
};

fn create(owner_id: i64, full_name: &str) -> RepositoryCreate {
    let name = full_name.split('/').nth(1).unwrap_or(full_name).to_string();
    RepositoryCreate {
        owner_id,
        name,
        full_name: full_name.to_string(),
        description: Some("demo".to_string()),
        language: Some("TypeScript".to_string()),
        size: Some(42),
        commit_sha: None,
    }
}

async fn catalog_index(db: &DbActorHandle) -> CatalogIndex {
    db.resolve_catalog(vec![
        "eslint".to_string(),
        "eslint-plugin-react".to_string(),
        "eslint-plugin-import".to_string(),
    ])
    .await
    .expect("resolve catalog")
}

fn snapshot(owner_id: i64, full_name: &str, sha: &str, index: &CatalogIndex) -> RepositorySnapshot {
    let id = |pkg: &str| index.linter_id(pkg).expect("linter in catalog");
    RepositorySnapshot {
        owner_id,
        full_name: full_name.to_string(),
        commit_sha: Some(sha.to_string()),
        committed_at: None,
        scanned_at: Utc::now(),
        local_package: LocalPackageSnapshot {
            path: String::new(),
            name: Some("web".to_string()),
            version: Some("1.0.0".to_string()),
            framework: "eslint".to_string(),
            config_path: ".eslintrc.json".to_string(),
            linters: vec![
                LinterEnablement {
                    linter_id: id("eslint-plugin-react"),
                    is_present: true,
                    is_suggested: false,
                    version: Some("^7.33.0".to_string()),
                },
                LinterEnablement {
                    linter_id: id("eslint-plugin-import"),
                    is_present: false,
                    is_suggested: true,
                    version: None,
                },
            ],
            config_ids: vec![
                index.config_id("eslint", "recommended").expect("config"),
                index
                    .config_id("eslint-plugin-react", "recommended")
                    .expect("config"),
            ],
            rules: vec![RuleEnablement {
                rule_id: index.rule_id("eslint", "no-unused-vars").expect("rule"),
                severity: 1,
                options: r#"[{"args":"none"}]"#.to_string(),
            }],
        },
    }
}

/// Snapshot rows without the generated local package ids.
fn derived_rows(view: &RepositorySnapshotView) -> Vec<String> {
    let mut rows = Vec::new();
    for p in &view.local_packages {
        rows.push(format!("package {} {:?} {:?}", p.path, p.name, p.version));
    }
    for f in &view.frameworks {
        rows.push(format!("framework {} {}", f.framework, f.config_path));
    }
    for l in &view.linters {
        rows.push(format!(
            "linter {} {} {} {:?}",
            l.package_name, l.is_present, l.is_suggested, l.version
        ));
    }
    for c in &view.configs {
        rows.push(format!("config {} {}", c.package_name, c.name));
    }
    for r in &view.rules {
        rows.push(format!(
            "rule {} {} {} {}",
            r.package_name, r.name, r.severity, r.options
        ));
    }
    rows
}

#[tokio::test]
async fn catalog_import_resolves_config_rules() {
    let tmp = TempDb::new("catalog-import");
    let db = tmp.spawn().await;

    let summary = db.import_catalog(sample_catalog()).await.unwrap();
    assert_eq!(summary.linters, 3);
    assert_eq!(summary.rules, 5);
    assert_eq!(summary.configs, 4);
    // `react/missing` is not a known rule.
    assert_eq!(summary.unresolved_rule_configs, 1);
    assert_eq!(summary.rule_configs, 6);

    // Importing again upserts instead of duplicating.
    let again = db.import_catalog(sample_catalog()).await.unwrap();
    assert_eq!(again, summary);
    let index = catalog_index(&db).await;
    assert_eq!(index.linters.len(), 3);
    assert_eq!(index.rules.len(), 5);
    assert_eq!(index.configs.len(), 4);

    let react = index.linter_id("eslint-plugin-react").unwrap();
    let detail = db.get_linter(react).await.unwrap().expect("linter exists");
    assert_eq!(detail.linter.package_name, "eslint-plugin-react");
    assert_eq!(detail.linter.rule_count, 2);
    assert_eq!(detail.configs.len(), 1);
    assert_eq!(detail.configs[0].rule_count, 2);

    assert!(
        db.resolve_catalog(vec!["eslint-plugin-unknown".to_string()])
            .await
            .unwrap()
            .linters
            .is_empty()
    );
}

#[tokio::test]
async fn snapshot_replacement_is_idempotent() {
    let tmp = TempDb::new("snapshot-idempotent");
    let db = tmp.spawn().await;
    db.import_catalog(sample_catalog()).await.unwrap();
    let index = catalog_index(&db).await;
    let owner = sign_up(&db, "alice").await;
    db.add_repository(create(owner, "alice/web")).await.unwrap();

    let counts = db
        .replace_snapshot(snapshot(owner, "alice/web", "abc", &index))
        .await
        .unwrap();
    assert_eq!((counts.linters, counts.configs, counts.rules), (2, 2, 1));
    let first = db.load_snapshot(owner, "alice/web").await.unwrap().unwrap();

    db.replace_snapshot(snapshot(owner, "alice/web", "abc", &index))
        .await
        .unwrap();
    let second = db.load_snapshot(owner, "alice/web").await.unwrap().unwrap();

    assert_eq!(derived_rows(&first), derived_rows(&second));
    assert_eq!(second.local_packages.len(), 1);
    assert_eq!(second.repository.commit_sha.as_deref(), Some("abc"));
    assert!(second.repository.scanned_at.is_some());

    // Present linters are listed first.
    assert!(second.linters[0].is_present);
    assert_eq!(second.linters[0].package_name, "eslint-plugin-react");
}

#[tokio::test]
async fn failed_snapshot_leaves_previous_rows_untouched() {
    let tmp = TempDb::new("snapshot-atomic");
    let db = tmp.spawn().await;
    db.import_catalog(sample_catalog()).await.unwrap();
    let index = catalog_index(&db).await;
    let owner = sign_up(&db, "alice").await;
    db.add_repository(create(owner, "alice/web")).await.unwrap();

    db.replace_snapshot(snapshot(owner, "alice/web", "abc", &index))
        .await
        .unwrap();
    let before = db.load_snapshot(owner, "alice/web").await.unwrap().unwrap();

    let mut broken = snapshot(owner, "alice/web", "def", &index);
    broken.local_package.rules.push(RuleEnablement {
        rule_id: 999_999,
        severity: 2,
        options: "[]".to_string(),
    });
    let err = db.replace_snapshot(broken).await.unwrap_err();
    assert!(matches!(err, LintBaseError::DatabaseError(_)), "got {err:?}");

    let after = db.load_snapshot(owner, "alice/web").await.unwrap().unwrap();
    assert_eq!(before.local_packages, after.local_packages);
    assert_eq!(before.linters, after.linters);
    assert_eq!(before.configs, after.configs);
    assert_eq!(before.rules, after.rules);
    assert_eq!(after.repository.commit_sha.as_deref(), Some("abc"));
    assert_eq!(before.repository.scanned_at, after.repository.scanned_at);
}

#[tokio::test]
async fn repositories_are_scoped_by_owner() {
    let tmp = TempDb::new("owner-scope");
    let db = tmp.spawn().await;
    db.import_catalog(sample_catalog()).await.unwrap();
    let index = catalog_index(&db).await;
    let alice = sign_up(&db, "alice").await;
    let bob = sign_up(&db, "bob").await;
    assert_ne!(alice, bob);

    // Same fullName for two users.
    let a = db.add_repository(create(alice, "octo/web")).await.unwrap();
    let b = db.add_repository(create(bob, "octo/web")).await.unwrap();
    assert_ne!(a.id, b.id);

    db.replace_snapshot(snapshot(alice, "octo/web", "abc", &index))
        .await
        .unwrap();

    let bob_view = db.load_snapshot(bob, "octo/web").await.unwrap().unwrap();
    assert_eq!(bob_view.repository.id, b.id);
    assert!(bob_view.local_packages.is_empty());
    assert!(bob_view.rules.is_empty());
    assert!(bob_view.repository.commit_sha.is_none());

    // Bob removing his copy never touches Alice's.
    db.remove_repository(bob, "octo/web").await.unwrap();
    assert!(db.get_repository(bob, "octo/web").await.unwrap().is_none());
    let alice_view = db.load_snapshot(alice, "octo/web").await.unwrap().unwrap();
    assert_eq!(alice_view.repository.id, a.id);
    assert_eq!(alice_view.rules.len(), 1);

    // A third user cannot see or modify Alice's repository.
    let carol = sign_up(&db, "carol").await;
    assert!(db.get_repository(carol, "octo/web").await.unwrap().is_none());
    assert!(matches!(
        db.remove_repository(carol, "octo/web").await,
        Err(LintBaseError::NotFound(_))
    ));
    assert!(matches!(
        db.replace_snapshot(snapshot(carol, "octo/web", "zzz", &index))
            .await,
        Err(LintBaseError::NotFound(_))
    ));
    assert_eq!(db.list_repositories(alice).await.unwrap().len(), 1);
    assert!(db.list_repositories(carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_cascades_and_maintenance_resets() {
    let tmp = TempDb::new("cascade");
    let db = tmp.spawn().await;
    db.import_catalog(sample_catalog()).await.unwrap();
    let index = catalog_index(&db).await;
    let owner = sign_up(&db, "alice").await;
    db.add_repository(create(owner, "alice/web")).await.unwrap();
    db.add_repository(create(owner, "alice/api")).await.unwrap();
    db.replace_snapshot(snapshot(owner, "alice/web", "abc", &index))
        .await
        .unwrap();
    db.replace_snapshot(snapshot(owner, "alice/api", "abc", &index))
        .await
        .unwrap();

    db.remove_repository(owner, "alice/web").await.unwrap();
    assert!(db.load_snapshot(owner, "alice/web").await.unwrap().is_none());

    let deleted = db.delete_derived_data().await.unwrap();
    assert_eq!(deleted.local_packages, 1);
    assert_eq!(deleted.repositories_reset, 1);
    let api = db.load_snapshot(owner, "alice/api").await.unwrap().unwrap();
    assert!(api.local_packages.is_empty());
    assert!(api.repository.scanned_at.is_none());
}
