//! SQL DDL for initializing the database schema.
//! SQLite-first design. Foreign keys are enforced by the connect options.

/// SQLite schema includes:
/// - identity tables (`users`, `accounts`, `sessions`)
/// - the linter catalog (`packages`, `lint_frameworks`, `linters`, `rules`, `configs`, `rule_configs`)
/// - connected repositories and their scan snapshot (`repositories`, `local_package*`)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Identity
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NULL,
    email TEXT NULL,
    image TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id),
    provider TEXT NOT NULL,
    provider_account_id TEXT NOT NULL,
    login TEXT NULL,
    access_token TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(provider, provider_account_id)
);

CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(user_id);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY NOT NULL,
    token TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    expires_at TEXT NOT NULL, -- RFC3339
    created_at TEXT NOT NULL
);

-- ---------------------------------------------------------------------------
-- Linter catalog
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    ecosystem TEXT NOT NULL DEFAULT 'npm',
    description TEXT NULL,
    homepage TEXT NULL,
    repository_url TEXT NULL,
    weekly_downloads INTEGER NULL,
    stars INTEGER NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(name, ecosystem)
);

CREATE TABLE IF NOT EXISTS lint_frameworks (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS linters (
    id INTEGER PRIMARY KEY NOT NULL,
    package_id INTEGER NOT NULL UNIQUE REFERENCES packages(id),
    lint_framework_id INTEGER NOT NULL REFERENCES lint_frameworks(id),
    summary TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY NOT NULL,
    linter_id INTEGER NOT NULL REFERENCES linters(id),
    name TEXT NOT NULL,
    description TEXT NULL,
    fixable INTEGER NOT NULL DEFAULT 0,
    has_suggestions INTEGER NOT NULL DEFAULT 0,
    deprecated INTEGER NOT NULL DEFAULT 0,
    requires_type_checking INTEGER NOT NULL DEFAULT 0,
    rule_type TEXT NULL,
    url TEXT NULL,
    options TEXT NOT NULL DEFAULT 'null', -- JSON schema
    summary TEXT NULL,
    UNIQUE(name, linter_id)
);

CREATE TABLE IF NOT EXISTS configs (
    id INTEGER PRIMARY KEY NOT NULL,
    linter_id INTEGER NOT NULL REFERENCES linters(id),
    name TEXT NOT NULL,
    UNIQUE(name, linter_id)
);

CREATE TABLE IF NOT EXISTS rule_configs (
    id INTEGER PRIMARY KEY NOT NULL,
    config_id INTEGER NOT NULL REFERENCES configs(id),
    rule_id INTEGER NOT NULL REFERENCES rules(id),
    severity INTEGER NOT NULL, -- 0 off, 1 warn, 2 error
    UNIQUE(config_id, rule_id)
);

CREATE INDEX IF NOT EXISTS idx_rule_configs_rule ON rule_configs(rule_id);

-- ---------------------------------------------------------------------------
-- Connected repositories
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS repositories (
    id INTEGER PRIMARY KEY NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    full_name TEXT NOT NULL,
    description TEXT NULL,
    language TEXT NULL,
    size INTEGER NULL,
    commit_sha TEXT NULL,
    committed_at TEXT NULL,
    scanned_at TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(owner_id, full_name)
);

CREATE TABLE IF NOT EXISTS local_packages (
    id INTEGER PRIMARY KEY NOT NULL,
    repository_id INTEGER NOT NULL REFERENCES repositories(id),
    path TEXT NOT NULL,
    name TEXT NULL,
    version TEXT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_local_packages_repository ON local_packages(repository_id);

CREATE TABLE IF NOT EXISTS local_package_lint_frameworks (
    id INTEGER PRIMARY KEY NOT NULL,
    local_package_id INTEGER NOT NULL REFERENCES local_packages(id),
    lint_framework_id INTEGER NOT NULL REFERENCES lint_frameworks(id),
    config_path TEXT NOT NULL,
    UNIQUE(local_package_id, lint_framework_id)
);

CREATE TABLE IF NOT EXISTS local_package_linters (
    id INTEGER PRIMARY KEY NOT NULL,
    local_package_id INTEGER NOT NULL REFERENCES local_packages(id),
    linter_id INTEGER NOT NULL REFERENCES linters(id),
    is_present INTEGER NOT NULL DEFAULT 0,
    is_suggested INTEGER NOT NULL DEFAULT 0,
    version TEXT NULL,
    UNIQUE(local_package_id, linter_id)
);

CREATE TABLE IF NOT EXISTS local_package_configs (
    id INTEGER PRIMARY KEY NOT NULL,
    local_package_id INTEGER NOT NULL REFERENCES local_packages(id),
    config_id INTEGER NOT NULL REFERENCES configs(id),
    UNIQUE(local_package_id, config_id)
);

CREATE TABLE IF NOT EXISTS local_package_rules (
    id INTEGER PRIMARY KEY NOT NULL,
    local_package_id INTEGER NOT NULL REFERENCES local_packages(id),
    rule_id INTEGER NOT NULL REFERENCES rules(id),
    severity INTEGER NOT NULL,
    options TEXT NOT NULL DEFAULT '[]', -- JSON array
    UNIQUE(local_package_id, rule_id)
);
"#;
