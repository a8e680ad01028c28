use lintbase_lintconfig_core::{ConfigExtraction, LinterMatch};
use lintbase_schema::PackageManifest;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::db::{CatalogIndex, LinterEnablement, LocalPackageSnapshot, RuleEnablement};

pub struct PlanInput<'a> {
    pub path: &'a str,
    pub framework: &'a str,
    pub config_path: &'a str,
    pub manifest: &'a PackageManifest,
    pub extraction: &'a ConfigExtraction,
    pub matched: &'a LinterMatch,
    pub index: &'a CatalogIndex,
}

/// Resolves names to catalog ids and deduplicates by id. Names the catalog
/// does not know are dropped. A linter both present and suggested is stored
/// once, as present. A rule set twice keeps its first (top-level) setting.
pub fn plan_local_package(input: PlanInput<'_>) -> LocalPackageSnapshot {
    let declared = input.manifest.declared_dependencies();
    let mut linters: BTreeMap<i64, LinterEnablement> = BTreeMap::new();

    for name in &input.matched.present {
        let Some(linter_id) = input.index.linter_id(name) else {
            continue;
        };
        linters.entry(linter_id).or_insert_with(|| LinterEnablement {
            linter_id,
            is_present: true,
            is_suggested: false,
            version: declared.get(name.as_str()).map(|v| (*v).to_string()),
        });
    }

    for name in &input.matched.suggested {
        let Some(linter_id) = input.index.linter_id(name) else {
            continue;
        };
        linters.entry(linter_id).or_insert(LinterEnablement {
            linter_id,
            is_present: false,
            is_suggested: true,
            version: None,
        });
    }

    let config_ids: BTreeSet<i64> = input
        .extraction
        .extends
        .iter()
        .filter_map(|e| input.index.config_id(&e.plugin, &e.config))
        .collect();

    let mut rules: BTreeMap<i64, RuleEnablement> = BTreeMap::new();
    for rule in &input.extraction.rules {
        let Some(rule_id) = input.index.rule_id(&rule.plugin, &rule.rule_name) else {
            continue;
        };
        rules.entry(rule_id).or_insert_with(|| RuleEnablement {
            rule_id,
            severity: rule.severity.as_i64(),
            options: Value::Array(rule.options.clone()).to_string(),
        });
    }

    LocalPackageSnapshot {
        path: input.path.to_string(),
        name: input.manifest.name.clone(),
        version: input.manifest.version.clone(),
        framework: input.framework.to_string(),
        config_path: input.config_path.to_string(),
        linters: linters.into_values().collect(),
        config_ids: config_ids.into_iter().collect(),
        rules: rules.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintbase_lintconfig_core::extract_config;
    use serde_json::json;

    fn index() -> CatalogIndex {
        let mut index = CatalogIndex::default();
        index.linters.insert("eslint".into(), 1);
        index.linters.insert("eslint-plugin-react".into(), 2);
        index.linters.insert("eslint-plugin-import".into(), 3);
        index
            .configs
            .insert(("eslint".into(), "recommended".into()), 10);
        index
            .configs
            .insert(("eslint-plugin-react".into(), "recommended".into()), 11);
        index.rules.insert(("eslint".into(), "no-unused-vars".into()), 100);
        index
            .rules
            .insert(("eslint-plugin-react".into(), "jsx-uses-vars".into()), 101);
        index
    }

    fn manifest() -> PackageManifest {
        serde_json::from_value(json!({
            "name": "web",
            "version": "1.0.0",
            "devDependencies": { "eslint-plugin-react": "^7.33.0", "react": "^18.0.0" }
        }))
        .unwrap()
    }

    #[test]
    fn present_wins_over_suggested_and_unknown_names_drop() {
        let extraction = extract_config(&json!({
            "extends": ["eslint:recommended", "plugin:react/recommended", "plugin:vue/base"],
            "rules": {
                "no-unused-vars": ["warn", { "args": "none" }],
                "react/jsx-uses-vars": "error",
                "unknown/rule": "error"
            },
            "overrides": [{ "files": ["*.test.js"], "rules": { "no-unused-vars": "off" } }]
        }));
        let matched = LinterMatch {
            present: vec!["eslint-plugin-react".into()],
            suggested: vec![
                "eslint-plugin-import".into(),
                "eslint-plugin-react".into(),
                "eslint-plugin-jsx-a11y".into(),
            ],
        };
        let manifest = manifest();
        let index = index();

        let planned = plan_local_package(PlanInput {
            path: "",
            framework: "eslint",
            config_path: ".eslintrc.json",
            manifest: &manifest,
            extraction: &extraction,
            matched: &matched,
            index: &index,
        });

        assert_eq!(
            planned.linters,
            vec![
                LinterEnablement {
                    linter_id: 2,
                    is_present: true,
                    is_suggested: false,
                    version: Some("^7.33.0".into()),
                },
                LinterEnablement {
                    linter_id: 3,
                    is_present: false,
                    is_suggested: true,
                    version: None,
                },
            ]
        );
        assert_eq!(planned.config_ids, vec![10, 11]);
        assert_eq!(
            planned.rules,
            vec![
                RuleEnablement {
                    rule_id: 100,
                    severity: 1,
                    options: r#"[{"args":"none"}]"#.into(),
                },
                RuleEnablement {
                    rule_id: 101,
                    severity: 2,
                    options: "[]".into(),
                },
            ]
        );
        assert_eq!(planned.name.as_deref(), Some("web"));
    }
}
