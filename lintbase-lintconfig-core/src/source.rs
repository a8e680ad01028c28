//! Turns an untrusted lint configuration source into a JSON value without
//! executing it.

use crate::scanner::{balanced_object, code_mask, object_entries};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigFormat {
    JavaScript,
    Yaml,
    Json,
    /// Extensionless `.eslintrc`: JSON or YAML.
    Legacy,
    /// The `eslintConfig` field of `package.json`.
    PackageJson,
}

/// Recognized config file names, highest precedence first (ESLint's own order).
pub const CONFIG_FILE_NAMES: [(&str, ConfigFormat); 6] = [
    (".eslintrc.js", ConfigFormat::JavaScript),
    (".eslintrc.cjs", ConfigFormat::JavaScript),
    (".eslintrc.yaml", ConfigFormat::Yaml),
    (".eslintrc.yml", ConfigFormat::Yaml),
    (".eslintrc.json", ConfigFormat::Json),
    (".eslintrc", ConfigFormat::Legacy),
];

/// Top-level keys kept when the exported literal is only partly static.
const DECLARATIVE_KEYS: [&str; 3] = ["extends", "rules", "overrides"];

/// Pick the highest-precedence config file among `names`.
pub fn find_config_file<'a, I>(names: I) -> Option<(&'a str, ConfigFormat)>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let rank = CONFIG_FILE_NAMES.iter().position(|(c, _)| *c == name)?;
            Some((rank, name, CONFIG_FILE_NAMES[rank].1))
        })
        .min_by_key(|(rank, _, _)| *rank)
        .map(|(_, name, format)| (name, format))
}

#[derive(Debug, Error)]
pub enum ConfigSourceError {
    #[error("invalid JSON config: {0}")]
    Json(String),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no exported config object found")]
    NoExport,

    #[error("exported config is not a static literal: {0}")]
    NotStatic(String),

    #[error("package.json has no eslintConfig field")]
    MissingPackageField,

    #[error("config root must be an object")]
    NotAnObject,
}

static REQUIRE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire(?:\s*\.\s*resolve)?\s*\(\s*(?:"[^"]*"|'[^']*'|`[^`]*`)\s*\)"#)
        .expect("valid require() pattern")
});

static EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bmodule\.exports|\bexports\.default)\s*=|\bexport\s+default\b")
        .expect("valid export pattern")
});

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*;?").expect("valid identifier pattern")
});

/// Parse a config source of the given format into its root object.
pub fn parse_config_source(format: ConfigFormat, source: &str) -> Result<Value, ConfigSourceError> {
    let value = match format {
        ConfigFormat::Json => parse_json_lenient(source)?,
        ConfigFormat::Yaml => serde_yaml::from_str(source)?,
        ConfigFormat::Legacy => match parse_json_lenient(source) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str(source)?,
        },
        ConfigFormat::JavaScript => parse_javascript(source)?,
        ConfigFormat::PackageJson => parse_json_lenient(source)?
            .get_mut("eslintConfig")
            .map(Value::take)
            .ok_or(ConfigSourceError::MissingPackageField)?,
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(ConfigSourceError::NotAnObject)
    }
}

/// Strict JSON first, then JSON5 (comments, trailing commas, unquoted keys).
fn parse_json_lenient(source: &str) -> Result<Value, ConfigSourceError> {
    serde_json::from_str(source).or_else(|json_err| {
        json5::from_str(source).map_err(|json5_err| {
            ConfigSourceError::Json(format!("{json_err}; JSON5: {json5_err}"))
        })
    })
}

/// Locate the exported object literal and read it as JSON5 data.
///
/// `require(...)` / `require.resolve(...)` calls in code become `{}` first.
/// When other expressions keep the whole literal from parsing, only the
/// static parts of `extends`, `rules` and `overrides` are kept.
fn parse_javascript(source: &str) -> Result<Value, ConfigSourceError> {
    let mask = code_mask(source);
    let neutralized = REQUIRE_CALL.replace_all(source, |caps: &Captures<'_>| {
        let call = &caps[0];
        let in_code = caps.get(0).is_some_and(|m| mask[m.start()]);
        if in_code { "{}".to_string() } else { call.to_string() }
    });
    let src = neutralized.as_ref();
    let mask = code_mask(src);

    let export = EXPORT
        .find_iter(src)
        .find(|m| mask[m.start()])
        .ok_or(ConfigSourceError::NoExport)?;
    let exported = &src[export.end()..];
    let trimmed = exported.trim_start();

    let open = if trimmed.starts_with('{') {
        export.end() + (exported.len() - trimmed.len())
    } else {
        let ident = IDENTIFIER
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .ok_or_else(|| ConfigSourceError::NotStatic(preview(trimmed)))?;
        find_binding(src, &mask, ident.as_str())?
    };

    let literal = balanced_object(src, open)
        .ok_or_else(|| ConfigSourceError::NotStatic("unbalanced object literal".to_string()))?;
    json5::from_str::<Value>(literal).or_else(|err| {
        declarative_subset(literal).ok_or_else(|| ConfigSourceError::NotStatic(err.to_string()))
    })
}

/// The static `extends` / `rules` / `overrides` values of `literal`. A `rules`
/// object that does not parse as a whole keeps its static entries. `None`
/// when nothing could be recovered.
fn declarative_subset(literal: &str) -> Option<Value> {
    let mut config = Map::new();
    for (key, raw) in object_entries(literal) {
        if !DECLARATIVE_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match json5::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(_) if key == "rules" => Value::Object(static_entries(raw)),
            Err(_) => continue,
        };
        config.insert(key, value);
    }
    (!config.is_empty()).then_some(Value::Object(config))
}

fn static_entries(literal: &str) -> Map<String, Value> {
    object_entries(literal)
        .into_iter()
        .filter_map(|(key, raw)| json5::from_str::<Value>(raw).ok().map(|v| (key, v)))
        .collect()
}

/// Offset of the `{` bound by `const|let|var <ident> = {`.
fn find_binding(src: &str, mask: &[bool], ident: &str) -> Result<usize, ConfigSourceError> {
    let pattern = format!(
        r"\b(?:const|let|var)\s+{}\s*(?::[^=]+)?=\s*\{{",
        regex::escape(ident)
    );
    let re = Regex::new(&pattern).map_err(|e| ConfigSourceError::NotStatic(e.to_string()))?;
    let m = re
        .find_iter(src)
        .find(|m| mask[m.start()])
        .ok_or_else(|| ConfigSourceError::NotStatic(format!("unbound identifier `{ident}`")))?;
    Ok(m.end() - 1)
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn precedence_prefers_javascript_over_json() {
        let names = ["package.json", ".eslintrc.json", ".eslintrc.js", "README.md"];
        assert_eq!(
            find_config_file(names),
            Some((".eslintrc.js", ConfigFormat::JavaScript))
        );
        assert_eq!(find_config_file(["src", "package.json"]), None);
    }

    #[test]
    fn json_config_with_comments_falls_back_to_json5() {
        let src = r#"{
            // base
            "extends": ["eslint:recommended"],
            "rules": { "semi": "error", },
        }"#;
        let value = parse_config_source(ConfigFormat::Json, src).unwrap();
        assert_eq!(value["rules"]["semi"], json!("error"));
    }

    #[test]
    fn yaml_config() {
        let src = "extends:\n  - plugin:react/recommended\nrules:\n  react/jsx-key: [warn]\n";
        let value = parse_config_source(ConfigFormat::Yaml, src).unwrap();
        assert_eq!(value["extends"][0], json!("plugin:react/recommended"));
        assert_eq!(value["rules"]["react/jsx-key"][0], json!("warn"));
    }

    #[test]
    fn legacy_file_accepts_yaml() {
        let src = "root: true\nrules:\n  eqeqeq: error\n";
        let value = parse_config_source(ConfigFormat::Legacy, src).unwrap();
        assert_eq!(value["rules"]["eqeqeq"], json!("error"));
    }

    #[test]
    fn javascript_module_exports_with_require_calls() {
        let src = r#"
            'use strict';
            // shared settings
            module.exports = {
              root: true,
              parser: require.resolve('@typescript-eslint/parser'),
              plugins: ['react', require("./local-plugin")],
              extends: ['eslint:recommended', 'plugin:react/recommended'],
              rules: {
                'react/jsx-uses-vars': 'error',
                'no-console': ['warn', { allow: ['error'] }],
              },
            };
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(value["parser"], json!({}));
        assert_eq!(value["plugins"][1], json!({}));
        assert_eq!(value["extends"][1], json!("plugin:react/recommended"));
        assert_eq!(value["rules"]["no-console"][0], json!("warn"));
    }

    #[test]
    fn javascript_exported_identifier() {
        let src = r#"
            const config = { rules: { semi: 2 } };
            module.exports = config;
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(value["rules"]["semi"].as_f64(), Some(2.0));
    }

    #[test]
    fn javascript_export_default() {
        let src = "export default { extends: 'eslint:recommended' }";
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(value["extends"], json!("eslint:recommended"));
    }

    #[test]
    fn javascript_expressions_are_dropped_not_evaluated() {
        let src = r#"
            module.exports = {
              rules: { semi: process.env.CI ? 'error' : 'off', eqeqeq: 'error' },
            };
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(value, json!({ "rules": { "eqeqeq": "error" } }));
    }

    #[test]
    fn javascript_keeps_static_parts_next_to_dynamic_options() {
        let src = r#"
            const base = require('./base');
            module.exports = {
              ...base,
              root: true,
              parser: '@typescript-eslint/parser',
              parserOptions: {
                tsconfigRootDir: __dirname,
                project: ['./tsconfig.json'],
              },
              extends: ['eslint:recommended', 'plugin:@typescript-eslint/recommended'],
              rules: { 'no-console': 'error' },
              overrides: [{ files: ['*.test.ts'], rules: { 'no-console': 'off' } }],
              settings: { react: { version: process.env.REACT_VERSION } },
            };
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(
            value,
            json!({
                "extends": ["eslint:recommended", "plugin:@typescript-eslint/recommended"],
                "rules": { "no-console": "error" },
                "overrides": [{ "files": ["*.test.ts"], "rules": { "no-console": "off" } }]
            })
        );
    }

    #[test]
    fn javascript_without_static_declarations_is_rejected() {
        let src = "module.exports = { extends: [...shared.extends], plugins: [plugin] };";
        assert!(matches!(
            parse_config_source(ConfigFormat::JavaScript, src),
            Err(ConfigSourceError::NotStatic(_))
        ));

        let src = "module.exports = buildConfig({ strict: true });";
        assert!(matches!(
            parse_config_source(ConfigFormat::JavaScript, src),
            Err(ConfigSourceError::NotStatic(_))
        ));
    }

    #[test]
    fn javascript_export_in_comment_is_ignored() {
        let src = r#"
            // NOTE: keep module.exports = config shape for tooling
            /* export default legacy; */
            const note = "module.exports = other";
            module.exports = { extends: ['eslint:recommended'], rules: { eqeqeq: 2 } };
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(value["extends"], json!(["eslint:recommended"]));
        assert_eq!(value["rules"]["eqeqeq"].as_f64(), Some(2.0));
    }

    #[test]
    fn require_calls_inside_strings_are_kept() {
        let src = r#"
            // require('./ignored')
            module.exports = {
              rules: { 'no-restricted-syntax': ['error', "require('fs')"] },
            };
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(
            value["rules"]["no-restricted-syntax"][1],
            json!("require('fs')")
        );
    }

    #[test]
    fn exported_identifier_binding_in_comment_is_skipped() {
        let src = r#"
            // const config = { rules: { semi: 0 } };
            const config = { rules: { semi: 2 } };
            module.exports = config;
        "#;
        let value = parse_config_source(ConfigFormat::JavaScript, src).unwrap();
        assert_eq!(value["rules"]["semi"].as_f64(), Some(2.0));
    }

    #[test]
    fn javascript_without_export_is_rejected() {
        assert!(matches!(
            parse_config_source(ConfigFormat::JavaScript, "const x = {};"),
            Err(ConfigSourceError::NoExport)
        ));
    }

    #[test]
    fn package_json_field() {
        let src = r#"{ "name": "web", "eslintConfig": { "extends": "react-app" } }"#;
        let value = parse_config_source(ConfigFormat::PackageJson, src).unwrap();
        assert_eq!(value["extends"], json!("react-app"));

        assert!(matches!(
            parse_config_source(ConfigFormat::PackageJson, r#"{ "name": "web" }"#),
            Err(ConfigSourceError::MissingPackageField)
        ));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(
            parse_config_source(ConfigFormat::Json, "[1, 2]"),
            Err(ConfigSourceError::NotAnObject)
        ));
    }
}
