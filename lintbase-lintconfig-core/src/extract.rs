//! Config Extraction: `extends`/`rules` of an ESLint config object into
//! structured plugin/config/rule references.

use crate::naming::{BASE_FRAMEWORK, plugin_package_name, split_namespaced};
use crate::severity::Severity;
use serde::Serialize;
use serde_json::Value;

const ESLINT_PREFIX: &str = "eslint:";
const PLUGIN_PREFIX: &str = "plugin:";

/// A config a project extends, resolved to the package that provides it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExtendsRef {
    pub plugin: String,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRef {
    pub plugin: String,
    pub rule_name: String,
    pub severity: Severity,
    /// Everything after the level in `[level, ...options]`.
    pub options: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigExtraction {
    pub extends: Vec<ExtendsRef>,
    pub rules: Vec<RuleRef>,
    /// `extends` entries that are neither `eslint:*` nor `plugin:*`
    /// (shareable configs, relative paths). Reported, not resolved.
    pub unrecognized_extends: Vec<String>,
}

impl ConfigExtraction {
    /// Every plugin package referenced by an `extends` or `rules` entry.
    pub fn referenced_plugins(&self) -> Vec<String> {
        let mut plugins: Vec<String> = self
            .extends
            .iter()
            .map(|e| e.plugin.clone())
            .chain(self.rules.iter().map(|r| r.plugin.clone()))
            .collect();
        plugins.sort();
        plugins.dedup();
        plugins
    }
}

/// Extract the top-level config and each `overrides[]` block, in order.
pub fn extract_config(config: &Value) -> ConfigExtraction {
    let mut out = ConfigExtraction::default();
    append_block(&mut out, config);

    if let Some(overrides) = config.get("overrides").and_then(Value::as_array) {
        for block in overrides {
            append_block(&mut out, block);
        }
    }
    out
}

fn append_block(out: &mut ConfigExtraction, block: &Value) {
    let (extends, unrecognized) = extract_extends(block.get("extends"));
    out.extends.extend(extends);
    out.unrecognized_extends.extend(unrecognized);
    out.rules.extend(extract_rules(block.get("rules")));
}

/// `extends` (a string or a list of strings) into `(recognized, unrecognized)`.
pub fn extract_extends(extends: Option<&Value>) -> (Vec<ExtendsRef>, Vec<String>) {
    let entries: Vec<&str> = match extends {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let mut recognized = Vec::new();
    let mut unrecognized = Vec::new();
    for entry in entries {
        match parse_extends_entry(entry.trim()) {
            Some(r) => recognized.push(r),
            None => unrecognized.push(entry.to_string()),
        }
    }
    (recognized, unrecognized)
}

fn parse_extends_entry(entry: &str) -> Option<ExtendsRef> {
    if let Some(config) = entry.strip_prefix(ESLINT_PREFIX) {
        return (!config.is_empty()).then(|| ExtendsRef {
            plugin: BASE_FRAMEWORK.to_string(),
            config: config.to_string(),
        });
    }

    let (namespace, config) = split_namespaced(entry.strip_prefix(PLUGIN_PREFIX)?)?;
    Some(ExtendsRef {
        plugin: plugin_package_name(namespace),
        config: config.to_string(),
    })
}

/// `rules` map into rule references; entries with an unreadable level are skipped.
pub fn extract_rules(rules: Option<&Value>) -> Vec<RuleRef> {
    let Some(Value::Object(map)) = rules else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, entry)| {
            let severity = Severity::from_rule_entry(entry)?;
            let (plugin, rule_name) = match split_namespaced(key) {
                Some((namespace, rule)) => (plugin_package_name(namespace), rule.to_string()),
                None if key.contains('/') || key.trim().is_empty() => return None,
                None => (BASE_FRAMEWORK.to_string(), key.clone()),
            };
            let options = match entry {
                Value::Array(items) => items.iter().skip(1).cloned().collect(),
                _ => Vec::new(),
            };
            Some(RuleRef {
                plugin,
                rule_name,
                severity,
                options,
            })
        })
        .collect()
}
