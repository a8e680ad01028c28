//! `package.json` as far as the scanner cares about it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    /// Inline ESLint configuration, used when no `.eslintrc*` file exists.
    #[serde(default)]
    pub eslint_config: Option<Value>,
}

impl PackageManifest {
    /// Runtime and dev dependencies (name, version range). Runtime entries win on duplicates.
    pub fn declared_dependencies(&self) -> BTreeMap<&str, &str> {
        let mut all: BTreeMap<&str, &str> = self
            .dev_dependencies
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        all.extend(
            self.dependencies
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_runtime_and_dev_dependencies() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{
                "name": "web",
                "dependencies": { "react": "^18.2.0" },
                "devDependencies": { "eslint": "^8.0.0", "react": "18.0.0" },
                "peerDependencies": { "vue": "*" }
            }"#,
        )
        .expect("valid manifest");

        let deps = manifest.declared_dependencies();
        assert_eq!(deps.get("react"), Some(&"^18.2.0"));
        assert_eq!(deps.get("eslint"), Some(&"^8.0.0"));
        assert!(!deps.contains_key("vue"));
    }

    #[test]
    fn tolerates_missing_sections() {
        let manifest: PackageManifest = serde_json::from_str("{}").expect("valid manifest");
        assert!(manifest.declared_dependencies().is_empty());
        assert!(manifest.eslint_config.is_none());
    }
}
