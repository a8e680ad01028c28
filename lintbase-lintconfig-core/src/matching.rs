//! Linter Matching: which known linter packages are relevant to a project.

use crate::naming::is_linter_package;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The lookup table shipped with the service (TOML).
pub const BUILTIN_LINTER_TABLE: &str = include_str!("../data/linters.toml");

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinterTable {
    pub version: u32,
    /// Linter package -> dependencies whose presence makes it relevant.
    #[serde(default)]
    pub lintees: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub always_recommended: Vec<String>,
    #[serde(default)]
    pub never_recommended: Vec<String>,
    /// Deprecated linter package -> replacement package.
    #[serde(default)]
    pub deprecations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinterMatch {
    /// Installed linters (dependency names following the plugin convention).
    pub present: Vec<String>,
    /// Relevant but not installed.
    pub suggested: Vec<String>,
}

impl LinterTable {
    pub fn replacement_for(&self, linter: &str) -> Option<&str> {
        self.deprecations.get(linter).map(String::as_str)
    }

    /// Never-recommended entries are excluded unless they carry a replacement.
    pub fn is_excluded(&self, linter: &str) -> bool {
        self.never_recommended.iter().any(|n| n == linter) && self.replacement_for(linter).is_none()
    }

    /// Match a project's dependency names (runtime and dev) against the table.
    pub fn match_dependencies<'a, I>(&self, dependencies: I) -> LinterMatch
    where
        I: IntoIterator<Item = &'a str>,
    {
        let deps: BTreeSet<&str> = dependencies.into_iter().collect();

        let present: BTreeSet<&str> = deps
            .iter()
            .copied()
            .filter(|name| is_linter_package(name))
            .collect();

        let by_lintee = self
            .lintees
            .iter()
            .filter(|(_, lintees)| lintees.iter().any(|l| deps.contains(l.as_str())))
            .map(|(linter, _)| linter.as_str());

        let suggested: BTreeSet<&str> = by_lintee
            .chain(self.always_recommended.iter().map(String::as_str))
            .filter(|linter| !self.is_excluded(linter))
            .filter(|linter| !present.contains(linter))
            .collect();

        LinterMatch {
            present: present.into_iter().map(str::to_string).collect(),
            suggested: suggested.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LinterTable {
        LinterTable {
            version: 1,
            lintees: BTreeMap::from([
                ("eslint-plugin-react".to_string(), vec!["react".to_string()]),
                ("eslint-plugin-vue".to_string(), vec!["vue".to_string()]),
                ("eslint-plugin-prettier".to_string(), vec!["prettier".to_string()]),
                ("eslint-plugin-node".to_string(), vec!["express".to_string()]),
            ]),
            always_recommended: vec!["eslint-plugin-import".to_string()],
            never_recommended: vec![
                "eslint-plugin-prettier".to_string(),
                "eslint-plugin-node".to_string(),
            ],
            deprecations: BTreeMap::from([(
                "eslint-plugin-node".to_string(),
                "eslint-plugin-n".to_string(),
            )]),
        }
    }

    #[test]
    fn react_project_gets_react_linter_suggested() {
        let matched = table().match_dependencies(["react", "eslint"]);
        assert_eq!(matched.present, Vec::<String>::new());
        assert_eq!(
            matched.suggested,
            vec!["eslint-plugin-import", "eslint-plugin-react"]
        );
    }

    #[test]
    fn installed_linter_is_not_also_suggested() {
        let matched = table().match_dependencies(["react", "eslint-plugin-react"]);
        assert_eq!(matched.present, vec!["eslint-plugin-react"]);
        assert!(!matched.suggested.contains(&"eslint-plugin-react".to_string()));
    }

    #[test]
    fn never_recommended_without_replacement_is_excluded() {
        let matched = table().match_dependencies(["prettier"]);
        assert!(!matched.suggested.contains(&"eslint-plugin-prettier".to_string()));
    }

    #[test]
    fn never_recommended_with_replacement_passes_through() {
        let t = table();
        let matched = t.match_dependencies(["express"]);
        assert!(matched.suggested.contains(&"eslint-plugin-node".to_string()));
        assert_eq!(t.replacement_for("eslint-plugin-node"), Some("eslint-plugin-n"));
    }

    #[test]
    fn present_linters_follow_the_naming_convention() {
        let matched = table().match_dependencies([
            "eslint-plugin-jest",
            "@typescript-eslint/eslint-plugin",
            "@typescript-eslint/parser",
            "eslint-config-prettier",
        ]);
        assert_eq!(
            matched.present,
            vec!["@typescript-eslint/eslint-plugin", "eslint-plugin-jest"]
        );
    }

    #[test]
    fn always_recommended_is_subject_to_exclusion() {
        let mut t = table();
        t.always_recommended.push("eslint-plugin-prettier".to_string());
        let matched = t.match_dependencies(std::iter::empty());
        assert_eq!(matched.suggested, vec!["eslint-plugin-import"]);
    }
}
