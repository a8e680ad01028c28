use figment::{
    Figment,
    providers::{Format, Toml},
};
use lintbase_lintconfig_core::{BUILTIN_LINTER_TABLE, LinterTable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LintersConfig {
    /// Optional TOML file merged over the built-in linter table.
    /// TOML: `linters.table_path`.
    #[serde(default)]
    pub table_path: Option<PathBuf>,
}

impl LintersConfig {
    /// The built-in table, with `table_path` merged over it when set.
    pub fn load_table(&self) -> Result<LinterTable, figment::Error> {
        let figment = Figment::from(Toml::string(BUILTIN_LINTER_TABLE));
        let figment = match &self.table_path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        };
        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let table = LintersConfig::default()
            .load_table()
            .expect("built-in table is valid TOML");

        assert!(table.version > 0);
        assert!(table.lintees.contains_key("eslint-plugin-react"));
        assert_eq!(table.replacement_for("eslint-plugin-node"), Some("eslint-plugin-n"));
        for deprecated in table.deprecations.keys() {
            assert!(table.never_recommended.contains(deprecated));
        }
    }
}
