pub mod extract;
pub mod matching;
pub mod naming;
pub mod severity;
pub mod source;

mod scanner;

pub use extract::{ConfigExtraction, ExtendsRef, RuleRef, extract_config, extract_extends, extract_rules};
pub use matching::{BUILTIN_LINTER_TABLE, LinterMatch, LinterTable};
pub use naming::{BASE_FRAMEWORK, is_linter_package, plugin_package_name, split_namespaced};
pub use severity::Severity;
pub use source::{ConfigFormat, ConfigSourceError, find_config_file, parse_config_source};
