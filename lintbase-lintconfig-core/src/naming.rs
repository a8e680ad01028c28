//! ESLint package naming convention.

/// The base framework; un-namespaced rules and `eslint:*` configs belong to it.
pub const BASE_FRAMEWORK: &str = "eslint";

pub const PLUGIN_PREFIX: &str = "eslint-plugin-";
const SCOPED_PLUGIN: &str = "eslint-plugin";

/// Package name of the plugin behind a rule/config namespace.
///
/// `react` -> `eslint-plugin-react`, `@scope` -> `@scope/eslint-plugin`,
/// `@scope/x` -> `@scope/eslint-plugin-x`.
pub fn plugin_package_name(namespace: &str) -> String {
    match namespace.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, name)) => format!("@{scope}/{PLUGIN_PREFIX}{name}"),
            None => format!("@{scoped}/{SCOPED_PLUGIN}"),
        },
        None => format!("{PLUGIN_PREFIX}{namespace}"),
    }
}

/// Whether a dependency name follows the linter plugin naming convention.
pub fn is_linter_package(name: &str) -> bool {
    if name.starts_with(PLUGIN_PREFIX) {
        return name.len() > PLUGIN_PREFIX.len();
    }
    match name.strip_prefix('@').and_then(|s| s.split_once('/')) {
        Some((scope, pkg)) => {
            !scope.is_empty() && (pkg == SCOPED_PLUGIN || pkg.starts_with(PLUGIN_PREFIX))
        }
        None => false,
    }
}

/// Split a namespaced reference into `(namespace, rest)`.
///
/// `react/jsx-key` -> `("react", "jsx-key")`,
/// `@scope/no-x` -> `("@scope", "no-x")`,
/// `@scope/p/no-x` -> `("@scope/p", "no-x")`.
/// Returns `None` for un-namespaced or malformed references.
pub fn split_namespaced(reference: &str) -> Option<(&str, &str)> {
    let (namespace, rest) = if reference.starts_with('@') {
        let first = reference.find('/')?;
        match reference[first + 1..].find('/') {
            Some(second) => reference.split_at(first + 1 + second),
            None => reference.split_at(first),
        }
    } else {
        reference.split_at(reference.find('/')?)
    };
    let rest = &rest[1..];
    if namespace.is_empty() || namespace == "@" || rest.is_empty() {
        return None;
    }
    Some((namespace, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_names_follow_eslint_convention() {
        assert_eq!(plugin_package_name("react"), "eslint-plugin-react");
        assert_eq!(
            plugin_package_name("@typescript-eslint"),
            "@typescript-eslint/eslint-plugin"
        );
        assert_eq!(plugin_package_name("@acme/web"), "@acme/eslint-plugin-web");
    }

    #[test]
    fn recognizes_linter_packages() {
        assert!(is_linter_package("eslint-plugin-react"));
        assert!(is_linter_package("@typescript-eslint/eslint-plugin"));
        assert!(is_linter_package("@acme/eslint-plugin-web"));
        assert!(!is_linter_package("eslint-plugin-"));
        assert!(!is_linter_package("eslint"));
        assert!(!is_linter_package("eslint-config-airbnb"));
        assert!(!is_linter_package("@typescript-eslint/parser"));
    }

    #[test]
    fn splits_plain_and_scoped_references() {
        assert_eq!(split_namespaced("react/jsx-key"), Some(("react", "jsx-key")));
        assert_eq!(
            split_namespaced("@typescript-eslint/no-unused-vars"),
            Some(("@typescript-eslint", "no-unused-vars"))
        );
        assert_eq!(
            split_namespaced("@acme/web/no-globals"),
            Some(("@acme/web", "no-globals"))
        );
        assert_eq!(split_namespaced("no-unused-vars"), None);
        assert_eq!(split_namespaced("react/"), None);
        assert_eq!(split_namespaced("/x"), None);
        assert_eq!(split_namespaced("@scope"), None);
    }
}
