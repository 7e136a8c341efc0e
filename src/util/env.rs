//! Environment placeholder substitution.
//!
//! Configured paths such as `${HOME}/.lpm/modules` contain `${KEY}`
//! placeholders. Substitution never reads the process environment
//! implicitly: callers pass an [`EnvLookup`], so tests and embedders can
//! resolve paths against a fixed table.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::{Captures, Regex};

/// Matches `${KEY}`. The key runs to the first closing brace.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("placeholder pattern is valid"));

/// A key to value lookup used for placeholder substitution.
pub trait EnvLookup {
    /// Get the value for `key`, or `None` if it is not defined.
    fn get(&self, key: &str) -> Option<String>;
}

/// Lookup backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Replace every `${KEY}` in `input` with `env.get(KEY)`.
///
/// Unknown keys are removed when `replace_empty` is set and left intact
/// otherwise. Substituted values are not expanded again, and an
/// unterminated `${` is copied through unchanged.
pub fn fill_env_vars(input: &str, env: &dyn EnvLookup, replace_empty: bool) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &Captures<'_>| match env.get(&caps[1]) {
            Some(value) => value,
            None if replace_empty => String::new(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Strict template formatting.
///
/// Every `${key}` must be present in `args` with a non-empty value.
pub fn format_template(template: &str, args: &HashMap<&str, String>) -> Result<String> {
    for caps in PLACEHOLDER.captures_iter(template) {
        let key = &caps[1];
        if args.get(key).map_or(true, |v| v.is_empty()) {
            bail!(
                "failed to format string: {} because key \"{}\" is empty",
                template,
                key
            );
        }
    }

    Ok(PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            args.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("HOME".to_string(), "/home/lua".to_string());
        env.insert("LPM_ROOT".to_string(), "/opt/lpm".to_string());
        env.insert("EMPTY".to_string(), String::new());
        env.insert("NESTED".to_string(), "${HOME}".to_string());
        env
    }

    #[test]
    fn test_substitutes_known_variables() {
        assert_eq!(
            fill_env_vars("${HOME}/.lpm/cache", &env(), true),
            "/home/lua/.lpm/cache"
        );
        assert_eq!(
            fill_env_vars("${LPM_ROOT}/modules/${HOME}", &env(), false),
            "/opt/lpm/modules//home/lua"
        );
    }

    #[test]
    fn test_unknown_removed_when_replace_empty() {
        assert_eq!(
            fill_env_vars("${NOPE}/modules", &env(), true),
            "/modules"
        );
    }

    #[test]
    fn test_unknown_kept_without_replace_empty() {
        assert_eq!(
            fill_env_vars("${NOPE}/modules/${HOME}", &env(), false),
            "${NOPE}/modules//home/lua"
        );
    }

    #[test]
    fn test_defined_empty_is_substituted() {
        assert_eq!(fill_env_vars("a${EMPTY}b", &env(), false), "ab");
    }

    #[test]
    fn test_values_not_reexpanded() {
        assert_eq!(fill_env_vars("${NESTED}", &env(), true), "${HOME}");
    }

    #[test]
    fn test_unterminated_placeholder() {
        assert_eq!(
            fill_env_vars("${HOME}/${LPM_ROOT", &env(), true),
            "/home/lua/${LPM_ROOT"
        );
    }

    #[test]
    fn test_format_template() {
        let mut args = HashMap::new();
        args.insert("name", "luasocket".to_string());
        args.insert("version", "3.1.0".to_string());

        assert_eq!(
            format_template("${name}-${version}.zip", &args).unwrap(),
            "luasocket-3.1.0.zip"
        );

        let err = format_template("${name}-${missing}", &args).unwrap_err();
        assert!(err.to_string().contains("\"missing\" is empty"));
    }
}
