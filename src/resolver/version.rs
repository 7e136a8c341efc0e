//! Version selection.
//!
//! Versions are dot-separated numeric tokens compared most significant
//! first. This is not semver: there are no pre-release tags
//! and, when one version is a token prefix of the other, the one with
//! FEWER tokens ranks higher (`1.2` beats `1.2.0`).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::dependency::VersionRequest;

/// Split a version string into its non-empty dot-separated tokens.
pub fn version_tokens(version: &str) -> Vec<&str> {
    version.split('.').filter(|t| !t.is_empty()).collect()
}

/// Numeric value of a token: its leading digits, saturating on overflow.
fn token_value(token: &str) -> Option<u64> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    if end == 0 {
        return None;
    }
    Some(token[..end].parse().unwrap_or(u64::MAX))
}

/// Compare two tokens by numeric value, or as strings when either has no
/// leading digits.
fn compare_tokens(a: &str, b: &str) -> Ordering {
    match (token_value(a), token_value(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Order two version strings; `Greater` means `a` is newer.
///
/// Tokens are compared pairwise until one pair differs in value, so `01`
/// and `1` tie and the next tokens decide. When every shared token ties
/// the version with fewer tokens is newer.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let tokens_a = version_tokens(a);
    let tokens_b = version_tokens(b);

    for (ta, tb) in tokens_a.iter().zip(tokens_b.iter()) {
        match compare_tokens(ta, tb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    // Shared prefix ties: fewer tokens wins.
    tokens_b.len().cmp(&tokens_a.len())
}

/// The newest version key of `versions`, if any.
///
/// Ties keep the map's order, so the result is deterministic.
pub fn latest_version<'a, V>(versions: &'a BTreeMap<String, V>) -> Option<&'a str> {
    let mut sorted: Vec<&str> = versions.keys().map(String::as_str).collect();
    sorted.sort_by(|a, b| compare_versions(b, a));
    sorted.first().copied()
}

/// Pick the version satisfying `request` from a package's version map.
///
/// Returns the chosen version and its artifact URL. An empty map never
/// matches, and exact requests match only an identical key.
pub fn select_version<'a>(
    request: &VersionRequest,
    versions: &'a BTreeMap<String, String>,
) -> Option<(&'a str, &'a str)> {
    if versions.is_empty() {
        return None;
    }

    match request {
        VersionRequest::Latest => {
            let version = latest_version(versions)?;
            versions
                .get_key_value(version)
                .map(|(v, url)| (v.as_str(), url.as_str()))
        }
        VersionRequest::Exact(wanted) => versions
            .get_key_value(wanted.as_str())
            .map(|(v, url)| (v.as_str(), url.as_str())),
    }
}
