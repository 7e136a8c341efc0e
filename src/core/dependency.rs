//! Dependency specification.
//!
//! A dependency is a package name plus a version request. Requests are
//! either an exact version string or the sentinel `latest`; there are no
//! ranges.

use std::fmt;
use std::path::{Component, Path};

use thiserror::Error;

/// The sentinel requesting the newest available version.
pub const LATEST: &str = "latest";

/// What version of a package is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionRequest {
    /// The newest version under [`crate::resolver::version::compare_versions`].
    Latest,
    /// Exactly this version string.
    Exact(String),
}

impl VersionRequest {
    /// Parse a request; `latest` selects the newest version, anything else is exact.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s == LATEST {
            VersionRequest::Latest
        } else {
            VersionRequest::Exact(s.to_string())
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, VersionRequest::Latest)
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequest::Latest => f.write_str(LATEST),
            VersionRequest::Exact(version) => f.write_str(version),
        }
    }
}

/// A (package name, version request) pair to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec {
    name: String,
    version: VersionRequest,
}

impl DependencySpec {
    /// Create a new dependency specifier.
    pub fn new(name: impl Into<String>, version: VersionRequest) -> Self {
        DependencySpec {
            name: name.into(),
            version,
        }
    }

    /// Create a dependency on the latest version.
    pub fn latest(name: impl Into<String>) -> Self {
        Self::new(name, VersionRequest::Latest)
    }

    /// Create a dependency on an exact version.
    pub fn exact(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, VersionRequest::Exact(version.into()))
    }

    /// Build from a `packages.toml` entry such as `luasocket = "3.1.0"`.
    pub fn from_entry(name: &str, request: &str) -> Self {
        Self::new(name, VersionRequest::parse(request))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &VersionRequest {
        &self.version
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// A package or repository name that cannot be used as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} name '{name}': {reason}")]
pub struct InvalidName {
    pub kind: &'static str,
    pub name: String,
    pub reason: &'static str,
}

/// Check that `name` is a single plain path component.
///
/// Names become directory and file names (`<modules_path>/<name>`,
/// `<repositories_cache>/<name>.toml`), so they must not be empty, `.`,
/// `..`, absolute, or contain a separator.
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), InvalidName> {
    let invalid = |reason| InvalidName {
        kind,
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name contains a path separator"));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        (Some(Component::CurDir | Component::ParentDir), _) => {
            Err(invalid("name is a relative directory reference"))
        }
        _ => Err(invalid("name is not a single path component")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        assert_eq!(VersionRequest::parse("latest"), VersionRequest::Latest);
        assert_eq!(
            VersionRequest::parse(" 1.2.3 "),
            VersionRequest::Exact("1.2.3".to_string())
        );
        // Ranges are not interpreted
        assert_eq!(
            VersionRequest::parse("^1.2"),
            VersionRequest::Exact("^1.2".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(DependencySpec::latest("lpeg").to_string(), "lpeg:latest");
        assert_eq!(
            DependencySpec::exact("luasocket", "3.1.0").to_string(),
            "luasocket:3.1.0"
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("package", "lpeg").is_ok());
        assert!(validate_name("package", "lua-cjson").is_ok());
        assert!(validate_name("package", "luasocket.core").is_ok());

        for bad in ["", "  ", ".", "..", "../x", "a/b", "a\\b", "/etc"] {
            let err = validate_name("package", bad).unwrap_err();
            assert_eq!(err.name, bad);
        }
    }
}
