//! Resolved packages and archive kinds.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A package version picked from a repository manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,

    /// URL of the repository index the package was found in
    pub manifest_url: String,

    /// URL of the downloadable archive
    pub artifact_url: String,

    /// Raw `package_type` tag from the manifest (e.g., "zip")
    pub package_type: String,

    /// Id of the repository that defined the package
    pub repository_id: i64,
}

impl ResolvedPackage {
    /// The archive kind for this package's `package_type` tag.
    pub fn archive_kind(&self) -> Result<ArchiveKind, UnknownArchiveKind> {
        self.package_type.parse()
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Archive formats a package can be published as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// File extension used for the download cache.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A `package_type` tag that names no known archive kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported package type '{0}'")]
pub struct UnknownArchiveKind(pub String);

impl FromStr for ArchiveKind {
    type Err = UnknownArchiveKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ArchiveKind::Zip),
            "tar.gz" | "tgz" => Ok(ArchiveKind::TarGz),
            _ => Err(UnknownArchiveKind(s.to_string())),
        }
    }
}
