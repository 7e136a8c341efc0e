//! Repository index downloads.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::dependency::{validate_name, InvalidName};
use crate::core::manifest::RepositoryManifest;
use crate::core::repository::RepositoryDescriptor;
use crate::sources::fetch::{FetchError, HttpClient};

/// Failure to refresh one repository's cached index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Name(#[from] InvalidName),

    #[error("({name}) can't download from: {url}, status code {status}")]
    Status {
        name: String,
        url: String,
        status: u16,
    },

    #[error("({name}) empty response")]
    EmptyBody { name: String },

    #[error("({name}) {source}")]
    Fetch {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("({name}) downloaded index is not a valid manifest: {source}")]
    Invalid {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("({name}) failed to write index cache {}: {source}", path.display())]
    Write {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cache file for a repository's index: `<cache_dir>/<name>.toml`.
pub fn index_cache_path(
    cache_dir: &Path,
    repository: &RepositoryDescriptor,
) -> Result<PathBuf, IndexError> {
    validate_name("repository", &repository.name)?;
    Ok(cache_dir.join(format!("{}.toml", repository.name)))
}

/// Download a repository's index and write it to the cache directory.
///
/// The body must parse as a repository manifest before it replaces the
/// cached copy, so a bad response never clobbers a working index.
pub fn download_repository(
    client: &dyn HttpClient,
    repository: &RepositoryDescriptor,
    cache_dir: &Path,
) -> Result<PathBuf, IndexError> {
    let name = || repository.name.clone();

    let response = client
        .get(&repository.url)
        .map_err(|source| IndexError::Fetch {
            name: name(),
            source,
        })?;

    if !response.is_ok() {
        return Err(IndexError::Status {
            name: name(),
            url: repository.url.clone(),
            status: response.status,
        });
    }
    if response.body.is_empty() {
        return Err(IndexError::EmptyBody { name: name() });
    }

    let text = String::from_utf8_lossy(&response.body);
    let manifest =
        RepositoryManifest::parse_str(&text).map_err(|source| IndexError::Invalid {
            name: name(),
            source,
        })?;

    let path = index_cache_path(cache_dir, repository)?;
    let write_err = |source| IndexError::Write {
        name: name(),
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(cache_dir).map_err(write_err)?;
    std::fs::write(&path, text.as_bytes()).map_err(write_err)?;

    tracing::info!(
        "Updated repository {} ({} packages)",
        repository.name,
        manifest.packages.len()
    );

    Ok(path)
}
