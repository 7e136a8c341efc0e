//! Archive installation.
//!
//! Installing an archive persists the downloaded bytes to the package
//! cache, extracts every entry into a staging directory next to the
//! destination, and renames the staging directory into place once every
//! entry has been written. A failed extraction leaves the destination as
//! it was.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::core::package::{ArchiveKind, UnknownArchiveKind};
use crate::util::hash::Fingerprint;

/// Size of the buffer entries are streamed through.
const CHUNK_SIZE: usize = 8192;

/// Failure to install an archive.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    UnsupportedPackageType(#[from] UnknownArchiveKind),

    #[error("failed to write archive cache {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't name cache file for {package}: {message}")]
    CachePath { package: String, message: String },

    #[error("can't open archive {}: {message}", path.display())]
    ArchiveOpen { path: PathBuf, message: String },

    #[error("can't read entry {index} of {}: {message}", path.display())]
    ArchiveEntry {
        path: PathBuf,
        index: usize,
        message: String,
    },

    #[error("archive entry escapes destination: {entry}")]
    UnsafeEntry { entry: String },

    #[error("failed to extract '{entry}' to {}: {source}", path.display())]
    Extract {
        entry: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move package into {}: {source}", path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to lock install slot {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persist `bytes` to `cache_path` and extract them into `dest`.
///
/// Returns the fingerprint of `dest` on success.
pub fn install_archive(
    kind: ArchiveKind,
    bytes: &[u8],
    cache_path: &Path,
    dest: &Path,
) -> Result<Fingerprint, InstallError> {
    write_cache(bytes, cache_path)?;
    tracing::debug!("Saved archive to {}", cache_path.display());

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stage_err = |source| InstallError::Stage {
        path: dest.to_path_buf(),
        source,
    };
    fs::create_dir_all(parent).map_err(stage_err)?;

    // Dropping the staging dir removes whatever was extracted so far
    let staging = tempfile::Builder::new()
        .prefix(".lpm-stage-")
        .tempdir_in(parent)
        .map_err(stage_err)?;

    let root = staging.path().canonicalize().map_err(stage_err)?;
    let entries = match kind {
        ArchiveKind::Zip => extract_zip(cache_path, &root)?,
        ArchiveKind::TarGz => extract_tar_gz(bytes, cache_path, &root)?,
    };

    if dest.is_dir() {
        fs::remove_dir_all(dest).map_err(stage_err)?;
    } else if dest.exists() {
        fs::remove_file(dest).map_err(stage_err)?;
    }
    fs::rename(staging.path(), dest).map_err(stage_err)?;

    tracing::debug!("Extracted {} entries into {}", entries, dest.display());

    Ok(Fingerprint::of_path(dest))
}

fn write_cache(bytes: &[u8], cache_path: &Path) -> Result<(), InstallError> {
    let cache_err = |source| InstallError::CacheWrite {
        path: cache_path.to_path_buf(),
        source,
    };
    if let Some(parent) = cache_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(cache_err)?;
        }
    }
    fs::write(cache_path, bytes).map_err(cache_err)
}

/// Join an archive entry name onto `root`, rejecting names that climb out.
fn entry_path(root: &Path, name: &Path, display: &str) -> Result<PathBuf, InstallError> {
    let escapes = name.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(InstallError::UnsafeEntry {
            entry: display.to_string(),
        });
    }
    Ok(root.join(name))
}

/// Create `dir` and its parents, refusing to resolve anywhere outside `root`.
///
/// `root` must already be canonical.
fn create_dir_within(root: &Path, dir: &Path, entry: &str) -> Result<(), InstallError> {
    let extract_err = |source| InstallError::Extract {
        entry: entry.to_string(),
        path: dir.to_path_buf(),
        source,
    };

    let existing = dir
        .ancestors()
        .find(|p| fs::symlink_metadata(p).is_ok())
        .unwrap_or(root);
    let resolved = existing.canonicalize().map_err(extract_err)?;
    if !resolved.starts_with(root) {
        return Err(InstallError::UnsafeEntry {
            entry: entry.to_string(),
        });
    }

    fs::create_dir_all(dir).map_err(extract_err)?;

    let resolved = dir.canonicalize().map_err(extract_err)?;
    if !resolved.starts_with(root) {
        return Err(InstallError::UnsafeEntry {
            entry: entry.to_string(),
        });
    }
    Ok(())
}

/// Create `path` (truncating) under `root`, then stream `reader` into it.
fn copy_entry(
    reader: &mut impl Read,
    root: &Path,
    path: &Path,
    entry: &str,
) -> Result<(), InstallError> {
    let extract_err = |source| InstallError::Extract {
        entry: entry.to_string(),
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        create_dir_within(root, parent, entry)?;
    }
    if fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) {
        return Err(InstallError::UnsafeEntry {
            entry: entry.to_string(),
        });
    }
    let mut file = File::create(path).map_err(extract_err)?;

    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(extract_err(e)),
        };
        file.write_all(&buf[..n]).map_err(extract_err)?;
    }

    Ok(())
}

fn extract_zip(archive_path: &Path, root: &Path) -> Result<usize, InstallError> {
    let open_err = |message: String| InstallError::ArchiveOpen {
        path: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path).map_err(|e| open_err(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| open_err(e.to_string()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| InstallError::ArchiveEntry {
                path: archive_path.to_path_buf(),
                index,
                message: e.to_string(),
            })?;

        let name = entry.name().to_string();
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| InstallError::UnsafeEntry {
                entry: name.clone(),
            })?;
        let path = entry_path(root, &relative, &name)?;

        if entry.is_symlink() {
            tracing::warn!("Skipping symlink entry: {}", name);
        } else if entry.is_dir() {
            create_dir_within(root, &path, &name)?;
        } else {
            copy_entry(&mut entry, root, &path, &name)?;
        }
    }

    Ok(archive.len())
}

fn extract_tar_gz(data: &[u8], archive_path: &Path, root: &Path) -> Result<usize, InstallError> {
    use flate2::read::GzDecoder;
    use std::io::Cursor;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
    let entry_err = |index, e: io::Error| InstallError::ArchiveEntry {
        path: archive_path.to_path_buf(),
        index,
        message: e.to_string(),
    };

    let entries = archive.entries().map_err(|e| InstallError::ArchiveOpen {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut count = 0;
    for (index, entry) in entries.enumerate() {
        let mut entry = entry.map_err(|e| entry_err(index, e))?;
        let relative = entry.path().map_err(|e| entry_err(index, e))?.into_owned();
        let name = relative.to_string_lossy().into_owned();
        let path = entry_path(root, &relative, &name)?;

        let entry_type = entry.header().entry_type();
        match entry_type {
            tar::EntryType::Directory => {
                create_dir_within(root, &path, &name)?;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                copy_entry(&mut entry, root, &path, &name)?;
            }
            tar::EntryType::Symlink | tar::EntryType::Link => {
                tracing::warn!("Skipping link entry: {}", name);
            }
            _ => {
                tracing::debug!("Skipping unsupported entry type {:?}: {}", entry_type, name);
            }
        }
        count += 1;
    }

    Ok(count)
}
