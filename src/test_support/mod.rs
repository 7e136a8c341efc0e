//! Test utilities and mocks for lpm unit tests.
//!
//! This module provides a mock HTTP client and builders for the archives
//! and repository indexes the install pipeline consumes.
//!
//! # Example
//!
//! ```rust,ignore
//! use lpm::test_support::{zip_archive, ArchiveEntry, MockHttpClient};
//!
//! #[test]
//! fn test_example() {
//!     let client = MockHttpClient::new();
//!     let bytes = zip_archive(&[ArchiveEntry::file("init.lua", "return {}")]);
//!     client.mock_url("https://example.org/pkg-1.0.zip", HttpResponse::new(200, bytes));
//!
//!     // Use the client in tests...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;

use crate::sources::fetch::{FetchError, HttpClient, HttpResponse};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock HTTP client for testing artifact and index downloads.
///
/// Unknown URLs fail with a transport error, like an unreachable host.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a URL.
    pub fn mock_url(&self, url: &str, response: HttpResponse) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    /// Get all requested URLs.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

/// An entry to put into a test archive.
#[derive(Debug, Clone)]
pub enum ArchiveEntry {
    /// A directory; the name should end with `/`.
    Dir(String),
    /// A regular file with contents.
    File(String, Vec<u8>),
    /// A symbolic link and its target.
    Symlink(String, String),
}

impl ArchiveEntry {
    pub fn dir(name: &str) -> Self {
        ArchiveEntry::Dir(name.to_string())
    }

    pub fn file(name: &str, content: impl AsRef<[u8]>) -> Self {
        ArchiveEntry::File(name.to_string(), content.as_ref().to_vec())
    }

    pub fn symlink(name: &str, target: &str) -> Self {
        ArchiveEntry::Symlink(name.to_string(), target.to_string())
    }
}

/// Build a zip archive in memory, entries in the given order.
pub fn zip_archive(entries: &[ArchiveEntry]) -> Vec<u8> {
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for entry in entries {
        match entry {
            ArchiveEntry::Dir(name) => {
                writer.add_directory(name.as_str(), options).unwrap();
            }
            ArchiveEntry::File(name, content) => {
                writer.start_file(name.as_str(), options).unwrap();
                writer.write_all(content).unwrap();
            }
            ArchiveEntry::Symlink(name, target) => {
                writer.add_symlink(name.as_str(), target.as_str(), options).unwrap();
            }
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Build a gzip-compressed tarball in memory, entries in the given order.
pub fn tar_gz_archive(entries: &[ArchiveEntry]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::{Builder, EntryType, Header};

    let mut data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut data, Compression::default());
        let mut builder = Builder::new(encoder);

        for entry in entries {
            let mut header = Header::new_gnu();
            match entry {
                ArchiveEntry::Dir(name) => {
                    header.set_path(name).unwrap();
                    header.set_size(0);
                    header.set_mode(0o755);
                    header.set_entry_type(EntryType::Directory);
                    header.set_cksum();
                    builder.append(&header, std::io::empty()).unwrap();
                }
                ArchiveEntry::File(name, content) => {
                    header.set_path(name).unwrap();
                    header.set_size(content.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();
                    builder.append(&header, content.as_slice()).unwrap();
                }
                ArchiveEntry::Symlink(name, target) => {
                    header.set_path(name).unwrap();
                    header.set_link_name(target).unwrap();
                    header.set_size(0);
                    header.set_mode(0o777);
                    header.set_entry_type(EntryType::Symlink);
                    header.set_cksum();
                    builder.append(&header, std::io::empty()).unwrap();
                }
            }
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
    data
}

/// Assertion helpers for tests.
pub mod assertions {
    /// Assert that an error's full context chain contains a message.
    pub fn assert_error_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, expected: &str) {
        match result {
            Ok(val) => panic!("expected error containing '{}', got Ok({:?})", expected, val),
            Err(e) => {
                let msg = format!("{:#}", e);
                assert!(
                    msg.contains(expected),
                    "error message '{}' does not contain '{}'",
                    msg,
                    expected
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::HttpClient;

    #[test]
    fn test_mock_http_client() {
        let client = MockHttpClient::new();
        client.mock_url(
            "https://example.org/file.zip",
            HttpResponse::new(200, b"zip content".to_vec()),
        );

        let response = client.get("https://example.org/file.zip").unwrap();
        assert!(response.is_ok());
        assert_eq!(response.body, b"zip content");

        assert!(client.get("https://example.org/other.zip").is_err());
        assert_eq!(client.requests().len(), 2);
    }

    #[test]
    fn test_zip_archive_lists_entries_in_order() {
        let bytes = zip_archive(&[ArchiveEntry::dir("a/"), ArchiveEntry::file("a/b.txt", "hello")]);
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(archive.len(), 2);
        assert!(names.contains(&"a/"));
        assert!(names.contains(&"a/b.txt"));
    }
}
