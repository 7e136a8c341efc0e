//! Package sources.
//!
//! Everything that talks to the outside world on behalf of an install:
//! fetching artifacts and repository indexes over HTTP, and unpacking
//! archives into install slots.

pub mod archive;
pub mod fetch;
pub mod index;

pub use archive::{install_archive, InstallError};
pub use fetch::{fetch_artifact, FetchError, HttpClient, HttpResponse, ReqwestClient};
pub use index::{download_repository, IndexError};
