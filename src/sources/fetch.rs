//! Artifact fetching over HTTP.
//!
//! A fetch is a single blocking GET. There is no retry and no timeout
//! beyond what the transport applies; callers that want either wrap the
//! client themselves.

use thiserror::Error;
use url::Url;

/// Identifying client tag sent with every request.
pub const USER_AGENT: &str = "lpm-agent/1.0";

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    /// Only 200 counts as success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Failure to fetch a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("failed to download from url '{url}': {message}")]
    Transport { url: String, message: String },

    #[error("failed to download from url '{url}': {status}")]
    Status { url: String, status: u16 },

    #[error("empty response from url '{url}'")]
    EmptyBody { url: String },
}

/// Anything that can perform `GET(url) -> (status, body)`.
///
/// Transport failures are returned as [`FetchError::Transport`]; a
/// non-200 status is a successful call and is left to the caller.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(ReqwestClient { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("GET {}", parsed);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(parsed).send().map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport)?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Download an artifact, requiring a 200 response.
///
/// Nothing is written to disk; the caller persists the body.
pub fn fetch_artifact(client: &dyn HttpClient, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url)?;

    if !response.is_ok() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    tracing::debug!("Downloaded {} bytes from {}", response.body.len(), url);
    Ok(response.body)
}
