use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use shared::{Platform, PlatformUsername};
use thiserror::Error;

use crate::error::{StatsError, UpstreamFailure};

pub mod codeforces;
pub mod github;
pub mod hackerrank;
pub mod leetcode;
mod transport;

pub use codeforces::CodeforcesAdapter;
pub use github::GithubAdapter;
pub use hackerrank::HackerrankAdapter;
pub use leetcode::LeetcodeAdapter;
pub use transport::ReqwestTransport;

#[async_trait]
pub trait StatsAdapter: Send + Sync {
    type Record: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn platform(&self) -> Platform;

    async fn fetch_stats(&self, username: &PlatformUsername) -> Result<Self::Record, StatsError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub json: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: vec![],
            json: None,
            timeout: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            json: Some(body),
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Header names are lowercase.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![],
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self, platform: Platform) -> Result<T, StatsError> {
        serde_json::from_str(&self.body).map_err(|e| {
            StatsError::upstream(
                platform,
                UpstreamFailure::Failed,
                format!("unexpected response shape: {e}"),
            )
        })
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Connection(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

pub(crate) async fn send(
    transport: &dyn Transport,
    platform: Platform,
    request: UpstreamRequest,
) -> Result<UpstreamResponse, StatsError> {
    transport.send(request).await.map_err(|e| {
        tracing::warn!("{platform} request failed: {e}");
        match e {
            TransportError::Timeout(detail) => {
                StatsError::upstream(platform, UpstreamFailure::Timeout, detail)
            }
            TransportError::Connection(detail) => {
                StatsError::upstream(platform, UpstreamFailure::Failed, detail)
            }
        }
    })
}

/// Generic status handling shared by the JSON adapters: success passes
/// through, 404 means the user does not exist, 429 is a rate limit and the
/// rest is an upstream failure.
pub(crate) fn check_status(
    platform: Platform,
    response: UpstreamResponse,
) -> Result<UpstreamResponse, StatsError> {
    match response.status {
        _ if response.is_success() => Ok(response),
        404 => Err(StatsError::not_found(platform)),
        429 => Err(StatsError::upstream(
            platform,
            UpstreamFailure::RateLimited,
            "HTTP 429",
        )),
        status => Err(StatsError::upstream(
            platform,
            UpstreamFailure::Failed,
            format!("HTTP {status}"),
        )),
    }
}
