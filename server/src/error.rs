use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use shared::{Platform, UsernameError};
use thiserror::Error;

use crate::types::ErrorResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    RateLimited,
    Timeout,
    Failed,
}

impl UpstreamFailure {
    pub fn name(&self) -> &'static str {
        match self {
            UpstreamFailure::RateLimited => "rate_limited",
            UpstreamFailure::Timeout => "timeout",
            UpstreamFailure::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum StatsError {
    #[error("{platform} username is invalid: {source}")]
    InvalidInput {
        platform: Platform,
        #[source]
        source: UsernameError,
    },
    #[error("{platform} user not found")]
    NotFound { platform: Platform },
    #[error("{platform} is unavailable ({failure:?}): {detail}")]
    UpstreamUnavailable {
        platform: Platform,
        failure: UpstreamFailure,
        detail: String,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl StatsError {
    pub fn upstream(platform: Platform, failure: UpstreamFailure, detail: impl Into<String>) -> Self {
        StatsError::UpstreamUnavailable {
            platform,
            failure,
            detail: detail.into(),
        }
    }

    pub fn not_found(platform: Platform) -> Self {
        StatsError::NotFound { platform }
    }

    pub fn status(&self) -> Status {
        match self {
            StatsError::InvalidInput { .. } => Status::BadRequest,
            StatsError::NotFound { .. } => Status::NotFound,
            StatsError::UpstreamUnavailable { failure, .. } => match failure {
                UpstreamFailure::RateLimited => Status::ServiceUnavailable,
                UpstreamFailure::Timeout => Status::GatewayTimeout,
                UpstreamFailure::Failed => Status::BadGateway,
            },
            StatsError::Internal(_) => Status::InternalServerError,
        }
    }

    /// Message safe to show to API clients. Upstream bodies and internal
    /// details only ever reach the logs.
    pub fn public_message(&self) -> String {
        match self {
            StatsError::InvalidInput {
                platform,
                source: UsernameError::Empty,
            } => format!("{platform} username is required"),
            StatsError::InvalidInput { platform, source } => {
                format!("{platform} {source}")
            }
            StatsError::NotFound { platform } => format!("{platform} user not found"),
            StatsError::UpstreamUnavailable {
                platform, failure, ..
            } => match failure {
                UpstreamFailure::RateLimited => {
                    format!("{platform} rate limit reached, please try again later")
                }
                UpstreamFailure::Timeout => format!("{platform} did not respond in time"),
                UpstreamFailure::Failed => format!("Error fetching {platform} stats"),
            },
            StatsError::Internal(_) => "Unexpected server error".to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StatsError::InvalidInput { .. } => "invalid_input",
            StatsError::NotFound { .. } => "not_found",
            StatsError::UpstreamUnavailable { failure, .. } => failure.name(),
            StatsError::Internal(_) => "internal",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: Status,
    message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn internal() -> Self {
        Self::new(Status::InternalServerError, "Server error")
    }
}

impl From<StatsError> for ApiError {
    fn from(error: StatsError) -> Self {
        Self::new(error.status(), error.public_message())
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (
            self.status,
            Json(ErrorResponse {
                message: self.message,
            }),
        )
            .respond_to(req)
    }
}
