use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use shared::{Platform, PlatformUsername, Rating, NOT_AVAILABLE};
use tracing::instrument;

use super::{check_status, send, StatsAdapter, Transport, UpstreamRequest, UpstreamResponse};
use crate::{
    error::{StatsError, UpstreamFailure},
    types::CodeforcesStats,
};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeforcesUser {
    handle: String,
    rating: Option<i64>,
    max_rating: Option<i64>,
    rank: Option<String>,
    max_rank: Option<String>,
    #[serde(default)]
    contribution: i64,
    title_photo: Option<String>,
}

impl From<CodeforcesUser> for CodeforcesStats {
    fn from(user: CodeforcesUser) -> Self {
        Self {
            handle: user.handle,
            rating: Rating::or_unrated(user.rating),
            max_rating: Rating::or_label(user.max_rating, NOT_AVAILABLE),
            rank: user.rank.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            max_rank: user.max_rank.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            contribution: user.contribution,
            avatar: user.title_photo,
        }
    }
}

pub struct CodeforcesAdapter {
    transport: Arc<dyn Transport>,
    api_url: String,
}

impl CodeforcesAdapter {
    pub fn new(transport: Arc<dyn Transport>, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Codeforces answers failures with `{"status":"FAILED","comment":...}`; the
/// comment is the only way to tell an unknown handle from a throttled call.
fn check_failed_call(response: &UpstreamResponse) -> Result<(), StatsError> {
    if response.is_success() {
        return Ok(());
    }
    let Ok(failure) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&response.body) else {
        return Ok(());
    };
    let comment = failure.comment.unwrap_or_default().to_lowercase();
    if comment.contains("not found") {
        return Err(StatsError::not_found(Platform::Codeforces));
    }
    if comment.contains("limit exceeded") {
        return Err(StatsError::upstream(
            Platform::Codeforces,
            UpstreamFailure::RateLimited,
            comment,
        ));
    }
    Ok(())
}

#[async_trait]
impl StatsAdapter for CodeforcesAdapter {
    type Record = CodeforcesStats;

    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    #[instrument(skip(self))]
    async fn fetch_stats(
        &self,
        username: &PlatformUsername,
    ) -> Result<CodeforcesStats, StatsError> {
        let url = format!("{}/user.info?handles={}", self.api_url, username);
        let response = send(
            self.transport.as_ref(),
            Platform::Codeforces,
            UpstreamRequest::get(url),
        )
        .await?;
        check_failed_call(&response)?;

        let response: ApiResponse<Vec<CodeforcesUser>> =
            check_status(Platform::Codeforces, response)?.json(Platform::Codeforces)?;
        if response.status != "OK" {
            return Err(StatsError::upstream(
                Platform::Codeforces,
                UpstreamFailure::Failed,
                response.comment.unwrap_or(response.status),
            ));
        }

        response
            .result
            .and_then(|users| users.into_iter().next())
            .map(Into::into)
            .ok_or_else(|| StatsError::not_found(Platform::Codeforces))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::TransportError, testing::FakeTransport};

    const API: &str = "https://codeforces.test/api";

    async fn fetch(transport: FakeTransport, handle: &str) -> Result<CodeforcesStats, StatsError> {
        CodeforcesAdapter::new(Arc::new(transport), API)
            .fetch_stats(&PlatformUsername::parse(handle).unwrap())
            .await
    }

    #[tokio::test]
    async fn rated_user_keeps_numbers() {
        let transport = FakeTransport::new().on_get(
            format!("{API}/user.info?handles=tourist"),
            200,
            r#"{"status":"OK","result":[{"handle":"tourist","rating":3800,"maxRating":4000,"rank":"legendary grandmaster","maxRank":"tourist","contribution":120,"titlePhoto":"https://userpic.test/t.jpg"}]}"#,
        );

        let stats = fetch(transport, "tourist").await.unwrap();

        assert_eq!(stats.rating, Rating::Value(3800));
        assert_eq!(stats.max_rating, Rating::Value(4000));
        assert_eq!(stats.rank, "legendary grandmaster");
        assert_eq!(stats.contribution, 120);
    }

    #[tokio::test]
    async fn unrated_user_is_labelled() {
        let transport = FakeTransport::new().on_get(
            format!("{API}/user.info?handles=newbie"),
            200,
            r#"{"status":"OK","result":[{"handle":"newbie","contribution":0,"titlePhoto":"https://userpic.test/n.jpg"}]}"#,
        );

        let stats = fetch(transport, "newbie").await.unwrap();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["rating"], "Unrated");
        assert_eq!(json["maxRating"], "N/A");
        assert_eq!(json["rank"], "N/A");
        assert_eq!(json["maxRank"], "N/A");
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let transport = FakeTransport::new().on_get(
            format!("{API}/user.info?handles=nobody"),
            400,
            r#"{"status":"FAILED","comment":"handles: User with handle nobody not found"}"#,
        );

        assert!(matches!(
            fetch(transport, "nobody").await,
            Err(StatsError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn call_limit_is_rate_limited() {
        let transport = FakeTransport::new().on_get(
            format!("{API}/user.info?handles=tourist"),
            503,
            r#"{"status":"FAILED","comment":"Call limit exceeded"}"#,
        );

        assert!(matches!(
            fetch(transport, "tourist").await,
            Err(StatsError::UpstreamUnavailable {
                failure: UpstreamFailure::RateLimited,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn timeout_is_reported_as_timeout() {
        let transport = FakeTransport::new().on_error(
            format!("{API}/user.info?handles=tourist"),
            TransportError::Timeout("operation timed out".to_string()),
        );

        let error = fetch(transport, "tourist").await.unwrap_err();

        assert_eq!(error.status().code, 504);
    }
}
