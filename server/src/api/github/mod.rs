use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use shared::{current_year, day_key, ActivityCalendar, Platform, PlatformUsername};
use tracing::{instrument, warn};

use super::{check_status, send, StatsAdapter, Transport, UpstreamRequest, UpstreamResponse};
use crate::{
    error::{StatsError, UpstreamFailure},
    types::GithubStats,
};

mod types;
pub use types::*;

const EVENTS_PER_PAGE: u32 = 100;

pub struct GithubAdapter {
    transport: Arc<dyn Transport>,
    api_url: String,
    token: Option<String>,
}

impl GithubAdapter {
    pub fn new(transport: Arc<dyn Transport>, api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, url: String) -> UpstreamRequest {
        let request = UpstreamRequest::get(url)
            .header("User-Agent", "devprofilehub")
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    #[instrument(skip(self))]
    async fn user(&self, username: &PlatformUsername) -> Result<GithubUser, StatsError> {
        let url = format!("{}/users/{}", self.api_url, username);
        let response = send(self.transport.as_ref(), Platform::Github, self.request(url)).await?;
        check_rate_limit(&response)?;
        check_status(Platform::Github, response)?.json(Platform::Github)
    }

    #[instrument(skip(self))]
    async fn public_events(
        &self,
        username: &PlatformUsername,
    ) -> Result<Vec<GithubEvent>, StatsError> {
        let url = format!(
            "{}/users/{}/events/public?per_page={EVENTS_PER_PAGE}",
            self.api_url, username
        );
        let response = send(self.transport.as_ref(), Platform::Github, self.request(url)).await?;
        check_rate_limit(&response)?;
        check_status(Platform::Github, response)?.json(Platform::Github)
    }
}

/// Primary quota exhaustion is a 403 with a zero remaining budget. Secondary
/// limits are a 429, or a 403 carrying `retry-after` or a rate limit message.
fn check_rate_limit(response: &UpstreamResponse) -> Result<(), StatsError> {
    let limited = match response.status {
        429 => true,
        403 => {
            response.header("x-ratelimit-remaining") == Some("0")
                || response.header("retry-after").is_some()
                || response.body.to_lowercase().contains("rate limit")
        }
        _ => false,
    };
    if limited {
        return Err(StatsError::upstream(
            Platform::Github,
            UpstreamFailure::RateLimited,
            format!("HTTP {}", response.status),
        ));
    }
    Ok(())
}

/// Counts events per UTC day within `year`. This approximates the
/// contribution graph: only public events are visible, and only one page.
pub fn contribution_calendar(events: &[GithubEvent], year: i32) -> ActivityCalendar {
    events
        .iter()
        .filter(|event| event.created_at.year() == year)
        .map(|event| (day_key(&event.created_at), 1))
        .collect()
}

#[async_trait]
impl StatsAdapter for GithubAdapter {
    type Record = GithubStats;

    fn platform(&self) -> Platform {
        Platform::Github
    }

    async fn fetch_stats(&self, username: &PlatformUsername) -> Result<GithubStats, StatsError> {
        let (user, events) = futures::join!(self.user(username), self.public_events(username));
        let user = user?;

        let calendar = match events {
            Ok(events) => contribution_calendar(&events, current_year()),
            Err(e) => {
                warn!("Failed to load public events of {username}, skipping calendar: {e}");
                ActivityCalendar::new()
            }
        };
        let total_contributions = calendar.total();

        Ok(GithubStats {
            username: username.to_string(),
            name: user.name,
            public_repos: user.public_repos,
            followers: user.followers,
            following: user.following,
            profile_url: user.html_url,
            avatar_url: user.avatar_url,
            bio: user.bio,
            location: user.location,
            contribution_data: calendar.non_empty(),
            total_contributions,
        })
    }
}
