use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::{current_year, timestamp_in_year, ActivityCalendar, Platform, PlatformUsername};
use tracing::{instrument, warn};

use super::{check_status, send, StatsAdapter, Transport, UpstreamRequest};
use crate::{
    error::{StatsError, UpstreamFailure},
    types::LeetcodeStats,
};

mod types;
pub use types::*;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const PROFILE_QUERY: &str = r#"
query userPublicProfile($username: String!) {
  matchedUser(username: $username) {
    username
    profile { userAvatar realName aboutMe location }
  }
}"#;

const SOLVED_QUERY: &str = r#"
query userProblemsSolved($username: String!) {
  matchedUser(username: $username) {
    profile { ranking }
    submitStatsGlobal { acSubmissionNum { difficulty count } }
  }
}"#;

const CALENDAR_QUERY: &str = r#"
query userProfileCalendar($username: String!, $year: Int) {
  matchedUser(username: $username) {
    userCalendar(year: $year) { submissionCalendar }
  }
}"#;

pub struct LeetcodeAdapter {
    transport: Arc<dyn Transport>,
    graphql_url: String,
    stats_url: String,
}

impl LeetcodeAdapter {
    pub fn new(
        transport: Arc<dyn Transport>,
        graphql_url: impl Into<String>,
        stats_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            graphql_url: graphql_url.into(),
            stats_url: stats_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<Option<T>, StatsError> {
        let request = UpstreamRequest::post_json(
            self.graphql_url.as_str(),
            json!({ "query": query, "variables": variables }),
        )
        .header("User-Agent", BROWSER_USER_AGENT)
        .header("Referer", "https://leetcode.com");
        let response = send(self.transport.as_ref(), Platform::Leetcode, request).await?;
        let response: GraphqlResponse<MatchedUser<T>> =
            check_status(Platform::Leetcode, response)?.json(Platform::Leetcode)?;

        Ok(response.data.and_then(|data| data.matched_user))
    }

    #[instrument(skip(self))]
    async fn public_profile(
        &self,
        username: &PlatformUsername,
    ) -> Result<Option<PublicProfile>, StatsError> {
        self.graphql(PROFILE_QUERY, json!({ "username": username.as_str() }))
            .await
    }

    #[instrument(skip(self))]
    async fn solved_from_stats_api(
        &self,
        username: &PlatformUsername,
    ) -> Result<SolvedCounts, StatsError> {
        let url = format!("{}/{}", self.stats_url, username);
        let response = send(
            self.transport.as_ref(),
            Platform::Leetcode,
            UpstreamRequest::get(url),
        )
        .await?;
        let response: StatsApiResponse =
            check_status(Platform::Leetcode, response)?.json(Platform::Leetcode)?;

        if response.status != "success" {
            return Err(StatsError::upstream(
                Platform::Leetcode,
                UpstreamFailure::Failed,
                response
                    .message
                    .unwrap_or_else(|| format!("status {}", response.status)),
            ));
        }
        Ok(response.into())
    }

    #[instrument(skip(self))]
    async fn solved_from_graphql(
        &self,
        username: &PlatformUsername,
    ) -> Result<SolvedCounts, StatsError> {
        let solved: Option<SolvedProblems> = self
            .graphql(SOLVED_QUERY, json!({ "username": username.as_str() }))
            .await?;

        solved
            .map(Into::into)
            .ok_or_else(|| StatsError::not_found(Platform::Leetcode))
    }

    async fn solved_counts(&self, username: &PlatformUsername) -> Result<SolvedCounts, StatsError> {
        match self.solved_from_stats_api(username).await {
            Ok(counts) => Ok(counts),
            Err(e) => {
                warn!("Primary LeetCode stats source failed for {username}, falling back: {e}");
                self.solved_from_graphql(username).await
            }
        }
    }

    #[instrument(skip(self))]
    async fn submission_calendar(
        &self,
        username: &PlatformUsername,
        year: i32,
    ) -> Result<ActivityCalendar, StatsError> {
        let user: Option<CalendarUser> = self
            .graphql(
                CALENDAR_QUERY,
                json!({ "username": username.as_str(), "year": year }),
            )
            .await?;
        let Some(raw) = user
            .and_then(|u| u.user_calendar)
            .map(|c| c.submission_calendar)
        else {
            return Ok(ActivityCalendar::new());
        };

        parse_submission_calendar(&raw, year)
    }
}

pub fn parse_submission_calendar(raw: &str, year: i32) -> Result<ActivityCalendar, StatsError> {
    let days: HashMap<String, u32> = serde_json::from_str(raw).map_err(|e| {
        StatsError::upstream(
            Platform::Leetcode,
            UpstreamFailure::Failed,
            format!("malformed submission calendar: {e}"),
        )
    })?;

    Ok(days
        .into_iter()
        .filter(|(day, _)| {
            day.parse::<i64>()
                .map_or(false, |timestamp| timestamp_in_year(timestamp, year))
        })
        .collect())
}

#[async_trait]
impl StatsAdapter for LeetcodeAdapter {
    type Record = LeetcodeStats;

    fn platform(&self) -> Platform {
        Platform::Leetcode
    }

    async fn fetch_stats(&self, username: &PlatformUsername) -> Result<LeetcodeStats, StatsError> {
        let (profile, solved, calendar) = futures::join!(
            self.public_profile(username),
            self.solved_counts(username),
            self.submission_calendar(username, current_year()),
        );

        let calendar = calendar.unwrap_or_else(|e| {
            warn!("Failed to load LeetCode calendar of {username}: {e}");
            ActivityCalendar::new()
        });
        // An unknown user fails outright. An upstream outage of both solved
        // sources only fails when the calendar came back empty too.
        let solved = match solved {
            Ok(solved) => solved,
            Err(e @ StatsError::UpstreamUnavailable { .. }) if !calendar.is_empty() => {
                warn!("No LeetCode solved counts for {username}, keeping calendar: {e}");
                SolvedCounts::default()
            }
            Err(e) => return Err(e),
        };
        let profile = profile.unwrap_or_else(|e| {
            warn!("Failed to load LeetCode profile of {username}: {e}");
            None
        });

        let (profile_username, details) = match profile {
            Some(profile) => (profile.username, profile.profile.unwrap_or_default()),
            None => (None, ProfileDetails::default()),
        };
        let total_submissions = calendar.total();

        Ok(LeetcodeStats {
            username: profile_username.unwrap_or_else(|| username.to_string()),
            total_solved: solved.total,
            easy_solved: solved.easy,
            medium_solved: solved.medium,
            hard_solved: solved.hard,
            ranking: solved.ranking,
            avatar: details.user_avatar,
            real_name: details.real_name,
            about_me: details.about_me,
            location: details.location,
            submission_data: calendar.non_empty(),
            total_submissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::testing::FakeTransport;

    const GRAPHQL: &str = "https://leetcode.test/graphql";
    const STATS: &str = "https://stats.leetcode.test";

    const PRIMARY_OK: &str = r#"{"status":"success","message":"retrieved","totalSolved":300,"easySolved":120,"mediumSolved":150,"hardSolved":30,"ranking":45000}"#;

    fn adapter(transport: FakeTransport) -> LeetcodeAdapter {
        LeetcodeAdapter::new(Arc::new(transport), GRAPHQL, STATS)
    }

    fn username(name: &str) -> PlatformUsername {
        PlatformUsername::parse(name).unwrap()
    }

    fn day_start(year: i32, month: u32, day: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .unwrap()
            .timestamp()
    }

    #[test]
    fn calendar_keeps_only_requested_year() {
        let raw = format!(
            r#"{{"{}": 3, "{}": 2, "{}": 0, "garbage": 9}}"#,
            day_start(2024, 2, 1),
            day_start(2023, 12, 31),
            day_start(2024, 2, 2),
        );

        let calendar = parse_submission_calendar(&raw, 2024).unwrap();

        assert_eq!(calendar.active_days(), 1);
        assert_eq!(calendar.count(&day_start(2024, 2, 1).to_string()), 3);
        assert_eq!(calendar.total(), 3);
    }

    #[test]
    fn malformed_calendar_is_an_error() {
        assert!(parse_submission_calendar("not json", 2024).is_err());
    }

    #[tokio::test]
    async fn calendar_failure_keeps_solved_counts() {
        let transport = FakeTransport::new()
            .on_get(format!("{STATS}/alice"), 200, PRIMARY_OK)
            .on_post(
                GRAPHQL,
                "userPublicProfile",
                200,
                r#"{"data":{"matchedUser":{"username":"alice","profile":{"userAvatar":"https://avatar.test/a.png","realName":"Alice","aboutMe":null,"location":"Berlin"}}}}"#,
            )
            .on_post(GRAPHQL, "userProfileCalendar", 500, "oops");

        let stats = adapter(transport)
            .fetch_stats(&username("alice"))
            .await
            .unwrap();

        assert_eq!(stats.total_solved, 300);
        assert_eq!(stats.hard_solved, 30);
        assert_eq!(stats.ranking, Some(45000));
        assert_eq!(stats.avatar.as_deref(), Some("https://avatar.test/a.png"));
        assert_eq!(stats.submission_data, None);
        assert_eq!(stats.total_submissions, 0);
    }

    #[tokio::test]
    async fn falls_back_to_graphql_solved_counts() {
        let transport = FakeTransport::new()
            .on_get(format!("{STATS}/bob"), 503, "Application Error")
            .on_post(
                GRAPHQL,
                "userProblemsSolved",
                200,
                r#"{"data":{"matchedUser":{"profile":{"ranking":1200},"submitStatsGlobal":{"acSubmissionNum":[{"difficulty":"All","count":50},{"difficulty":"Easy","count":30},{"difficulty":"Medium","count":15},{"difficulty":"Hard","count":5}]}}}}"#,
            );

        let stats = adapter(transport)
            .fetch_stats(&username("bob"))
            .await
            .unwrap();

        assert_eq!(stats.username, "bob");
        assert_eq!(stats.total_solved, 50);
        assert_eq!(stats.easy_solved, 30);
        assert_eq!(stats.medium_solved, 15);
        assert_eq!(stats.hard_solved, 5);
        assert_eq!(stats.ranking, Some(1200));
        assert_eq!(stats.avatar, None);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let transport = FakeTransport::new()
            .on_get(
                format!("{STATS}/nobody"),
                200,
                r#"{"status":"error","message":"user does not exist"}"#,
            )
            .on_post(
                GRAPHQL,
                "userProblemsSolved",
                200,
                r#"{"errors":[{"message":"That user does not exist."}],"data":{"matchedUser":null}}"#,
            );

        let result = adapter(transport).fetch_stats(&username("nobody")).await;

        assert!(matches!(result, Err(StatsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn solved_outage_keeps_calendar() {
        let year = current_year();
        let calendar = format!(r#"{{\"{}\": 4}}"#, day_start(year, 1, 1));
        let transport = FakeTransport::new()
            .on_get(format!("{STATS}/dave"), 503, "Application Error")
            .on_post(GRAPHQL, "userProblemsSolved", 503, "Service Unavailable")
            .on_post(
                GRAPHQL,
                "userProfileCalendar",
                200,
                format!(
                    r#"{{"data":{{"matchedUser":{{"userCalendar":{{"submissionCalendar":"{calendar}"}}}}}}}}"#
                ),
            );

        let stats = adapter(transport)
            .fetch_stats(&username("dave"))
            .await
            .unwrap();

        assert_eq!(stats.total_solved, 0);
        assert_eq!(stats.hard_solved, 0);
        assert_eq!(stats.ranking, None);
        assert_eq!(stats.total_submissions, 4);
        assert!(stats.submission_data.is_some());
    }

    #[tokio::test]
    async fn solved_outage_without_calendar_fails() {
        let transport = FakeTransport::new()
            .on_get(format!("{STATS}/erin"), 503, "Application Error")
            .on_post(GRAPHQL, "userProblemsSolved", 503, "Service Unavailable")
            .on_post(GRAPHQL, "userProfileCalendar", 503, "Service Unavailable");

        let result = adapter(transport).fetch_stats(&username("erin")).await;

        assert!(matches!(result, Err(StatsError::UpstreamUnavailable { .. })));
    }

    #[tokio::test]
    async fn calendar_is_reported_for_current_year() {
        let year = current_year();
        let calendar = format!(r#"{{\"{}\": 4}}"#, day_start(year, 1, 1));
        let transport = FakeTransport::new()
            .on_get(format!("{STATS}/carol"), 200, PRIMARY_OK)
            .on_post(
                GRAPHQL,
                "userProfileCalendar",
                200,
                format!(
                    r#"{{"data":{{"matchedUser":{{"userCalendar":{{"submissionCalendar":"{calendar}"}}}}}}}}"#
                ),
            );

        let stats = adapter(transport)
            .fetch_stats(&username("carol"))
            .await
            .unwrap();

        assert_eq!(stats.total_submissions, 4);
        assert_eq!(stats.submission_data.unwrap().active_days(), 1);
    }
}
