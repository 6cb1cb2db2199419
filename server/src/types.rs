use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ActivityCalendar, Rating, NOT_AVAILABLE};
use utoipa::ToSchema;

use crate::db::types::ProfileRecord;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GithubStats {
    pub username: String,
    pub name: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub profile_url: String,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Public events per UTC day (`YYYY-MM-DD`) this year; `null` without activity.
    #[schema(value_type = Option<Object>)]
    pub contribution_data: Option<ActivityCalendar>,
    pub total_contributions: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeStats {
    pub username: String,
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    pub ranking: Option<u64>,
    pub avatar: Option<String>,
    pub real_name: Option<String>,
    pub about_me: Option<String>,
    pub location: Option<String>,
    /// Submissions per day, keyed by the day's unix timestamp in seconds.
    #[schema(value_type = Option<Object>)]
    pub submission_data: Option<ActivityCalendar>,
    pub total_submissions: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesStats {
    pub handle: String,
    /// A number, or `"Unrated"`.
    #[schema(value_type = Object)]
    pub rating: Rating,
    /// A number, or `"N/A"`.
    #[schema(value_type = Object)]
    pub max_rating: Rating,
    pub rank: String,
    pub max_rank: String,
    pub contribution: i64,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HackerrankStats {
    pub username: String,
    pub profile_url: String,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub total_solved: u32,
    pub rank: String,
}

impl HackerrankStats {
    pub fn empty(username: String, profile_url: String) -> Self {
        Self {
            username,
            profile_url,
            avatar: None,
            location: None,
            total_solved: 0,
            rank: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PlatformCard<T> {
    Ok { data: T },
    Error { code: u16, message: String },
    NotLinked,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    #[schema(value_type = Object)]
    pub github: PlatformCard<GithubStats>,
    #[schema(value_type = Object)]
    pub leetcode: PlatformCard<LeetcodeStats>,
    #[schema(value_type = Object)]
    pub codeforces: PlatformCard<CodeforcesStats>,
    #[schema(value_type = Object)]
    pub hackerrank: PlatformCard<HackerrankStats>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub firebase_uid: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio_link: Option<String>,
    pub resume_url: Option<String>,
    pub github: Option<String>,
    pub leetcode: Option<String>,
    pub codeforces: Option<String>,
    pub hackerrank: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRecord> for ProfileResponse {
    fn from(record: ProfileRecord) -> Self {
        Self {
            firebase_uid: record.firebase_uid,
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
            bio: record.bio,
            linkedin: record.linkedin,
            portfolio_link: record.portfolio_link,
            resume_url: record.resume_url,
            github: record.github,
            leetcode: record.leetcode,
            codeforces: record.codeforces,
            hackerrank: record.hackerrank,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UsernameAvailability {
    pub available: bool,
    pub message: String,
}
