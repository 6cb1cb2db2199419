use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::PlatformLinks;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProfileRecord {
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

impl ProfileRecord {
    pub fn platform_links(&self) -> PlatformLinks {
        PlatformLinks {
            github: self.github.clone(),
            leetcode: self.leetcode.clone(),
            codeforces: self.codeforces.clone(),
            hackerrank: self.hackerrank.clone(),
        }
    }
}
