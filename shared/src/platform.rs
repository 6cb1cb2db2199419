use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Github,
    Leetcode,
    Codeforces,
    Hackerrank,
}

impl Platform {
    /// Human readable name, as the platform spells itself.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Github => "GitHub",
            Platform::Leetcode => "LeetCode",
            Platform::Codeforces => "Codeforces",
            Platform::Hackerrank => "HackerRank",
        }
    }

    /// Cache key for a platform's stats record. Each platform owns its own
    /// namespace so equal usernames on different platforms never collide.
    pub fn stats_key(&self, username: &str) -> String {
        format!("{}:stats:{}", self.as_ref(), username)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
