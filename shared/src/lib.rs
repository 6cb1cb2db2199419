use serde::{Deserialize, Serialize};

mod calendar;
mod platform;
mod rating;
mod username;

pub use calendar::*;
pub use platform::*;
pub use rating::*;
pub use username::*;

/// Usernames a profile links on each external platform. Blank values mean the
/// platform is not linked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLinks {
    pub github: Option<String>,
    pub leetcode: Option<String>,
    pub codeforces: Option<String>,
    pub hackerrank: Option<String>,
}

impl PlatformLinks {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        let value = match platform {
            Platform::Github => &self.github,
            Platform::Leetcode => &self.leetcode,
            Platform::Codeforces => &self.codeforces,
            Platform::Hackerrank => &self.hackerrank,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_links_are_not_linked() {
        let links = PlatformLinks {
            github: Some("octocat".to_string()),
            leetcode: Some("   ".to_string()),
            codeforces: None,
            hackerrank: Some(String::new()),
        };

        assert_eq!(links.get(Platform::Github), Some("octocat"));
        assert_eq!(links.get(Platform::Leetcode), None);
        assert_eq!(links.get(Platform::Codeforces), None);
        assert_eq!(links.get(Platform::Hackerrank), None);
    }
}
