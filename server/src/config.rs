use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::cache::CacheService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    Redis,
    Memory,
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Env {
    pub github_token: Option<String>,
    pub cache_mode: Option<CacheMode>,
    pub redis_url: Option<String>,
    #[serde(default)]
    pub redis_disabled: bool,
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_upstream_timeout_seconds")]
    pub upstream_timeout_seconds: u64,
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    #[serde(default = "default_leetcode_graphql_url")]
    pub leetcode_graphql_url: String,
    #[serde(default = "default_leetcode_stats_url")]
    pub leetcode_stats_url: String,
    #[serde(default = "default_codeforces_api_url")]
    pub codeforces_api_url: String,
    #[serde(default = "default_hackerrank_url")]
    pub hackerrank_url: String,
}

fn default_cache_ttl_seconds() -> u64 {
    300
}

fn default_upstream_timeout_seconds() -> u64 {
    8
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_leetcode_graphql_url() -> String {
    "https://leetcode.com/graphql".to_string()
}

fn default_leetcode_stats_url() -> String {
    "https://leetcode-stats-api.herokuapp.com".to_string()
}

fn default_codeforces_api_url() -> String {
    "https://codeforces.com/api".to_string()
}

fn default_hackerrank_url() -> String {
    "https://www.hackerrank.com".to_string()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::from_env::<Env>()?)
    }

    pub fn github_token(&self) -> Option<String> {
        non_blank(&self.github_token).map(ToString::to_string)
    }

    /// `REDIS_DISABLED` wins over everything; without an explicit mode the
    /// cache is Redis-backed only when a URL is configured.
    pub fn cache_mode(&self) -> CacheMode {
        if self.redis_disabled {
            return CacheMode::Disabled;
        }
        match self.cache_mode {
            Some(mode) => mode,
            None if non_blank(&self.redis_url).is_some() => CacheMode::Redis,
            None => CacheMode::Disabled,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Builds the configured cache. A Redis setup that cannot be created
    /// degrades to no caching instead of failing startup.
    pub fn cache(&self) -> CacheService {
        match self.cache_mode() {
            CacheMode::Disabled => CacheService::disabled(),
            CacheMode::Memory => CacheService::memory(),
            CacheMode::Redis => {
                let Some(url) = non_blank(&self.redis_url) else {
                    warn!("CACHE_MODE is redis but REDIS_URL is not set, caching disabled");
                    return CacheService::disabled();
                };
                CacheService::redis(url).unwrap_or_else(|e| {
                    warn!("Failed to set up redis cache, caching disabled: {e:#}");
                    CacheService::disabled()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Env {
        envy::from_iter::<_, Env>(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn defaults() {
        let env = env(&[]);

        assert_eq!(env.cache_ttl(), Duration::from_secs(300));
        assert_eq!(env.upstream_timeout(), Duration::from_secs(8));
        assert_eq!(env.cache_mode(), CacheMode::Disabled);
        assert_eq!(env.github_token(), None);
        assert_eq!(env.codeforces_api_url, "https://codeforces.com/api");
    }

    #[test]
    fn redis_url_enables_redis_by_default() {
        let env = env(&[("REDIS_URL", "redis://localhost:6379")]);
        assert_eq!(env.cache_mode(), CacheMode::Redis);
    }

    #[test]
    fn redis_disabled_wins() {
        let env = env(&[
            ("REDIS_URL", "redis://localhost:6379"),
            ("CACHE_MODE", "redis"),
            ("REDIS_DISABLED", "true"),
        ]);
        assert_eq!(env.cache_mode(), CacheMode::Disabled);
    }

    #[test]
    fn explicit_mode_and_overrides() {
        let env = env(&[
            ("CACHE_MODE", "memory"),
            ("CACHE_TTL_SECONDS", "60"),
            ("GITHUB_TOKEN", "  "),
            ("GITHUB_API_URL", "http://localhost:9000"),
        ]);

        assert_eq!(env.cache_mode(), CacheMode::Memory);
        assert_eq!(env.cache_ttl(), Duration::from_secs(60));
        assert_eq!(env.github_token(), None);
        assert_eq!(env.github_api_url, "http://localhost:9000");
        assert_eq!(env.cache().backend(), "memory");
    }

    #[test]
    fn redis_mode_without_url_disables_cache() {
        let env = env(&[("CACHE_MODE", "redis")]);
        assert_eq!(env.cache().backend(), "disabled");
    }
}
