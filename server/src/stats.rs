use std::{sync::Arc, time::Duration};

use shared::{Platform, PlatformLinks, PlatformUsername};
use tracing::{debug, instrument};

use crate::{
    api::{
        CodeforcesAdapter, GithubAdapter, HackerrankAdapter, LeetcodeAdapter, StatsAdapter,
        Transport,
    },
    cache::CacheService,
    config::Env,
    error::StatsError,
    metrics::StatsMetrics,
    types::{DashboardResponse, PlatformCard},
};

pub struct Adapters {
    pub github: GithubAdapter,
    pub leetcode: LeetcodeAdapter,
    pub codeforces: CodeforcesAdapter,
    pub hackerrank: HackerrankAdapter,
}

impl Adapters {
    pub fn from_env(transport: Arc<dyn Transport>, env: &Env) -> Self {
        Self {
            github: GithubAdapter::new(transport.clone(), &env.github_api_url, env.github_token()),
            leetcode: LeetcodeAdapter::new(
                transport.clone(),
                &env.leetcode_graphql_url,
                &env.leetcode_stats_url,
            ),
            codeforces: CodeforcesAdapter::new(transport.clone(), &env.codeforces_api_url),
            hackerrank: HackerrankAdapter::new(transport, &env.hackerrank_url),
        }
    }
}

fn parse_username(platform: Platform, username: Option<&str>) -> Result<PlatformUsername, StatsError> {
    PlatformUsername::parse(username.unwrap_or_default())
        .map_err(|source| StatsError::InvalidInput { platform, source })
}

pub struct StatsService {
    adapters: Adapters,
    cache: CacheService,
    ttl: Duration,
    metrics: StatsMetrics,
}

impl StatsService {
    pub fn new(adapters: Adapters, cache: CacheService, ttl: Duration, metrics: StatsMetrics) -> Self {
        Self {
            adapters,
            cache,
            ttl,
            metrics,
        }
    }

    pub fn github(&self) -> &GithubAdapter {
        &self.adapters.github
    }

    pub fn leetcode(&self) -> &LeetcodeAdapter {
        &self.adapters.leetcode
    }

    pub fn codeforces(&self) -> &CodeforcesAdapter {
        &self.adapters.codeforces
    }

    pub fn hackerrank(&self) -> &HackerrankAdapter {
        &self.adapters.hackerrank
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Validates the username, serves a cached record when one is live and
    /// otherwise calls the adapter. Only successful records are cached.
    #[instrument(skip(self, adapter), fields(platform = %adapter.platform()))]
    pub async fn lookup<A: StatsAdapter>(
        &self,
        adapter: &A,
        username: Option<&str>,
    ) -> Result<A::Record, StatsError> {
        let platform = adapter.platform();
        let username = parse_username(platform, username)?;
        let key = platform.stats_key(username.as_str());

        if let Some(record) = self.cache.get_json::<A::Record>(&key).await {
            debug!("Serving {key} from cache");
            self.metrics.cache_hit(platform);
            return Ok(record);
        }
        self.metrics.cache_miss(platform);

        match adapter.fetch_stats(&username).await {
            Ok(record) => {
                self.cache.set_json(&key, &record, self.ttl).await;
                Ok(record)
            }
            Err(e) => {
                self.metrics.lookup_failed(platform, &e);
                Err(e)
            }
        }
    }

    pub async fn invalidate(
        &self,
        platform: Platform,
        username: Option<&str>,
    ) -> Result<bool, StatsError> {
        let username = parse_username(platform, username)?;
        Ok(self.cache.del(&platform.stats_key(username.as_str())).await)
    }

    async fn card<A: StatsAdapter>(
        &self,
        adapter: &A,
        username: Option<&str>,
    ) -> PlatformCard<A::Record> {
        let Some(username) = username else {
            return PlatformCard::NotLinked;
        };
        match self.lookup(adapter, Some(username)).await {
            Ok(data) => PlatformCard::Ok { data },
            Err(e) => PlatformCard::Error {
                code: e.status().code,
                message: e.public_message(),
            },
        }
    }

    #[instrument(skip_all)]
    pub async fn dashboard(&self, links: &PlatformLinks) -> DashboardResponse {
        let (github, leetcode, codeforces, hackerrank) = futures::join!(
            self.card(self.github(), links.get(Platform::Github)),
            self.card(self.leetcode(), links.get(Platform::Leetcode)),
            self.card(self.codeforces(), links.get(Platform::Codeforces)),
            self.card(self.hackerrank(), links.get(Platform::Hackerrank)),
        );

        DashboardResponse {
            github,
            leetcode,
            codeforces,
            hackerrank,
        }
    }
}
