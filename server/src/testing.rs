use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rocket::{local::asynchronous::Client, Build, Rocket};

use crate::{
    api::{
        CodeforcesAdapter, GithubAdapter, HackerrankAdapter, LeetcodeAdapter, Method, Transport,
        TransportError, UpstreamRequest, UpstreamResponse,
    },
    cache::CacheService,
    db::{types::ProfileRecord, ProfileStore},
    entrypoints,
    metrics::StatsMetrics,
    stats::{Adapters, StatsService},
};

pub const GITHUB_API: &str = "https://api.github.test";
pub const LEETCODE_GRAPHQL: &str = "https://leetcode.test/graphql";
pub const LEETCODE_STATS: &str = "https://stats.leetcode.test";
pub const CODEFORCES_API: &str = "https://codeforces.test/api";
pub const HACKERRANK: &str = "https://www.hackerrank.test";

struct Route {
    method: Option<Method>,
    url: String,
    body_contains: Option<String>,
    reply: Result<UpstreamResponse, TransportError>,
}

impl Route {
    fn matches(&self, request: &UpstreamRequest) -> bool {
        if self.method.is_some_and(|method| method != request.method) || self.url != request.url {
            return false;
        }
        match &self.body_contains {
            None => true,
            Some(needle) => request
                .json
                .as_ref()
                .and_then(|body| serde_json::to_string(body).ok())
                .is_some_and(|body| body.contains(needle.as_str())),
        }
    }
}

/// Answers requests from a fixed script and records everything it was sent.
/// Requests without a matching route fail as connection errors.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(self, route: Route) -> Self {
        self.routes.lock().unwrap().push(route);
        self
    }

    pub fn on_get(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.on_response(url, UpstreamResponse::new(status, body))
    }

    pub fn on_response(self, url: impl Into<String>, response: UpstreamResponse) -> Self {
        self.route(Route {
            method: Some(Method::Get),
            url: url.into(),
            body_contains: None,
            reply: Ok(response),
        })
    }

    /// Matches POSTs whose JSON body contains `body_contains`.
    pub fn on_post(
        self,
        url: impl Into<String>,
        body_contains: &str,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.route(Route {
            method: Some(Method::Post),
            url: url.into(),
            body_contains: Some(body_contains.to_string()),
            reply: Ok(UpstreamResponse::new(status, body)),
        })
    }

    pub fn on_error(self, url: impl Into<String>, error: TransportError) -> Self {
        self.route(Route {
            method: None,
            url: url.into(),
            body_contains: None,
            reply: Err(error),
        })
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|route| route.matches(&request))
            .map(|route| route.reply.clone())
            .unwrap_or_else(|| {
                Err(TransportError::Connection(format!(
                    "no route for {:?} {}",
                    request.method, request.url
                )))
            })
    }
}

pub fn stats_service(transport: Arc<dyn Transport>, cache: CacheService) -> StatsService {
    let adapters = Adapters {
        github: GithubAdapter::new(transport.clone(), GITHUB_API, None),
        leetcode: LeetcodeAdapter::new(transport.clone(), LEETCODE_GRAPHQL, LEETCODE_STATS),
        codeforces: CodeforcesAdapter::new(transport.clone(), CODEFORCES_API),
        hackerrank: HackerrankAdapter::new(transport, HACKERRANK),
    };
    StatsService::new(
        adapters,
        cache,
        Duration::from_secs(300),
        StatsMetrics::new().unwrap(),
    )
}

#[derive(Default)]
pub struct MemoryProfiles {
    profiles: Vec<ProfileRecord>,
}

impl MemoryProfiles {
    pub fn with(mut self, profile: ProfileRecord) -> Self {
        self.profiles.push(profile);
        self
    }
}

#[async_trait]
impl ProfileStore for MemoryProfiles {
    async fn profile_by_uid(&self, firebase_uid: &str) -> anyhow::Result<Option<ProfileRecord>> {
        Ok(self
            .profiles
            .iter()
            .find(|profile| profile.firebase_uid == firebase_uid)
            .cloned())
    }

    async fn profile_by_username(&self, username: &str) -> anyhow::Result<Option<ProfileRecord>> {
        Ok(self
            .profiles
            .iter()
            .find(|profile| profile.username.eq_ignore_ascii_case(username))
            .cloned())
    }
}

pub fn profile(firebase_uid: &str, username: &str) -> ProfileRecord {
    let created_at = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
    ProfileRecord {
        firebase_uid: firebase_uid.to_string(),
        username: username.to_string(),
        first_name: "Jane".to_string(),
        last_name: None,
        bio: None,
        linkedin: None,
        portfolio_link: None,
        resume_url: None,
        github: None,
        leetcode: None,
        codeforces: None,
        hackerrank: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn rocket(service: StatsService, profiles: MemoryProfiles) -> Rocket<Build> {
    let profiles: Arc<dyn ProfileStore> = Arc::new(profiles);
    rocket::build()
        .manage(service)
        .manage(profiles)
        .attach(entrypoints::stage())
}

pub async fn client(transport: Arc<FakeTransport>, profiles: MemoryProfiles) -> Client {
    let service = stats_service(transport, CacheService::memory());
    Client::tracked(rocket(service, profiles)).await.unwrap()
}
