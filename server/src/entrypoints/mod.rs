use rocket::fairing::AdHoc;
use utoipa::OpenApi;

use crate::types::{
    CodeforcesStats, DashboardResponse, ErrorResponse, GithubStats, HackerrankStats,
    LeetcodeStats, ProfileResponse, UsernameAvailability,
};

pub mod profiles;
pub mod stats;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DevProfile Hub API",
        description = "Normalized coding-platform stats for developer profiles"
    ),
    paths(
        stats::get_github,
        stats::get_leetcode,
        stats::get_codeforces,
        stats::get_hackerrank,
        stats::delete_cached_stats,
        profiles::get_profile,
        profiles::get_profile_stats,
        profiles::get_public_profile,
        profiles::get_username_availability,
    ),
    components(schemas(
        GithubStats,
        LeetcodeStats,
        CodeforcesStats,
        HackerrankStats,
        DashboardResponse,
        ProfileResponse,
        UsernameAvailability,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

#[get("/")]
fn health() -> &'static str {
    "DevProfile Hub stats server is running"
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .mount("/", routes![health])
            .attach(stats::stage())
            .attach(profiles::stage())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rocket::http::Status;

    use super::*;
    use crate::testing::{self, FakeTransport, MemoryProfiles};

    #[tokio::test]
    async fn health_check() {
        let client = testing::client(Arc::new(FakeTransport::new()), MemoryProfiles::default()).await;

        let response = client.get("/").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.into_string().await.as_deref(),
            Some("DevProfile Hub stats server is running")
        );
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        for path in [
            "/stats/github",
            "/stats/leetcode",
            "/stats/codeforces",
            "/stats/hackerrank",
            "/stats/{platform}/cache",
            "/profiles/{firebase_uid}",
            "/profiles/{firebase_uid}/stats",
            "/usernames/{username}",
            "/usernames/{username}/availability",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
