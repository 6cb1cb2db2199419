use std::str::FromStr;

use rocket::{http::Status, serde::json::Json, State};
use shared::Platform;
use tracing::instrument;

use crate::{
    error::ApiError,
    stats::StatsService,
    types::{CodeforcesStats, ErrorResponse, GithubStats, HackerrankStats, LeetcodeStats},
};

#[utoipa::path(context_path = "/stats", responses(
    (status = 200, description = "GitHub profile stats and public activity", body = GithubStats),
    (status = 400, description = "Missing or invalid username", body = ErrorResponse),
    (status = 404, description = "No such GitHub user", body = ErrorResponse),
    (status = 503, description = "GitHub rate limit reached", body = ErrorResponse),
))]
#[get("/github?<username>")]
#[instrument(skip(stats))]
pub async fn get_github(
    username: Option<&str>,
    stats: &State<StatsService>,
) -> Result<Json<GithubStats>, ApiError> {
    Ok(Json(stats.lookup(stats.github(), username).await?))
}

#[utoipa::path(context_path = "/stats", responses(
    (status = 200, description = "LeetCode solved counts and submission calendar", body = LeetcodeStats),
    (status = 400, description = "Missing or invalid username", body = ErrorResponse),
    (status = 404, description = "No such LeetCode user", body = ErrorResponse),
))]
#[get("/leetcode?<username>")]
#[instrument(skip(stats))]
pub async fn get_leetcode(
    username: Option<&str>,
    stats: &State<StatsService>,
) -> Result<Json<LeetcodeStats>, ApiError> {
    Ok(Json(stats.lookup(stats.leetcode(), username).await?))
}

#[utoipa::path(context_path = "/stats", responses(
    (status = 200, description = "Codeforces rating and rank", body = CodeforcesStats),
    (status = 400, description = "Missing or invalid handle", body = ErrorResponse),
    (status = 404, description = "No such Codeforces handle", body = ErrorResponse),
))]
#[get("/codeforces?<username>")]
#[instrument(skip(stats))]
pub async fn get_codeforces(
    username: Option<&str>,
    stats: &State<StatsService>,
) -> Result<Json<CodeforcesStats>, ApiError> {
    Ok(Json(stats.lookup(stats.codeforces(), username).await?))
}

#[utoipa::path(context_path = "/stats", responses(
    (status = 200, description = "Best-effort HackerRank profile data", body = HackerrankStats),
    (status = 400, description = "Missing or invalid username", body = ErrorResponse),
    (status = 404, description = "No such HackerRank profile", body = ErrorResponse),
))]
#[get("/hackerrank?<username>")]
#[instrument(skip(stats))]
pub async fn get_hackerrank(
    username: Option<&str>,
    stats: &State<StatsService>,
) -> Result<Json<HackerrankStats>, ApiError> {
    Ok(Json(stats.lookup(stats.hackerrank(), username).await?))
}

#[utoipa::path(context_path = "/stats", responses(
    (status = 204, description = "Cached stats dropped, the next lookup calls the platform"),
    (status = 400, description = "Missing or invalid username", body = ErrorResponse),
    (status = 404, description = "Unknown platform", body = ErrorResponse),
))]
#[delete("/<platform>/cache?<username>")]
#[instrument(skip(stats))]
pub async fn delete_cached_stats(
    platform: &str,
    username: Option<&str>,
    stats: &State<StatsService>,
) -> Result<Status, ApiError> {
    let platform =
        Platform::from_str(platform).map_err(|_| ApiError::not_found("Unknown platform"))?;
    stats.invalidate(platform, username).await?;
    Ok(Status::NoContent)
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing stats entrypoints", |rocket| async {
        rocket.mount(
            "/stats",
            rocket::routes![
                get_github,
                get_leetcode,
                get_codeforces,
                get_hackerrank,
                delete_cached_stats
            ],
        )
    })
}
