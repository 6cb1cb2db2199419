use std::sync::Arc;

use rocket::{http::Status, serde::json::Json, State};
use shared::{PublicUsername, UsernameError};
use tracing::{error, instrument};

use crate::{
    db::{types::ProfileRecord, ProfileStore},
    error::ApiError,
    stats::StatsService,
    types::{DashboardResponse, ErrorResponse, ProfileResponse, UsernameAvailability},
};

fn found(
    result: anyhow::Result<Option<ProfileRecord>>,
    lookup: &str,
) -> Result<ProfileRecord, ApiError> {
    match result {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Err(ApiError::not_found("Profile not found")),
        Err(e) => {
            error!("Failed to load profile {lookup}: {e:#}");
            Err(ApiError::internal())
        }
    }
}

#[utoipa::path(responses(
    (status = 200, description = "Profile of the account", body = ProfileResponse),
    (status = 404, description = "No profile for this account", body = ErrorResponse),
))]
#[get("/profiles/<firebase_uid>")]
#[instrument(skip(profiles))]
pub async fn get_profile(
    firebase_uid: &str,
    profiles: &State<Arc<dyn ProfileStore>>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = found(profiles.profile_by_uid(firebase_uid).await, firebase_uid)?;
    Ok(Json(profile.into()))
}

#[utoipa::path(responses(
    (status = 200, description = "Stats of every platform linked by the account", body = DashboardResponse),
    (status = 404, description = "No profile for this account", body = ErrorResponse),
))]
#[get("/profiles/<firebase_uid>/stats")]
#[instrument(skip(profiles, stats))]
pub async fn get_profile_stats(
    firebase_uid: &str,
    profiles: &State<Arc<dyn ProfileStore>>,
    stats: &State<StatsService>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let profile = found(profiles.profile_by_uid(firebase_uid).await, firebase_uid)?;
    Ok(Json(stats.dashboard(&profile.platform_links()).await))
}

#[utoipa::path(responses(
    (status = 200, description = "Public profile by site username", body = ProfileResponse),
    (status = 404, description = "Username is not registered", body = ErrorResponse),
))]
#[get("/usernames/<username>")]
#[instrument(skip(profiles))]
pub async fn get_public_profile(
    username: &str,
    profiles: &State<Arc<dyn ProfileStore>>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = found(profiles.profile_by_username(username.trim()).await, username)?;
    Ok(Json(profile.into()))
}

fn rejection(error: &UsernameError) -> &'static str {
    match error {
        UsernameError::Empty => "Username is required",
        UsernameError::InvalidCharacter(_) => {
            "Username can only contain letters, numbers, dots, and underscores"
        }
        UsernameError::TooShort(_) | UsernameError::TooLong(_) => {
            "Username must be between 3 and 30 characters"
        }
    }
}

fn availability(available: bool, message: &str) -> Json<UsernameAvailability> {
    Json(UsernameAvailability {
        available,
        message: message.to_string(),
    })
}

#[utoipa::path(responses(
    (status = 200, description = "Whether the username can be registered", body = UsernameAvailability),
    (status = 400, description = "Username breaks the naming rules", body = UsernameAvailability),
))]
#[get("/usernames/<username>/availability")]
#[instrument(skip(profiles))]
pub async fn get_username_availability(
    username: &str,
    profiles: &State<Arc<dyn ProfileStore>>,
) -> Result<(Status, Json<UsernameAvailability>), ApiError> {
    let username = match PublicUsername::parse(username) {
        Ok(username) => username,
        Err(e) => return Ok((Status::BadRequest, availability(false, rejection(&e)))),
    };

    match profiles.username_taken(username.as_str()).await {
        Ok(true) => Ok((Status::Ok, availability(false, "Username is already taken"))),
        Ok(false) => Ok((Status::Ok, availability(true, "Username is available"))),
        Err(e) => {
            error!("Failed to check username {username}: {e:#}");
            Err(ApiError::internal())
        }
    }
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing profile entrypoints", |rocket| async {
        rocket.mount(
            "/",
            rocket::routes![
                get_profile,
                get_profile_stats,
                get_public_profile,
                get_username_availability
            ],
        )
    })
}
