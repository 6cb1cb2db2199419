use std::sync::Arc;

use async_trait::async_trait;
use rocket::{
    fairing::{self, AdHoc},
    Build, Rocket,
};
use rocket_db_pools::Database;
use sqlx::PgPool;

#[derive(Database, Clone, Debug)]
#[database("devprofile")]
pub struct DB(PgPool);

pub mod types;

use types::ProfileRecord;

const PROFILE_COLUMNS: &str = r#"
    firebase_uid, username, first_name, last_name, bio, linkedin,
    portfolio_link, resume_url, github, leetcode, codeforces, hackerrank,
    created_at, updated_at
"#;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile_by_uid(&self, firebase_uid: &str) -> anyhow::Result<Option<ProfileRecord>>;

    /// Usernames are matched case-insensitively.
    async fn profile_by_username(&self, username: &str) -> anyhow::Result<Option<ProfileRecord>>;

    async fn username_taken(&self, username: &str) -> anyhow::Result<bool> {
        Ok(self.profile_by_username(username).await?.is_some())
    }
}

#[async_trait]
impl ProfileStore for DB {
    async fn profile_by_uid(&self, firebase_uid: &str) -> anyhow::Result<Option<ProfileRecord>> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE firebase_uid = $1"
        ))
        .bind(firebase_uid)
        .fetch_optional(&self.0)
        .await?;

        Ok(record)
    }

    async fn profile_by_username(&self, username: &str) -> anyhow::Result<Option<ProfileRecord>> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = lower($1)"
        ))
        .bind(username)
        .fetch_optional(&self.0)
        .await?;

        Ok(record)
    }

    async fn username_taken(&self, username: &str) -> anyhow::Result<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE username = lower($1))")
                .bind(username)
                .fetch_one(&self.0)
                .await?;

        Ok(taken)
    }
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => match sqlx::migrate!("./migrations").run(&**db).await {
            Ok(_) => Ok(rocket),
            Err(e) => {
                rocket::error!("Failed to initialize SQLx database: {}", e);
                Err(rocket)
            }
        },
        None => Err(rocket),
    }
}

async fn manage_profile_store(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => {
            let store: Arc<dyn ProfileStore> = Arc::new(db.clone());
            Ok(rocket.manage(store))
        }
        None => Err(rocket),
    }
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket
            .attach(DB::init())
            .attach(AdHoc::try_on_ignite("SQLx Migrations", run_migrations))
            .attach(AdHoc::try_on_ignite("Profile store", manage_profile_store))
    })
}
