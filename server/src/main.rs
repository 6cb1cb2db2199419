#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_prometheus::PrometheusMetrics;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use devprofile_server::{
    api::ReqwestTransport,
    config::Env,
    db,
    entrypoints::{self, ApiDoc},
    metrics::StatsMetrics,
    stats::{Adapters, StatsService},
};

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = Env::from_env().expect("Failed to load environment variables");
    let transport = Arc::new(
        ReqwestTransport::new(env.upstream_timeout()).expect("Failed to create HTTP client"),
    );

    let cache = env.cache();
    tracing::info!(
        "Stats cache: {} (ttl {}s)",
        cache.backend(),
        env.cache_ttl_seconds
    );

    let prometheus = PrometheusMetrics::new();
    let metrics = StatsMetrics::new().expect("Failed to create stats metrics");
    metrics
        .register(prometheus.registry())
        .expect("Failed to register stats metrics");

    let stats = StatsService::new(
        Adapters::from_env(transport, &env),
        cache,
        env.cache_ttl(),
        metrics,
    );

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![rocket::http::Method::Get]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .to_cors()
        .expect("Failed to create CORS options");

    rocket::build()
        .attach(prometheus.clone())
        .attach(cors)
        .manage(stats)
        .attach(db::stage())
        .attach(entrypoints::stage())
        .mount("/metrics", prometheus)
        .mount(
            "/",
            SwaggerUi::new("/swagger-ui/<_..>").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
}
