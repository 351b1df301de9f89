pub mod auth;
pub mod config;
pub mod database;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod mailer;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Configure CORS from the origins in config.
fn configure_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn app() -> Router {
    Router::new()
        // Service descriptor and liveness
        .route("/", get(root))
        .route("/health", get(health))
        // Auth guard
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Projects: public reads, admin mutations
        .route(
            "/api/projects",
            get(handlers::projects::list).post(handlers::projects::create),
        )
        .route(
            "/api/projects/:id",
            get(handlers::projects::get)
                .put(handlers::projects::update)
                .delete(handlers::projects::delete),
        )
        // Skills
        .route(
            "/api/skills",
            get(handlers::skills::list).post(handlers::skills::create),
        )
        .route(
            "/api/skills/:id",
            put(handlers::skills::update).delete(handlers::skills::delete),
        )
        // Writings: publication-gated public reads, admin management
        .route(
            "/api/writings",
            get(handlers::writings::list_published).post(handlers::writings::create),
        )
        .route("/api/writings/admin/all", get(handlers::writings::list_all))
        .route(
            "/api/writings/:slug",
            get(handlers::writings::get_published)
                .put(handlers::writings::update)
                .delete(handlers::writings::delete),
        )
        // Contact form and admin inbox
        .route("/api/contact", post(handlers::contact::submit))
        .route("/api/contact/messages", get(handlers::contact::list))
        .route(
            "/api/contact/messages/:id",
            put(handlers::contact::update_status),
        )
        // Singleton contact info
        .route(
            "/api/contact-info",
            get(handlers::contact_info::get)
                .post(handlers::contact_info::upsert)
                .put(handlers::contact_info::upsert),
        )
        .route(
            "/api/contact-info/:id",
            post(handlers::contact_info::upsert_by_id).put(handlers::contact_info::upsert_by_id),
        )
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(
            config::config().server.max_request_size_bytes,
        ))
        .layer(configure_cors())
}

/// Run the server (used by main).
pub async fn run() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("starting portfolio API in {:?} mode", config.environment);

    // Data routes answer 503 until a pool exists, so a missing database is
    // a degraded start rather than a refusal to boot.
    if let Err(e) = database::init_pool().await {
        tracing::warn!("database unavailable at startup: {}", e);
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);
    axum::serve(listener, app()).await.expect("server");
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "portfolio-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth/register, /api/auth/login, /api/auth/logout",
            "projects": "/api/projects[/:id]",
            "skills": "/api/skills[/:id]",
            "writings": "/api/writings[/:slug], /api/writings/admin/all",
            "contact": "/api/contact, /api/contact/messages[/:id]",
            "contact_info": "/api/contact-info",
            "health": "/health",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database": e.to_string(),
            })),
        ),
    }
}
