use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::{self, models::Admin};
use crate::error::{ApiError, FieldError};

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/register - create an administrator account.
/// The password is bcrypt-hashed before storage and never returned.
pub async fn register(Json(payload): Json<RegisterRequest>) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if !auth::is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let pool = database::pool()?;

    // Stored lowercase so the byte-wise unique constraint matches the
    // case-insensitive login lookup
    let email = payload.email.trim().to_lowercase();

    // bcrypt is CPU-bound; keep the async executor free
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!("hash task panicked: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })?
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })?;

    let row: Result<(Uuid, String), sqlx::Error> = sqlx::query_as(
        "INSERT INTO admins (email, password_hash) VALUES ($1, $2) RETURNING id, email",
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool.as_ref())
    .await;

    match row {
        Ok((id, email)) => {
            tracing::info!("administrator registered: {}", email);
            Ok((StatusCode::OK, Json(json!({ "id": id, "email": email }))))
        }
        Err(e) if database::is_unique_violation(&e) => Err(ApiError::validation(
            "Validation failed",
            vec![FieldError::new("email", "Email already registered")],
        )),
        Err(e) => Err(database::DatabaseError::from(e).into()),
    }
}

/// POST /api/auth/login - verify credentials and set the session cookie.
///
/// Unknown email and wrong password return the identical generic 401 so
/// the response does not reveal which one failed. The token travels only
/// in the cookie, never in the body.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if !auth::is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }
    if payload.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let pool = database::pool()?;

    let admin: Option<Admin> =
        sqlx::query_as("SELECT * FROM admins WHERE LOWER(email) = LOWER($1)")
            .bind(&payload.email)
            .fetch_optional(pool.as_ref())
            .await
            .map_err(database::DatabaseError::from)?;

    let Some(admin) = admin else {
        tracing::warn!("login attempt for unknown email");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    // bcrypt::verify is constant-time; run it off the async executor
    let password = payload.password;
    let hash = admin.password_hash.clone();
    let password_ok = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .unwrap_or(false);

    if !password_ok {
        tracing::warn!("failed login attempt for: {}", admin.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = auth::generate_token(Claims::new(admin.id, admin.email.clone())).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal_server_error("Failed to create session")
    })?;

    tracing::info!("administrator logged in: {}", admin.email);

    Ok((
        AppendHeaders([(SET_COOKIE, auth::session_cookie(&token))]),
        Json(json!({ "success": true, "message": "Logged in" })),
    ))
}

/// POST /api/auth/logout - clear the session cookie. Always succeeds;
/// no store interaction.
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, auth::clear_session_cookie())]),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    fn auth_router() -> Router {
        Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: serde_json::Value,
    ) -> (StatusCode, axum::http::HeaderMap, axum::body::Bytes) {
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes)
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let (status, _, bytes) = post_json(
            auth_router(),
            "/api/auth/register",
            json!({ "email": "a@b.com", "password": "abc" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errors"][0]["field"], "password");
    }

    #[tokio::test]
    async fn register_rejects_malformed_email() {
        let (status, _, bytes) = post_json(
            auth_router(),
            "/api/auth/register",
            json!({ "email": "not-an-email", "password": "abcdef" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn register_collects_all_field_errors() {
        let (status, _, bytes) =
            post_json(auth_router(), "/api/auth/register", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn login_requires_password() {
        let (status, _, bytes) = post_json(
            auth_router(),
            "/api/auth/login",
            json!({ "email": "a@b.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errors"][0]["field"], "password");
    }

    #[tokio::test]
    async fn login_without_database_degrades_to_503() {
        let (status, _, _) = post_json(
            auth_router(),
            "/api/auth/login",
            json!({ "email": "a@b.com", "password": "abcdef" }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn logout_clears_cookie_unconditionally() {
        let (status, headers, bytes) =
            post_json(auth_router(), "/api/auth/logout", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
    }
}
