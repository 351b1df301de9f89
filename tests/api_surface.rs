//! Router-level tests over the in-process app. These run without a
//! database: data routes degrade to 503, while validation and the auth
//! guard are exercised fully.

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use portfolio_api::app;

async fn send(req: Request<Body>) -> Result<(StatusCode, axum::http::HeaderMap, Value)> {
    let res = app().oneshot(req).await?;
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, headers, body))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_cookie() -> String {
    let token = portfolio_api::auth::generate_token(portfolio_api::auth::Claims::new(
        uuid::Uuid::new_v4(),
        "admin@test.com".to_string(),
    ))
    .unwrap();
    format!("token={}", token)
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let (status, _, body) = send(Request::get("/").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "portfolio-api");
    Ok(())
}

#[tokio::test]
async fn health_reports_degraded_without_database() -> Result<()> {
    let (status, _, body) = send(Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let (status, _, _) = send(Request::get("/api/nope").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn register_validation_creates_nothing_and_reports_fields() -> Result<()> {
    let (status, _, body) = send(post_json(
        "/api/auth/register",
        json!({ "email": "bad", "password": "abc" }),
    ))
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
    Ok(())
}

#[tokio::test]
async fn admin_mutations_require_a_session() -> Result<()> {
    let cases = [
        post_json("/api/projects", json!({ "title": "X", "description": "Y" })),
        post_json("/api/skills", json!({ "name": "Rust" })),
        post_json("/api/writings", json!({ "title": "T", "slug": "t", "content": "C" })),
        post_json("/api/contact-info", json!({ "email": "me@example.com" })),
        Request::get("/api/writings/admin/all").body(Body::empty())?,
        Request::get("/api/contact/messages").body(Body::empty())?,
        Request::delete(format!("/api/projects/{}", uuid::Uuid::new_v4()))
            .body(Body::empty())?,
    ];

    for req in cases {
        let uri = req.uri().clone();
        let (status, _, body) = send(req).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "expected 401 for {}", uri);
        assert_eq!(body["message"], "Authentication required");
    }
    Ok(())
}

#[tokio::test]
async fn forged_token_is_rejected() -> Result<()> {
    let req = Request::get("/api/writings/admin/all")
        .header(header::COOKIE, "token=forged.token.value")
        .body(Body::empty())?;
    let (status, _, body) = send(req).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired session");
    Ok(())
}

#[tokio::test]
async fn valid_session_passes_the_guard() -> Result<()> {
    // No database behind the handler, so a signed session reaches the
    // store and gets a 503 rather than a 401.
    let req = Request::get("/api/writings/admin/all")
        .header(header::COOKIE, admin_cookie())
        .body(Body::empty())?;
    let (status, _, _) = send(req).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn public_reads_do_not_need_credentials() -> Result<()> {
    // 503 (no database), never 401
    for uri in [
        "/api/projects",
        "/api/skills",
        "/api/writings",
        "/api/contact-info",
    ] {
        let (status, _, _) = send(Request::get(uri).body(Body::empty())?).await?;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "unexpected status for {}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn contact_submission_validates_before_touching_the_store() -> Result<()> {
    let (status, _, body) = send(post_json(
        "/api/contact",
        json!({ "name": "", "email": "nope", "message": "" }),
    ))
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_session_cookie() -> Result<()> {
    let (status, headers, body) = send(post_json("/api/auth/logout", json!({}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));
    Ok(())
}
