use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::config;
use crate::error::ApiError;

/// Authenticated administrator context, extracted from the identity token.
///
/// Admin-only handlers take this as an argument; extraction rejects the
/// request with a 401 before the body is touched. Accepts the session
/// cookie set by login, or a Bearer token for non-browser clients.
#[derive(Clone, Debug)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthAdmin {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, email: claims.email }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let claims = auth::verify_token(&token).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            ApiError::unauthorized("Invalid or expired session")
        })?;

        Ok(AuthAdmin::from(claims))
    }
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_session_cookie(headers).or_else(|| extract_bearer_token(headers))
}

/// Pull the identity token out of the Cookie header.
fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_name = &config::config().security.session_cookie_name;
    let cookies = headers.get("cookie")?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let headers = headers_with("cookie", "theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_cookie_value_is_ignored() {
        let headers = headers_with("cookie", "token=");
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let headers = headers_with("authorization", "Bearer abc.def.ghi");
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_credentials_yield_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
