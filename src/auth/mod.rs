pub mod guard;

pub use guard::AuthAdmin;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Identity token payload for an authenticated administrator.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(admin_id: Uuid, email: String) -> Self {
        let now = Utc::now();
        let expiry_days = config::config().security.session_expiry_days;
        Self {
            sub: admin_id,
            email,
            exp: (now + Duration::days(expiry_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Generation(String),
    Invalid(String),
    MissingSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Generation(msg) => write!(f, "token generation error: {}", msg),
            TokenError::Invalid(msg) => write!(f, "invalid token: {}", msg),
            TokenError::MissingSecret => write!(f, "JWT secret not configured"),
        }
    }
}

impl std::error::Error for TokenError {}

pub fn generate_token(claims: Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// Build the Set-Cookie value carrying the identity token.
/// Http-only and SameSite=Lax; Max-Age matches the token expiry.
pub fn session_cookie(token: &str) -> String {
    let security = &config::config().security;
    let max_age = security.session_expiry_days * 24 * 60 * 60;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        security.session_cookie_name, token, max_age
    )
}

/// Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    let name = &config::config().security.session_cookie_name;
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

/// Hash a password with bcrypt. Intentionally CPU-intensive; callers run
/// it under spawn_blocking so the async executor stays free.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

/// Verify a password against a stored bcrypt hash. bcrypt's verify is a
/// constant-time comparison; do not replace it with string equality.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Minimal address check shared by registration, login, and the contact form.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
