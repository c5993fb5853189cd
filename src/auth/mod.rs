use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// Cookie carrying the identity token between the web client and the API.
pub const TOKEN_COOKIE: &str = "token";

/// Signed identity assertion. The payload is whatever was asserted at
/// sign-in; minimally the caller's email, optionally a role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: String, role: Option<String>) -> Self {
        let now = Utc::now();
        let ttl = config::config().security.token_ttl_secs;
        Self {
            email,
            role,
            exp: (now + Duration::seconds(ttl)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Sign `claims` with the configured secret.
pub fn issue_token(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.token_secret;

    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature and expiry, returning the original claims.
pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.token_secret;

    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let mut validation = Validation::default();
    // The expiry embedded at issuance is the contract; no grace window
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

    Ok(token_data.claims)
}

/// `Set-Cookie` value delivering a freshly issued token. The API and the web
/// client are served from different origins, so the cookie must be
/// script-inaccessible, HTTPS-only and cross-site-sendable.
pub fn session_cookie(token: &str) -> String {
    let ttl = config::config().security.token_ttl_secs;
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=None",
        TOKEN_COOKIE, token, ttl
    )
}

/// `Set-Cookie` value clearing the session. Attributes must match the ones
/// used at issuance or browsers keep the original cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=None", TOKEN_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_for(email: &str) -> Claims {
        Claims::new(email.to_string(), None)
    }

    #[test]
    fn verify_returns_original_identity_within_expiry() {
        let claims = claims_for("reader@example.com");
        let token = issue_token(&claims).unwrap();
        let decoded = verify_token(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn role_claim_round_trips() {
        let claims = Claims::new("admin@example.com".to_string(), Some("admin".to_string()));
        let token = issue_token(&claims).unwrap();
        assert_eq!(verify_token(&token).unwrap().role.as_deref(), Some("admin"));
    }

    #[test]
    fn expiry_is_one_hour_from_issuance() {
        let claims = claims_for("reader@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: "late@example.com".to_string(),
            role: None,
            exp: now - 120,
            iat: now - 3720,
        };
        let token = issue_token(&claims).unwrap();
        assert!(matches!(verify_token(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let token = issue_token(&claims_for("reader@example.com")).unwrap();
        let mut corrupted = token.clone();
        corrupted.truncate(token.len() - 2);
        assert!(matches!(verify_token(&corrupted), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(verify_token("not-a-token"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn session_cookie_carries_cross_site_attributes() {
        let cookie = session_cookie("abc");
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn clearing_cookie_matches_issuance_attributes() {
        let cookie = clear_session_cookie();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
    }
}
