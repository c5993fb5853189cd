use axum::{
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{clear_session_cookie, issue_token, session_cookie, Claims};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /jwt - sign the asserted identity into the session cookie. The
/// assertion is taken at face value here; what the token buys is checked
/// per request by the guard and the ownership predicate.
pub async fn jwt(Json(payload): Json<TokenRequest>) -> ApiResult<impl IntoResponse> {
    let claims = Claims::new(payload.email, payload.role);
    let token = issue_token(&claims)?;

    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token))]),
        Json(json!({ "success": true })),
    ))
}

/// POST /logout - clear the session cookie
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Json(json!({ "success": true })),
    )
}
