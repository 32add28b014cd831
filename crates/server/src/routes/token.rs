//! Login and current-user endpoints

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{Claims, TokenService, authenticate};
use crate::error::AppError;
use crate::extract;

/// Login body
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /token - Exchange demo credentials for a bearer token
pub async fn login(
    Extension(tokens): Extension<TokenService>,
    extract::Json(auth): extract::Json<AuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let claims = authenticate(&auth.username, &auth.password).map_err(|e| {
        tracing::warn!(username = %auth.username, "Login rejected");
        e
    })?;

    let issued = tokens.issue(claims)?;
    tracing::info!(username = %auth.username, expires_at = %issued.expires_at, "Issued access token");

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer",
        expires_in: issued.ttl.num_seconds(),
    }))
}

/// GET /me - Claims of the authenticated caller
pub async fn me(Extension(claims): Extension<Claims>) -> Json<Claims> {
    Json(claims)
}
