use axum::http::{HeaderMap, header};

use super::AuthError;

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. No cryptographic work happens
/// here; the returned token still has to go through [`super::TokenService::verify`].
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
