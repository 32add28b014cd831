//! Bearer token authentication middleware

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{TokenService, extract_bearer};
use crate::error::AppError;

/// Subject recorded on the response for the audit log.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject(pub String);

/// Reject the request with 401 unless it carries a valid bearer token.
///
/// On success the verified [`crate::auth::Claims`] are inserted into the
/// request extensions for handlers to pick up.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(tokens) = request.extensions().get::<TokenService>().cloned() else {
        return AppError::Internal("Token service not configured".into()).into_response();
    };

    let claims = match extract_bearer(request.headers()).and_then(|token| tokens.verify(token)) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = %err,
                "Rejected unauthenticated request"
            );
            return AppError::from(err).into_response();
        }
    };

    let subject = AuthenticatedSubject(claims.claims.sub.clone());
    request.extensions_mut().insert(claims);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(subject);
    response
}
