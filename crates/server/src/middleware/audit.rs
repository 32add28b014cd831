//! Audit trail for state-changing calls
//!
//! Token issuance and FHIR writes are recorded under the `audit` tracing
//! target, one event per request, after the handler has answered.

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::auth::AuthenticatedSubject;
use super::request_id::RequestId;

fn is_mutation(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    if !is_mutation(request.method()) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request.extensions().get::<RequestId>().cloned();

    let response = next.run(request).await;

    // Set by the auth layer once the bearer token checked out
    let subject = response.extensions().get::<AuthenticatedSubject>();
    tracing::info!(
        target: "audit",
        request_id = request_id.as_ref().map_or("-", |r| r.0.as_str()),
        subject = subject.map_or("anonymous", |s| s.0.as_str()),
        %method,
        %path,
        status = response.status().as_u16(),
        "Patient data mutation"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_writes_are_audited() {
        assert!(is_mutation(&Method::POST));
        assert!(is_mutation(&Method::PUT));
        assert!(!is_mutation(&Method::GET));
        assert!(!is_mutation(&Method::OPTIONS));
    }
}
