//! Request metrics
//!
//! Every request feeds `hcd_http_requests_total` and
//! `hcd_http_request_duration_seconds`. Rejected credentials additionally
//! count towards `hcd_auth_rejections_total`.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

/// Label for requests that matched no route.
const UNMATCHED: &str = "unmatched";

/// Route template (`/paciente/{id}`) when the router matched one.
///
/// Raw paths never become labels, so cardinality stays bounded by the
/// route table.
fn route_label(matched: Option<&MatchedPath>) -> String {
    matched.map_or(UNMATCHED, MatchedPath::as_str).to_owned()
}

fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

fn record(method: &Method, route: String, status: StatusCode, seconds: f64) {
    let method = method_label(method);

    metrics::counter!(
        "hcd_http_requests_total",
        "method" => method,
        "route" => route.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!(
        "hcd_http_request_duration_seconds",
        "method" => method,
        "route" => route.clone()
    )
    .record(seconds);

    if status == StatusCode::UNAUTHORIZED {
        metrics::counter!("hcd_auth_rejections_total", "route" => route).increment(1);
    }
}

pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = route_label(request.extensions().get::<MatchedPath>());
    let started = Instant::now();

    let response = next.run(request).await;
    record(&method, route, response.status(), started.elapsed().as_secs_f64());
    response
}
