//! hcd-server library crate
//!
//! HTTP surface of the clinical record middleware. `main.rs` wires the
//! Postgres store and the FHIR client into [`build_app`]; tests pass their
//! own [`state::AppState`] instead.

pub mod auth;
pub mod config;
pub mod db;
mod error;
mod extract;
pub mod fhir;
mod middleware;
mod routes;
pub mod state;

use std::sync::OnceLock;

use axum::{Extension, Router, http::HeaderValue, middleware as axum_mw};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenService;
use config::Config;
use state::AppState;

pub use error::AppError;

/// Handle of the process-wide Prometheus recorder, installed on first use.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("Metrics recorder already installed");
            }
            handle
        })
        .clone()
}

/// `*` anywhere in the list allows every origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Assemble routes and middleware around `state`.
///
/// Request flow, outermost first: metrics, tracing, CORS, request id,
/// audit; protected routes then pass the rate limiter and the bearer check.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let tokens = TokenService::new(&config.auth);
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    let protected = routes::protected_routes()
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(Extension(tokens.clone()))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    let public = routes::public_routes()
        .layer(Extension(prometheus_handle()))
        .layer(Extension(tokens));

    public
        .merge(protected)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
