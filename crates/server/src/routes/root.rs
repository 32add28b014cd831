//! Liveness endpoint

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    version: &'static str,
    status: &'static str,
}

/// GET / - Confirm the API process is up
pub async fn get() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Distributed clinical record API",
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
