use axum::response::Response;
use serde::Serialize;

use crate::core::http::response_envelope::ApiResponse;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_route() -> Response {
    ApiResponse::ok(HealthResponse { status: "ok" })
}
