use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::State, response::Response};
use searcher::STRUCTURAL_SEARCH_COUNTER;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

/// One counter with its per-language values.
#[derive(Serialize)]
pub struct MetricsResponse {
    pub name: &'static str,
    pub label: &'static str,
    pub values: BTreeMap<String, u64>,
}

/// Snapshot of the structural search counter.
pub async fn metrics_route(State(state): State<Arc<AppState>>) -> Response {
    ApiResponse::ok(MetricsResponse {
        name: STRUCTURAL_SEARCH_COUNTER,
        label: "language",
        values: state.metrics.snapshot(),
    })
}
