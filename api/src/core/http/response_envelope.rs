use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON body of every non-streaming response: health, metrics, and requests
/// rejected before a result stream is opened.
///
/// Streamed searches report their own failures as an `error` line instead.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Same code an `error` stream line would carry, e.g. `SNAPSHOT_NOT_FOUND`.
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

/// Points at the offending request field (`pattern`, `snapshotPath`, ...).
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub path: &'static str,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// `200 OK` with `data`.
    pub fn ok(data: T) -> Response {
        let body = Self {
            success: true,
            data: Some(data),
            error: None,
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl ApiResponse<()> {
    pub fn failure(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        field: Option<&'static str>,
    ) -> Response {
        let body = Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
                details: field.map(|path| ApiErrorDetail { path }).into_iter().collect(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
