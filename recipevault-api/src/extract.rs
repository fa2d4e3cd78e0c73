/// Request extractors with this API's error conventions
///
/// Axum's stock `Json` extractor reports malformed bodies with its own
/// rejection statuses (422 for deserialization failures). This service
/// reports every request-shape problem as `400 Bad Request` with the
/// structured error body, so handlers use this wrapper instead.

use crate::error::ApiError;
use axum::{
    extract::rejection::JsonRejection,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON body extractor whose rejections map to [`ApiError`]
///
/// Drop-in replacement for `axum::Json` on both the request and the
/// response side.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
