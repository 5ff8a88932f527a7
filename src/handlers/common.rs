use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::{errors::ServiceError, ApiResponse};

/// 200 response in the uniform envelope.
pub fn success_response<T: Serialize>(data: T, message: &str) -> Response {
    wrap(StatusCode::OK, data, message)
}

/// 201 response in the uniform envelope.
pub fn created_response<T: Serialize>(data: T, message: &str) -> Response {
    wrap(StatusCode::CREATED, data, message)
}

fn wrap<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    let body = ApiResponse {
        status_code: status.as_u16(),
        data: Some(data),
        message: message.to_string(),
        success: true,
    };
    (status, Json(body)).into_response()
}

/// Validate request input, mapping failures into the uniform error envelope.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {e}")))
}
