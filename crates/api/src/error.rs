use axum::{http::StatusCode, response::{IntoResponse, Response}};
use sched_core::{EngineError, ValidationError};

#[derive(Debug)]
pub struct ApiError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response { (StatusCode::BAD_REQUEST, self.0).into_response() }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self { Self(e.to_string()) }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self { Self(e.to_string()) }
}
