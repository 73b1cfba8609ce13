//! Success responses returned by the handlers.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON body paired with its success status.
#[derive(Debug)]
pub enum ApiResponse<T> {
    /// 200
    Ok(T),
    /// 201
    Created(T),
    /// 202, the request was stored but follow-up work did not complete
    Accepted(T),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Self::Accepted(body) => (StatusCode::ACCEPTED, Json(body)).into_response(),
        }
    }
}

/// Handler return type.
pub type ApiResult<T> = Result<ApiResponse<T>, Error>;

/// Body carrying only a message.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    /// Human-readable outcome
    pub message: &'static str,
}
