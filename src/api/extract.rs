//! Request extractors whose rejections use the crate's error body.
//!
//! Malformed JSON, bodies of the wrong shape and unparsable path segments all become
//! [`Error::Validation`](crate::errors::Error::Validation), so clients always receive
//! `{ "error": "VALIDATION_ERROR", "message": ... }` with status 400.

use crate::errors::Error;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);
