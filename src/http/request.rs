//! Request identification and body decoding.
//!
//! # Responsibilities
//! - Assign a UUID v4 request ID to every inbound request
//! - Echo the ID back on the response and record it on the request span
//! - Decode JSON bodies with error messages the form front end understands
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept

use axum::{
    body::{Body, Bytes},
    http::{HeaderName, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

use crate::http::error::ApiError;

pub const X_REQUEST_ID: &str = "x-request-id";

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static(X_REQUEST_ID)
}

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(request_id_header(), MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(request_id_header())
}

/// Request span carrying the request ID.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Parse a body as arbitrary JSON. Syntax errors are internal errors, matching
/// how the form client reports them.
pub fn parse_json_value(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Decode a whole body. Both syntax and shape errors are bad requests.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Take a required member out of a JSON object and decode it.
///
/// Absent or `null` members are [`ApiError::MissingParameter`]; members of the
/// wrong shape are [`ApiError::BadRequest`].
pub fn take_field<T: DeserializeOwned>(body: &mut Value, field: &str) -> Result<T, ApiError> {
    let value = body
        .get_mut(field)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or(ApiError::MissingParameter)?;
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("{}: {}", field, e)))
}
