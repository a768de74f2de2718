//! Request Handlers
//!
//! The three operations the service exposes, mapped onto the store:
//!
//! - `POST /copy` - resolve the payload (inline value, multipart field, or
//!   multipart file), compress it, store it, return `{"id": ...}`.
//! - `GET /paste` - look up an id, decompress, return the bytes. Every hit
//!   rearms the clip's inactivity window.
//! - `POST /delete` - remove an id.
//!
//! Handlers translate the core's outcomes 1:1 into status codes: missing
//! ingestion data is `400`, an absent id is `404`, and a payload that fails
//! decompression is `500` (that one should be unreachable and is logged as
//! an internal fault).

use crate::codec::{decompress, CodecError, Compressor};
use crate::http::AppState;
use crate::ingest::{resolve_inline, resolve_multipart, IngestError, ResolvedPayload, DATA_FIELD};
use axum::body::to_bytes;
use axum::extract::{Form, FromRequest, Multipart, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Response body for a successful copy.
#[derive(Debug, Serialize)]
pub struct CopyResponse {
    pub id: String,
}

/// An error ready to be turned into a response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: Option<&'static str>,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: Some(message),
        }
    }

    /// `404` with an empty body, whether the id never existed, was deleted,
    /// or lapsed - callers cannot tell the three apart.
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: None,
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.message {
            Some(message) => (self.status, message).into_response(),
            None => self.status.into_response(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::NoDataProvided => ApiError::bad_request("no data provided"),
            IngestError::Stream(_) => ApiError::bad_request("malformed multipart stream"),
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(_: CodecError) -> Self {
        ApiError::internal()
    }
}

/// `POST /copy` - store a new clip.
pub async fn copy(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<CopyResponse>, ApiError> {
    let payload = resolve_request(request).await?;
    debug!(shape = payload.shape(), "Resolved write payload");

    // Compress chunk by chunk, in arrival order
    let mut compressor = Compressor::new();
    for chunk in payload.into_chunks() {
        compressor.write_chunk(&chunk)?;
    }
    let stored = compressor.finish()?;

    let id = state.store.put(stored);
    info!(id = %id, "Clip stored");

    Ok(Json(CopyResponse { id }))
}

/// `GET /paste` - read a clip back.
pub async fn paste(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let id = extract_id(request).await.ok_or_else(ApiError::not_found)?;

    let stored = state.store.get(&id).ok_or_else(ApiError::not_found)?;

    let bytes = decompress(&stored).map_err(|err| {
        // Stored payloads only ever come from our own compressor, so this
        // is an invariant violation, not a client problem.
        error!(id = %id, error = %err, "Stored payload failed decompression");
        ApiError::internal()
    })?;

    Ok(([(CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

/// `POST /delete` - drop a clip.
pub async fn delete(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    let id = extract_id(request).await.ok_or_else(ApiError::not_found)?;

    if state.store.delete(&id) {
        info!(id = %id, "Clip deleted");
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::not_found())
    }
}

/// Resolves a write request into a payload.
///
/// An inline `data` value wins if present, with the body's value shadowing
/// the query's; otherwise the body is parsed as multipart.
async fn resolve_request(request: Request) -> Result<ResolvedPayload, ApiError> {
    let content_type = content_type_of(&request);
    let query_value = query_param(request.uri(), DATA_FIELD).map(Value::String);

    if content_type.starts_with("multipart/form-data") {
        if let Some(payload) = query_value.and_then(resolve_inline) {
            return Ok(payload);
        }

        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| ApiError::bad_request("malformed multipart stream"))?;
        return Ok(resolve_multipart(&mut multipart).await?);
    }

    let body_value = if content_type.starts_with("application/json") {
        let bytes = to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|_| ApiError::bad_request("unreadable request body"))?;
        serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|mut body| body.get_mut(DATA_FIELD).map(Value::take))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(mut form) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|_| ApiError::bad_request("unreadable request body"))?;
        form.remove(DATA_FIELD).map(Value::String)
    } else {
        None
    };

    body_value
        .or(query_value)
        .and_then(resolve_inline)
        .ok_or_else(|| IngestError::NoDataProvided.into())
}

/// Pulls the target id from the query string or, failing that, the body.
async fn extract_id(request: Request) -> Option<String> {
    if let Some(id) = query_param(request.uri(), "id") {
        return Some(id);
    }

    let content_type = content_type_of(&request);

    if content_type.starts_with("application/json") {
        let bytes = to_bytes(request.into_body(), usize::MAX).await.ok()?;
        let body: Value = serde_json::from_slice(&bytes).ok()?;
        return body.get("id").and_then(Value::as_str).map(str::to_string);
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(mut form) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .ok()?;
        return form.remove("id");
    }

    None
}

fn content_type_of(request: &Request) -> String {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn query_param(uri: &Uri, key: &str) -> Option<String> {
    let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.remove(key)
}
