//! Ingestion Shape Resolution
//!
//! A write request can present its payload three ways:
//!
//! 1. **Inline value** - a `data` entry in the query string or request body.
//!    Structured (non-string) values are serialized to their canonical JSON
//!    text first.
//! 2. **Multipart field** - a multipart submission with a text field named
//!    `data`.
//! 3. **Multipart file** - a multipart submission with a file part named
//!    `data`, collected chunk by chunk as it streams in.
//!
//! The resolver normalizes all three into a [`ResolvedPayload`]: an ordered
//! sequence of byte chunks ready to be fed through the compressor. Chunks
//! arrive across asynchronous deliveries and their order is preserved
//! exactly; nothing here requires the full payload up front.
//!
//! Resolution order: an inline value wins if present; otherwise the body is
//! parsed as multipart and whichever of field/file appears under `data` is
//! used. A multipart body that finishes without a `data` part is an error.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// The field name a write request must use for its payload.
pub const DATA_FIELD: &str = "data";

/// Errors that can occur while resolving a request into a payload.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request carried no usable content under the `data` field
    #[error("no data provided")]
    NoDataProvided,

    /// The multipart stream failed while being consumed
    #[error("multipart stream error: {0}")]
    Stream(String),
}

impl From<MultipartError> for IngestError {
    fn from(err: MultipartError) -> Self {
        IngestError::Stream(err.to_string())
    }
}

/// A payload resolved from one of the three ingestion shapes.
///
/// Each variant carries its byte chunks in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPayload {
    /// Shape A: an inline scalar from the query string or body
    InlineValue(Bytes),
    /// Shape B: a multipart text field named `data`
    FieldValue(Vec<Bytes>),
    /// Shape C: a multipart file part named `data`
    FileStream(Vec<Bytes>),
}

impl ResolvedPayload {
    /// A short label for logging which shape a write used.
    pub fn shape(&self) -> &'static str {
        match self {
            ResolvedPayload::InlineValue(_) => "inline value",
            ResolvedPayload::FieldValue(_) => "multipart field",
            ResolvedPayload::FileStream(_) => "multipart file",
        }
    }

    /// Flattens the payload into its ordered chunk sequence.
    pub fn into_chunks(self) -> Vec<Bytes> {
        match self {
            ResolvedPayload::InlineValue(bytes) => vec![bytes],
            ResolvedPayload::FieldValue(chunks) => chunks,
            ResolvedPayload::FileStream(chunks) => chunks,
        }
    }
}

/// Resolves an inline `data` value (shape A).
///
/// Strings are taken verbatim. Structured values are serialized to their
/// canonical JSON text. `null` counts as "no value supplied" so the caller
/// falls through to multipart resolution.
pub fn resolve_inline(value: Value) -> Option<ResolvedPayload> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(ResolvedPayload::InlineValue(Bytes::from(s))),
        other => Some(ResolvedPayload::InlineValue(Bytes::from(other.to_string()))),
    }
}

/// Resolves a multipart submission (shapes B and C).
///
/// Scans the parts in order for one named [`DATA_FIELD`]; other parts are
/// skipped. A file part (it carries a filename) becomes
/// [`ResolvedPayload::FileStream`], a text field becomes
/// [`ResolvedPayload::FieldValue`]; either way the chunks are accumulated
/// as they arrive, in order.
///
/// # Errors
///
/// [`IngestError::NoDataProvided`] if the submission ends without a `data`
/// part; [`IngestError::Stream`] if the multipart stream itself fails.
pub async fn resolve_multipart(multipart: &mut Multipart) -> Result<ResolvedPayload, IngestError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(DATA_FIELD) {
            continue;
        }

        let is_file = field.file_name().is_some();

        let mut chunks = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            chunks.push(chunk);
        }

        let payload = if is_file {
            ResolvedPayload::FileStream(chunks)
        } else {
            ResolvedPayload::FieldValue(chunks)
        };
        debug!(shape = payload.shape(), "Resolved multipart payload");
        return Ok(payload);
    }

    Err(IngestError::NoDataProvided)
}
