//! Ingestion Module
//!
//! Normalizes the three write-request shapes (inline value, multipart text
//! field, multipart file stream) into one ordered chunk sequence. See
//! [`resolver`].

pub mod resolver;

// Re-export commonly used types
pub use resolver::{resolve_inline, resolve_multipart, IngestError, ResolvedPayload, DATA_FIELD};
