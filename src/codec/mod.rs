//! Codec Module
//!
//! Gzip compression applied to every stored payload. See [`gzip`] for the
//! streaming [`Compressor`]/[`Decompressor`] pair and the one-shot helpers.

pub mod gzip;

// Re-export commonly used types
pub use gzip::{compress, decompress, CodecError, CodecResult, Compressor, Decompressor};
