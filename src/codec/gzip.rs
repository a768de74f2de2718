//! Gzip codec for stored payloads.
//!
//! Every payload is gzip-compressed before it enters the store and
//! decompressed on the way out. Compression runs at the maximum level:
//! clips are written once and may be read many times, so ratio beats
//! latency here.
//!
//! Both directions are streaming transforms. [`Compressor`] accepts chunks
//! as they arrive from ingestion, so compression can start before the full
//! payload exists in memory; [`Decompressor`] pushes decompressed bytes into
//! any `Write` sink as compressed input is fed in. The one-shot [`compress`]
//! and [`decompress`] helpers wrap them for callers that already hold the
//! whole buffer.

use bytes::Bytes;
use flate2::write::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur in the codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error while compressing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input was not produced by this codec's compression.
    ///
    /// Stored payloads only ever come from [`Compressor`], so hitting this
    /// on a stored payload means an internal invariant was violated.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Push-style gzip compressor.
///
/// Feed chunks in arrival order with [`write_chunk`](Self::write_chunk),
/// then call [`finish`](Self::finish) for the compressed payload.
///
/// # Example
///
/// ```
/// use clipvault::codec::{Compressor, decompress};
///
/// let mut compressor = Compressor::new();
/// compressor.write_chunk(b"hel").unwrap();
/// compressor.write_chunk(b"lo").unwrap();
/// let stored = compressor.finish().unwrap();
///
/// assert_eq!(&decompress(&stored).unwrap()[..], b"hello");
/// ```
pub struct Compressor {
    encoder: GzEncoder<Vec<u8>>,
}

impl Compressor {
    /// Creates a compressor at the maximum compression level.
    pub fn new() -> Self {
        Self {
            encoder: GzEncoder::new(Vec::new(), Compression::best()),
        }
    }

    /// Compresses one chunk. Chunks must be fed in arrival order.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> CodecResult<()> {
        self.encoder.write_all(chunk)?;
        Ok(())
    }

    /// Flushes the stream and returns the compressed payload.
    pub fn finish(self) -> CodecResult<Bytes> {
        let buf = self.encoder.finish()?;
        Ok(Bytes::from(buf))
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Push-style gzip decompressor writing into any sink.
///
/// Feed compressed chunks with [`write_chunk`](Self::write_chunk); the
/// decompressed bytes are written to the sink as they become available.
/// [`finish`](Self::finish) validates the stream trailer and returns the
/// sink. Any failure means the input was not produced by [`Compressor`].
pub struct Decompressor<W: Write> {
    decoder: GzDecoder<W>,
}

impl<W: Write> Decompressor<W> {
    /// Creates a decompressor that writes decompressed bytes into `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            decoder: GzDecoder::new(sink),
        }
    }

    /// Decompresses one chunk of compressed input.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> CodecResult<()> {
        self.decoder
            .write_all(chunk)
            .map_err(|e| CodecError::CorruptPayload(e.to_string()))
    }

    /// Completes decompression and returns the sink.
    pub fn finish(self) -> CodecResult<W> {
        self.decoder
            .finish()
            .map_err(|e| CodecError::CorruptPayload(e.to_string()))
    }
}

/// Compresses a whole buffer in one call.
pub fn compress(data: &[u8]) -> CodecResult<Bytes> {
    let mut compressor = Compressor::new();
    compressor.write_chunk(data)?;
    compressor.finish()
}

/// Decompresses a whole payload in one call.
///
/// `decompress(&compress(x)?)` returns `x` for every `x`, including the
/// empty sequence. Input not produced by [`compress`] (or [`Compressor`])
/// fails with [`CodecError::CorruptPayload`].
pub fn decompress(data: &[u8]) -> CodecResult<Bytes> {
    let mut decompressor = Decompressor::new(Vec::new());
    decompressor.write_chunk(data)?;
    let buf = decompressor.finish()?;
    Ok(Bytes::from(buf))
}
