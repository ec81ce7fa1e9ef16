//! Streaming gzip decompression for compressed sitemaps.

use async_compression::tokio::bufread::GzipDecoder;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream};
use std::io;
use std::pin::Pin;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

/// Incremental byte source, as produced by a streaming fetch.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Magic number opening every gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decoded size limit applied when none is configured (50 MiB, the sitemap
/// protocol's cap on an uncompressed sitemap).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Turns a compressed byte stream into the decompressed document.
#[async_trait]
pub trait Decompress: Send + Sync {
    /// Consume `stream` and return the fully decompressed bytes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error for malformed or truncated input, stream read
    /// failures, or output exceeding the decompressor's size limit.
    async fn decompress(&self, stream: ByteStream) -> io::Result<Vec<u8>>;
}

/// Pull-based gzip decoder.
///
/// Reads the source stream chunk by chunk through [`GzipDecoder`], so peak
/// memory is the decompressed document plus one network chunk. Multi-member
/// gzip files are decoded in full.
#[derive(Debug, Clone, Copy)]
pub struct GzipDecompressor {
    max_output: u64,
}

impl GzipDecompressor {
    /// Decoder rejecting output larger than `max_output` bytes.
    pub const fn new(max_output: u64) -> Self {
        Self { max_output }
    }

    /// Configured output limit in bytes.
    pub const fn max_output(&self) -> u64 {
        self.max_output
    }
}

impl Default for GzipDecompressor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

#[async_trait]
impl Decompress for GzipDecompressor {
    async fn decompress(&self, stream: ByteStream) -> io::Result<Vec<u8>> {
        let mut decoder = GzipDecoder::new(StreamReader::new(stream));
        decoder.multiple_members(true);

        let mut output = Vec::new();
        decoder
            .take(self.max_output.saturating_add(1))
            .read_to_end(&mut output)
            .await?;

        if output.len() as u64 > self.max_output {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "decompressed document exceeds {} bytes",
                    self.max_output
                ),
            ));
        }
        Ok(output)
    }
}

/// Whether `bytes` start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Wrap an in-memory body as a single-chunk [`ByteStream`].
pub fn byte_stream_from(body: Bytes) -> ByteStream {
    Box::pin(stream::once(async move { Ok(body) }))
}
