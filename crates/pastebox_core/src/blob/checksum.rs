//! Streaming BLAKE3 digest over an async byte source.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Digest and length of a fully consumed byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest {
    /// Lowercase hex BLAKE3 digest.
    pub checksum: String,
    pub size: u64,
}

/// Hex BLAKE3 digest of an in-memory buffer, in the same format as
/// [`ChecksumReader`] produces.
pub fn checksum_of(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// [`AsyncRead`] adapter hashing every byte that passes through it.
///
/// The digest is computed in the same pass as the consumer's copy, so the
/// payload is never buffered as a whole.
pub struct ChecksumReader<R> {
    inner: R,
    hasher: blake3::Hasher,
    size: u64,
}

impl<R> ChecksumReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
            size: 0,
        }
    }

    /// Bytes observed so far.
    pub fn bytes_read(&self) -> u64 {
        self.size
    }

    /// Finish hashing and return the digest of everything read.
    pub fn finish(self) -> ContentDigest {
        ContentDigest {
            checksum: self.hasher.finalize().to_hex().to_string(),
            size: self.size,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ChecksumReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        let fresh = &buf.filled()[before..];
        this.hasher.update(fresh);
        this.size += fresh.len() as u64;
        Poll::Ready(Ok(()))
    }
}
