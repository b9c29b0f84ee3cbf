use tokio::io::{AsyncRead, AsyncWrite};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DuplinkStream
// ---------------------------------------------------------------------------

/// One endpoint of a duplex byte stream over a simulated link.
///
/// Implements [`AsyncRead`] + [`AsyncWrite`] so higher layers stay
/// transport-agnostic. The two halves close independently, mirroring
/// `shutdown(2)`:
///
/// - [`close_write`](DuplinkStream::close_write) sends the equivalent of a
///   FIN: in-flight bytes still drain to the peer, which then observes
///   end-of-stream.
/// - [`close_read`](DuplinkStream::close_read) discards buffered and
///   in-flight inbound data and propagates backward, failing the peer's
///   blocked or future writes with a broken-pipe error.
///
/// All close operations are idempotent and never block.
pub trait DuplinkStream: AsyncRead + AsyncWrite + Send + Unpin {
    // ---
    /// Stable identifier of the link this endpoint belongs to.
    ///
    /// Both endpoints of a pipe report the same id; log lines on either
    /// side correlate through it.
    fn link_id(&self) -> Uuid;

    /// Close the read half.
    fn close_read(&mut self);

    /// Close the write half.
    fn close_write(&mut self);

    /// Close both halves.
    fn close(&mut self) {
        // ---
        self.close_read();
        self.close_write();
    }
}

// ---

/// Convenience type alias for a heap-allocated [`DuplinkStream`].
pub type DuplinkStreamPtr = Box<dyn DuplinkStream>;
