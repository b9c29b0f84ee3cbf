use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

// ---

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Instant;
use uuid::Uuid;

// ---

use duplink_domain::{DuplinkError, DuplinkStream};

use super::{ByteQueue, Packet, PipeConfig};

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// One end of a simulated duplex link.
///
/// Created in connected pairs by [`super::pipe`]. Writes fragment into
/// packets of at most `mtu` bytes and enter the outbound ingress queue;
/// reads drain delivered packets from the inbound egress queue. Packet
/// boundaries are not observable to readers: a packet larger than the
/// read buffer leaves its remainder at the head for the next read.
///
/// Each packet's deliver time is fixed at write time from a wire cursor:
/// transmission starts when the packet is handed off or when the wire
/// frees up, whichever is later, runs for `byte_delay * len`, and the
/// packet arrives one `latency` after transmission ends. The cursor makes
/// deliver times non-decreasing, so a writer burst above the link rate
/// queues behind the wire instead of arriving all at once.
pub struct Endpoint {
    // ---
    link_id: Uuid,
    mtu: usize,
    latency: Duration,
    byte_delay: Duration,

    /// Outbound ingress queue: this endpoint's write side.
    outbound: Arc<ByteQueue>,

    /// Inbound egress queue: this endpoint's read side.
    inbound: Arc<ByteQueue>,

    /// Wire cursor: the instant the outbound wire frees up.
    busy_until: Instant,

    /// Leftover bytes from a partially consumed packet.
    read_buf: Vec<u8>,

    write_closed: bool,
    read_closed: bool,
}

// ---

impl Endpoint {
    // ---
    pub(crate) fn new(
        link_id: Uuid,
        config: &PipeConfig,
        outbound: Arc<ByteQueue>,
        inbound: Arc<ByteQueue>,
        epoch: Instant,
    ) -> Self {
        // ---
        Self {
            link_id,
            mtu: config.mtu,
            latency: config.latency,
            byte_delay: config.byte_delay,
            outbound,
            inbound,
            busy_until: epoch,
            read_buf: Vec::new(),
            write_closed: false,
            read_closed: false,
        }
    }

    // ---

    /// Identifier shared by both endpoints of the pipe.
    pub fn link_id(&self) -> Uuid {
        self.link_id
    }

    // ---

    /// Close the read half.
    ///
    /// Buffered and in-flight inbound packets are discarded; the peer's
    /// parked or future writes fail with a broken-pipe error. Local reads
    /// return end-of-stream immediately. Idempotent, never blocks.
    pub fn close_read(&mut self) {
        // ---
        self.read_closed = true;
        self.read_buf.clear();
        self.inbound.close();
    }

    /// Close the write half.
    ///
    /// In-flight outbound packets still drain to the peer, which then
    /// observes end-of-stream. Local writes fail with a broken-pipe
    /// error. Idempotent, never blocks.
    pub fn close_write(&mut self) {
        // ---
        self.write_closed = true;
        self.outbound.close();
    }

    /// Close both halves.
    pub fn close(&mut self) {
        // ---
        self.close_read();
        self.close_write();
    }
}

// ---

impl AsyncWrite for Endpoint {
    // ---
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        // ---
        let this = &mut *self;

        if this.write_closed {
            return Poll::Ready(Err(DuplinkError::BrokenPipe.into()));
        }
        if data.is_empty() {
            return Poll::Ready(Ok(0));
        }

        // Accept whole packets while they fit in the ingress queue. A
        // later chunk that does not fit ends the call; `write_all`
        // resumes from the accepted count.
        let mut accepted = 0;
        for chunk in data.chunks(this.mtu) {
            match this.outbound.poll_reserve(cx, chunk.len()) {
                Poll::Ready(Ok(())) => {
                    let now = Instant::now();
                    let start = this.busy_until.max(now);
                    this.busy_until = start + this.byte_delay * chunk.len() as u32;
                    let deliver_at = this.busy_until + this.latency;
                    this.outbound.commit(Packet::new(chunk.to_vec(), now, deliver_at));
                    accepted += chunk.len();
                }
                Poll::Ready(Err(_closed)) => {
                    // Reader side is gone. Bytes already handed off count.
                    return if accepted > 0 {
                        Poll::Ready(Ok(accepted))
                    } else {
                        Poll::Ready(Err(DuplinkError::BrokenPipe.into()))
                    };
                }
                Poll::Pending => {
                    return if accepted > 0 {
                        Poll::Ready(Ok(accepted))
                    } else {
                        Poll::Pending
                    };
                }
            }
        }
        Poll::Ready(Ok(accepted))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        // Packets are handed to the link at write time; nothing buffers here.
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        // ---
        self.close_write();
        Poll::Ready(Ok(()))
    }
}

// ---

impl AsyncRead for Endpoint {
    // ---
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        // ---
        let this = &mut *self;

        if this.read_closed {
            return Poll::Ready(Ok(())); // end-of-stream
        }

        if !this.read_buf.is_empty() {
            let n = buf.remaining().min(this.read_buf.len());
            buf.put_slice(&this.read_buf[..n]);
            this.read_buf.drain(..n);
            return Poll::Ready(Ok(()));
        }

        match this.inbound.poll_pop(cx) {
            Poll::Ready(Some(pkt)) => {
                let payload = pkt.into_payload();
                let n = buf.remaining().min(payload.len());
                buf.put_slice(&payload[..n]);
                if n < payload.len() {
                    this.read_buf.extend_from_slice(&payload[n..]);
                }
                Poll::Ready(Ok(()))
            }
            // Peer write half closed and the egress is drained.
            Poll::Ready(None) => Poll::Ready(Ok(())),
            Poll::Pending => Poll::Pending,
        }
    }
}

// ---

impl DuplinkStream for Endpoint {
    // ---
    fn link_id(&self) -> Uuid {
        self.link_id
    }

    fn close_read(&mut self) {
        Endpoint::close_read(self);
    }

    fn close_write(&mut self) {
        Endpoint::close_write(self);
    }
}

// ---

/// An abandoned endpoint behaves like a dropped channel half: both
/// queues close so the peer unblocks instead of hanging forever.
impl Drop for Endpoint {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
