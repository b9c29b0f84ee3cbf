use std::collections::VecDeque;
use std::future::poll_fn;
use std::sync::Mutex;
use std::task::{Context, Poll, Waker};

// ---

use super::Packet;

// ---------------------------------------------------------------------------
// ByteQueue
// ---------------------------------------------------------------------------

/// Marker returned to producers when the queue has been closed.
#[derive(Debug)]
pub(crate) struct Closed;

/// Bounded FIFO of packets, capped by total payload bytes.
///
/// One logical producer and one logical consumer per queue; each parks in
/// a single waker slot. Producers park while an insert would exceed the
/// cap and wake on any pop. Consumers park while empty and wake on any
/// commit. `close` is idempotent, wakes everyone, and flips the queue
/// into drain mode: producers are rejected, consumers keep receiving
/// until the queue is empty and then observe end-of-stream.
///
/// The producer path is split into [`poll_reserve`](ByteQueue::poll_reserve)
/// and [`commit`](ByteQueue::commit) so the endpoint can build a packet
/// (stamping its deliver time) only once room for it is guaranteed. A
/// reservation stays valid because no second producer exists to consume
/// the room in between.
pub(crate) struct ByteQueue {
    // ---
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    // ---
    packets: VecDeque<Packet>,
    queued_bytes: usize,
    closed: bool,

    /// Producer parked because the next packet does not fit.
    producer: Option<Waker>,

    /// Consumer parked on an empty queue.
    consumer: Option<Waker>,

    /// Task parked in [`ByteQueue::closed`], waiting for closure.
    close_watcher: Option<Waker>,
}

// ---

impl ByteQueue {
    // ---
    pub(crate) fn new(capacity: usize) -> Self {
        // ---
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    // ---

    /// Poll for room to enqueue `len` more bytes.
    ///
    /// `Ready(Ok(()))` guarantees a following [`commit`](ByteQueue::commit)
    /// of at most `len` bytes fits. `Ready(Err(Closed))` means the queue
    /// accepts no further packets. `Pending` parks the producer until a
    /// pop frees room or the queue closes.
    pub(crate) fn poll_reserve(&self, cx: &mut Context<'_>, len: usize) -> Poll<Result<(), Closed>> {
        // ---
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Poll::Ready(Err(Closed));
        }
        if inner.queued_bytes + len <= self.capacity {
            return Poll::Ready(Ok(()));
        }
        inner.producer = Some(cx.waker().clone());
        Poll::Pending
    }

    /// Enqueue a packet whose room was reserved with `poll_reserve`.
    ///
    /// If the queue closed between the reservation and the commit the
    /// packet is discarded: its reader is gone.
    pub(crate) fn commit(&self, pkt: Packet) {
        // ---
        let waker = {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            debug_assert!(inner.queued_bytes + pkt.len() <= self.capacity);
            inner.queued_bytes += pkt.len();
            inner.packets.push_back(pkt);
            inner.consumer.take()
        };
        if let Some(w) = waker {
            w.wake();
        }
    }

    // ---

    /// Poll the head of the queue.
    ///
    /// `Ready(Some(_))` pops in strict FIFO order and wakes a parked
    /// producer. `Ready(None)` is end-of-stream: the queue is closed and
    /// fully drained. `Pending` parks the consumer.
    pub(crate) fn poll_pop(&self, cx: &mut Context<'_>) -> Poll<Option<Packet>> {
        // ---
        let (pkt, waker) = {
            let mut inner = self.inner.lock().unwrap();
            match inner.packets.pop_front() {
                Some(pkt) => {
                    inner.queued_bytes -= pkt.len();
                    (pkt, inner.producer.take())
                }
                None if inner.closed => return Poll::Ready(None),
                None => {
                    inner.consumer = Some(cx.waker().clone());
                    return Poll::Pending;
                }
            }
        };
        if let Some(w) = waker {
            w.wake();
        }
        Poll::Ready(Some(pkt))
    }

    // ---

    /// Blocking producer path: reserve, then commit.
    pub(crate) async fn push(&self, pkt: Packet) -> Result<(), Closed> {
        // ---
        poll_fn(|cx| self.poll_reserve(cx, pkt.len())).await?;
        self.commit(pkt);
        Ok(())
    }

    /// Blocking consumer path. `None` is end-of-stream.
    pub(crate) async fn pop(&self) -> Option<Packet> {
        poll_fn(|cx| self.poll_pop(cx)).await
    }

    // ---

    /// Close the queue. Idempotent; wakes the parked producer, consumer,
    /// and close watcher.
    pub(crate) fn close(&self) {
        // ---
        let wakers = {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.closed = true;
            [
                inner.producer.take(),
                inner.consumer.take(),
                inner.close_watcher.take(),
            ]
        };
        for w in wakers.into_iter().flatten() {
            w.wake();
        }
    }

    /// Resolves once the queue has been closed from either side.
    ///
    /// The link worker races this against its pacing sleep so a
    /// reader-close cancels the sleep instead of stalling behind a long
    /// latency.
    pub(crate) async fn closed(&self) {
        // ---
        poll_fn(|cx| {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                Poll::Ready(())
            } else {
                inner.close_watcher = Some(cx.waker().clone());
                Poll::Pending
            }
        })
        .await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
