use std::sync::Arc;

// ---

use tokio::time;
use tracing::{debug, trace};
use uuid::Uuid;

// ---

use super::ByteQueue;

// ---------------------------------------------------------------------------
// LinkWorker
// ---------------------------------------------------------------------------

/// Per-direction worker that moves packets ingress → transit → egress.
///
/// Holds at most one packet at a time (the transit slot), which gives the
/// link its observable three-stage buffering: ingress bytes + one packet
/// on the wire + egress bytes. The pacing sleep races against closure of
/// the egress so a reader-close cancels a long latency instead of waiting
/// it out.
///
/// Exit conditions:
/// - ingress reports end-of-stream (writer closed, queue drained):
///   close the egress and stop, letting the reader drain to EOF.
/// - egress closes (reader gone): close the ingress too so a parked
///   writer wakes with a broken pipe, discard what remains, and stop.
pub(crate) struct LinkWorker {
    // ---
    link_id: Uuid,

    /// Direction label for log lines ("a->b" / "b->a").
    dir: &'static str,

    ingress: Arc<ByteQueue>,
    egress: Arc<ByteQueue>,
}

// ---

impl LinkWorker {
    // ---
    pub(crate) fn new(
        link_id: Uuid,
        dir: &'static str,
        ingress: Arc<ByteQueue>,
        egress: Arc<ByteQueue>,
    ) -> Self {
        // ---
        Self {
            link_id,
            dir,
            ingress,
            egress,
        }
    }

    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    // ---

    async fn run(self) {
        // ---
        debug!(link_id = %self.link_id, dir = self.dir, "link worker started");

        loop {
            // Acquire: the popped packet occupies the transit slot.
            let Some(pkt) = self.ingress.pop().await else {
                self.egress.close();
                break;
            };

            // Pace: hold the packet on the wire until its deliver time.
            tokio::select! {
                () = time::sleep_until(pkt.deliver_at()) => {}
                () = self.egress.closed() => {
                    self.abort_backward().await;
                    break;
                }
            }

            trace!(
                link_id = %self.link_id,
                dir = self.dir,
                len = pkt.len(),
                transit = ?(pkt.deliver_at() - pkt.sent_at()),
                "packet delivered",
            );

            // Deliver: parks while the egress is full.
            if self.egress.push(pkt).await.is_err() {
                self.abort_backward().await;
                break;
            }
        }

        debug!(link_id = %self.link_id, dir = self.dir, "link worker exited");
    }

    // ---

    /// Reader-close propagation: close the ingress so a parked writer
    /// wakes with a broken pipe, then discard whatever it still holds.
    async fn abort_backward(&self) {
        // ---
        self.ingress.close();
        while self.ingress.pop().await.is_some() {}
    }
}
