use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// The internal framing unit moving through the link.
///
/// Stamped at write time with the moment the writer handed it off and the
/// computed instant the reader side may observe it. Owned end to end:
/// created by the writer, carried through the queues, consumed by the
/// reader.
#[derive(Debug)]
pub(crate) struct Packet {
    // ---
    payload: Vec<u8>,
    sent_at: Instant,
    deliver_at: Instant,
}

// ---

impl Packet {
    // ---
    pub(crate) fn new(payload: Vec<u8>, sent_at: Instant, deliver_at: Instant) -> Self {
        // ---
        debug_assert!(!payload.is_empty(), "zero-length packets never enter the link");
        Self {
            payload,
            sent_at,
            deliver_at,
        }
    }

    /// Payload length in bytes. Counts against queue capacity.
    pub(crate) fn len(&self) -> usize {
        self.payload.len()
    }

    /// When the writer handed this packet off.
    pub(crate) fn sent_at(&self) -> Instant {
        self.sent_at
    }

    /// Earliest instant the reader side may observe this packet.
    pub(crate) fn deliver_at(&self) -> Instant {
        self.deliver_at
    }

    pub(crate) fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
