use std::time::Duration;

use duplink_domain::{DuplinkError, Result};

// ---------------------------------------------------------------------------
// Defaults — kept here so tests and demos can import them directly.
// ---------------------------------------------------------------------------

/// Default maximum packet payload size in bytes.
///
/// Writes larger than the MTU are split into MTU-sized packets before they
/// enter the link. Also the default capacity of each queue, so a default
/// pipe buffers exactly one packet per stage.
pub const DEFAULT_MTU: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// PipeConfig
// ---------------------------------------------------------------------------

/// Configuration for a simulated duplex link.
///
/// All fields default to a perfect link: single-packet buffering, no
/// propagation delay, no transmission cost.
#[derive(Debug, Clone)]
pub struct PipeConfig {
    // ---
    /// Maximum bytes per packet. Larger writes are fragmented.
    pub mtu: usize,

    /// Byte capacity of each reader-side (egress) queue.
    /// `0` means "exactly one MTU", so a single packet always fits.
    pub in_limit: usize,

    /// Byte capacity of each writer-side (ingress) queue.
    /// `0` means "exactly one MTU", so a single packet always fits.
    pub out_limit: usize,

    /// Fixed propagation delay added to every packet.
    pub latency: Duration,

    /// Transmission cost per payload byte. Models link bandwidth: a
    /// packet of `n` bytes occupies the wire for `n * byte_delay`.
    pub byte_delay: Duration,
}

// ---

impl Default for PipeConfig {
    fn default() -> Self {
        // ---
        Self {
            mtu: DEFAULT_MTU,
            in_limit: 0,
            out_limit: 0,
            latency: Duration::ZERO,
            byte_delay: Duration::ZERO,
        }
    }
}

// ---

impl PipeConfig {
    // ---
    /// Perfect link, no impairments. Useful as a baseline.
    pub fn perfect() -> Self {
        Self::default()
    }

    // ---

    /// Geostationary satellite hop: 280 ms one-way latency at 1 Mbit/s.
    pub fn satellite() -> Self {
        // ---
        Self {
            latency: Duration::from_millis(280),
            ..Default::default()
        }
        .bandwidth_bps(1_000_000)
    }

    // ---

    /// Derive `byte_delay` from a link rate in **bits per second**.
    ///
    /// `0` disables pacing entirely (an unpaced link), matching the
    /// "0 = uncapped" convention used throughout the config.
    pub fn bandwidth_bps(mut self, bits_per_sec: u64) -> Self {
        // ---
        self.byte_delay = if bits_per_sec == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(8.0 / bits_per_sec as f64)
        };
        self
    }

    // ---

    /// Egress queue capacity in bytes, with `0` resolved to one MTU.
    pub fn in_limit_bytes(&self) -> usize {
        // ---
        if self.in_limit == 0 {
            self.mtu
        } else {
            self.in_limit
        }
    }

    /// Ingress queue capacity in bytes, with `0` resolved to one MTU.
    pub fn out_limit_bytes(&self) -> usize {
        // ---
        if self.out_limit == 0 {
            self.mtu
        } else {
            self.out_limit
        }
    }

    // ---

    /// Validate fields the type system cannot express.
    ///
    /// A packet larger than a queue's capacity could never be delivered,
    /// so `mtu` must fit both resolved limits.
    pub fn validate(&self) -> Result<()> {
        // ---
        if self.mtu == 0 {
            return Err(DuplinkError::InvalidConfig(
                "mtu must be at least 1 byte".into(),
            ));
        }
        if self.mtu > self.in_limit_bytes() {
            return Err(DuplinkError::InvalidConfig(format!(
                "mtu {} exceeds in_limit {}; a full packet could never be delivered",
                self.mtu,
                self.in_limit_bytes()
            )));
        }
        if self.mtu > self.out_limit_bytes() {
            return Err(DuplinkError::InvalidConfig(format!(
                "mtu {} exceeds out_limit {}; a full packet could never be queued",
                self.mtu,
                self.out_limit_bytes()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
