//! In-process duplex byte pipe with a simulated link in the middle.
//!
//! [`pipe`] returns a pair of connected [`Endpoint`]s implementing the
//! [`duplink_domain::DuplinkStream`] contract. Between them sits a link
//! simulator honoring [`PipeConfig`]: writes fragment at the MTU, each
//! direction buffers through a bounded ingress queue, a single-packet
//! transit slot, and a bounded egress queue, and delivery is delayed by
//! propagation latency plus a per-byte transmission cost.
//!
//! # Quick start
//!
//! ```rust
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//! use duplink_pipe::{pipe, PipeConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let (mut a, mut b) = pipe(PipeConfig::default())?;
//!
//!     a.write_all(b"ping").await?;
//!     let mut buf = [0u8; 4];
//!     b.read_exact(&mut buf).await?;
//!     assert_eq!(&buf, b"ping");
//!     Ok(())
//! }
//! ```

mod config;
mod endpoint;
mod link;
mod packet;
mod pipe;
mod queue;

// --- public API
pub use config::{PipeConfig, DEFAULT_MTU};
pub use endpoint::Endpoint;
pub use pipe::pipe;

// ---

pub(crate) use link::LinkWorker;
pub(crate) use packet::Packet;
pub(crate) use queue::ByteQueue;
