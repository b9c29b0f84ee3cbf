use std::sync::Arc;

// ---

use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

// ---

use duplink_domain::Result;

use super::{ByteQueue, Endpoint, LinkWorker, PipeConfig};

// ---------------------------------------------------------------------------
// pipe
// ---------------------------------------------------------------------------

/// Build a connected endpoint pair with a simulated link in between.
///
/// Validates `config`, constructs the two bounded queues per direction
/// (ingress capped at `out_limit` bytes, egress at `in_limit`), and
/// spawns one link worker per direction, so this must be called from
/// within a tokio runtime. Returns [`DuplinkError::InvalidConfig`] and
/// creates nothing when the configuration is unusable.
///
/// The workers exit on their own once their direction shuts down; the
/// pipe needs no explicit teardown beyond closing (or dropping) the
/// endpoints.
///
/// [`DuplinkError::InvalidConfig`]: duplink_domain::DuplinkError::InvalidConfig
pub fn pipe(config: PipeConfig) -> Result<(Endpoint, Endpoint)> {
    // ---
    config.validate()?;

    let link_id = Uuid::new_v4();
    let in_limit = config.in_limit_bytes();
    let out_limit = config.out_limit_bytes();

    let ingress_ab = Arc::new(ByteQueue::new(out_limit));
    let egress_ab = Arc::new(ByteQueue::new(in_limit));
    let ingress_ba = Arc::new(ByteQueue::new(out_limit));
    let egress_ba = Arc::new(ByteQueue::new(in_limit));

    LinkWorker::new(link_id, "a->b", Arc::clone(&ingress_ab), Arc::clone(&egress_ab)).spawn();
    LinkWorker::new(link_id, "b->a", Arc::clone(&ingress_ba), Arc::clone(&egress_ba)).spawn();

    let epoch = Instant::now();
    let a = Endpoint::new(link_id, &config, ingress_ab, egress_ba, epoch);
    let b = Endpoint::new(link_id, &config, ingress_ba, egress_ab, epoch);

    debug!(
        link_id = %link_id,
        mtu = config.mtu,
        in_limit,
        out_limit,
        latency = ?config.latency,
        byte_delay = ?config.byte_delay,
        "pipe constructed",
    );

    Ok((a, b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use std::io;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::mpsc;
    use tokio::time::{self, timeout, Instant};

    use duplink_domain::DuplinkError;

    use super::super::PipeConfig;
    use super::pipe;

    // ---

    /// Bytes written on one endpoint come out of the other, in order,
    /// with zero configured delay.
    #[tokio::test]
    async fn simple_write_read() {
        // ---
        let (mut a, mut b) = pipe(PipeConfig::default()).expect("pipe");

        let msg = b"hello, world";
        a.write_all(msg).await.expect("write");

        let mut buf = [0u8; 100];
        let n = b.read(&mut buf).await.expect("read");
        assert_eq!(n, msg.len());
        assert_eq!(&buf[..n], msg);
    }

    // ---

    /// The factory rejects an unusable configuration outright.
    #[tokio::test]
    async fn invalid_config_is_rejected() {
        // ---
        let config = PipeConfig {
            mtu: 100,
            in_limit: 50,
            ..Default::default()
        };
        assert!(matches!(
            pipe(config),
            Err(DuplinkError::InvalidConfig(_))
        ));
    }

    // ---

    /// Closing the writer propagates end-of-stream to the reader once
    /// buffered bytes are drained, and exactly then.
    #[tokio::test]
    async fn writer_close_propagates_eof() {
        // ---
        let (mut a, mut b) = pipe(PipeConfig::default()).expect("pipe");

        a.write_all(&[7u8; 14]).await.expect("write");
        a.shutdown().await.expect("shutdown");

        let mut buf = [0u8; 14];
        b.read_exact(&mut buf).await.expect("read");
        assert_eq!(buf, [7u8; 14]);

        let n = b.read(&mut buf).await.expect("read at eof");
        assert_eq!(n, 0, "expected end-of-stream after writer close");
    }

    // ---

    /// Closing the reader must wake a writer parked on a full link, even
    /// across the in-transit packet, and fail it with a broken pipe.
    #[tokio::test(start_paused = true)]
    async fn reader_close_wakes_parked_writer() {
        // ---
        let config = PipeConfig {
            mtu: 100,
            in_limit: 200,
            out_limit: 200,
            ..Default::default()
        };
        let (mut a, mut b) = pipe(config).expect("pipe");

        let writer = tokio::spawn(async move {
            for _ in 0..10 {
                if let Err(err) = a.write_all(&[0u8; 100]).await {
                    return Some(err.kind());
                }
            }
            None
        });

        // Let the writer run until it parks on the full ingress queue.
        time::sleep(Duration::from_millis(50)).await;
        b.close();

        let got = timeout(Duration::from_millis(200), writer)
            .await
            .expect("close did not wake the writer")
            .expect("writer task panicked");
        assert_eq!(got, Some(io::ErrorKind::BrokenPipe));
    }

    // ---

    /// Each packet arrives one latency after its send, within the
    /// tolerance. Sends are spaced out so the wire itself never queues.
    #[tokio::test(start_paused = true)]
    async fn latency_applied_per_packet() {
        // ---
        const LATENCY: Duration = Duration::from_millis(100);
        const N: usize = 10;

        let config = PipeConfig {
            latency: LATENCY,
            ..Default::default()
        };
        let (mut a, mut b) = pipe(config).expect("pipe");

        let writer = tokio::spawn(async move {
            let mut sent = Vec::with_capacity(N);
            for _ in 0..N {
                sent.push(Instant::now());
                a.write_all(&[0u8; 14]).await.expect("write");
                time::sleep(Duration::from_millis(100)).await;
            }
            sent
        });

        let mut received = Vec::with_capacity(N);
        let mut buf = [0u8; 14];
        for _ in 0..N {
            b.read_exact(&mut buf).await.expect("read");
            received.push(Instant::now());
        }
        let sent = writer.await.expect("writer task panicked");

        let leeway = Duration::from_millis(10);
        for (s, r) in sent.iter().zip(&received) {
            let observed = *r - *s;
            assert!(
                observed >= LATENCY && observed <= LATENCY + leeway,
                "expected latency of {LATENCY:?}, observed {observed:?}"
            );
        }
    }

    // ---

    /// Ten MTU-sized packets written back to back are delivered over a
    /// span of `byte_delay * mtu * n`, within 1%: pacing tracks the
    /// writer's pace, not queue dwell.
    #[tokio::test(start_paused = true)]
    async fn bandwidth_paces_delivery() {
        // ---
        const MTU: usize = 8192;
        const N: usize = 10;

        // Roughly 1 Mbit/s expressed as a per-byte cost.
        let byte_delay = Duration::from_nanos(1_000_000_000 / (128 * 1024));
        let config = PipeConfig {
            mtu: MTU,
            byte_delay,
            ..Default::default()
        };
        let (mut a, mut b) = pipe(config).expect("pipe");

        let t0 = Instant::now();
        let writer = tokio::spawn(async move {
            for _ in 0..N {
                a.write_all(&[0u8; MTU]).await.expect("write");
            }
        });

        let mut buf = [0u8; MTU];
        for _ in 0..N {
            b.read_exact(&mut buf).await.expect("read");
        }
        let span = Instant::now() - t0;
        writer.await.expect("writer task panicked");

        let expect = byte_delay * (MTU * N) as u32;
        let diff = if span > expect { span - expect } else { expect - span };
        assert!(
            diff.as_secs_f64() <= expect.as_secs_f64() * 0.01,
            "expected a span of about {expect:?}, observed {span:?}"
        );
    }

    // ---

    /// With two-packet limits at each end, five writes fill the three
    /// stages (two in ingress, one in transit, two in egress) without
    /// blocking; the sixth parks until a read frees egress space.
    #[tokio::test(start_paused = true)]
    async fn write_parks_when_stages_full() {
        // ---
        let config = PipeConfig {
            mtu: 14,
            in_limit: 2 * 14,
            out_limit: 2 * 14,
            ..Default::default()
        };
        let (mut a, mut b) = pipe(config).expect("pipe");

        let (sync_tx, mut sync_rx) = mpsc::channel::<()>(1);
        let writer = tokio::spawn(async move {
            for _ in 0..5 {
                a.write_all(&[0u8; 14]).await.expect("staged write");
            }
            sync_tx.send(()).await.expect("sync");

            a.write_all(&[0u8; 14]).await.expect("sixth write");
            sync_tx.send(()).await.expect("sync");
        });

        // The first five writes must complete without blocking.
        timeout(Duration::from_millis(200), sync_rx.recv())
            .await
            .expect("writer parked before filling the stages");

        // The sixth write must park.
        time::sleep(Duration::from_millis(200)).await;
        assert!(
            sync_rx.try_recv().is_err(),
            "sixth write did not park on the full link"
        );

        // One read frees egress space and releases it.
        let mut buf = [0u8; 14];
        b.read_exact(&mut buf).await.expect("read");
        timeout(Duration::from_millis(200), sync_rx.recv())
            .await
            .expect("read did not release the parked writer")
            .expect("writer dropped the sync channel");

        writer.await.expect("writer task panicked");
    }
}
