//! Pipe demo — pushes a batch of packets through a simulated link and
//! reports the observed first-packet latency and aggregate throughput.

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;

use duplink_domain::DuplinkStream;
use duplink_pipe::{pipe, PipeConfig};

// ---

pub async fn run(config: PipeConfig, packets: usize, packet_size: usize) -> anyhow::Result<()> {
    // ---
    let configured_latency = config.latency;
    let (mut tx, rx) = pipe(config)?;

    // Spawn the receiver first so it is parked and ready before the
    // sender starts the clock.
    let receiver = tokio::spawn(drain(rx, packets, packet_size));

    let start = Instant::now();
    let payload = vec![0u8; packet_size];
    for _ in 0..packets {
        tx.write_all(&payload).await?;
    }
    tx.shutdown().await?;

    let (first_arrival, last_arrival, total) =
        receiver.await.context("receiver task panicked")??;

    let span = last_arrival - start;
    let bytes_per_sec = total as f64 / span.as_secs_f64();
    println!("  configured latency:  {configured_latency:?}");
    println!("  first packet after:  {:?}", first_arrival - start);
    println!("  {total} bytes in {span:?} ({bytes_per_sec:.0} bytes/s)");

    Ok(())
}

// ---

/// Read the expected packets, then confirm end-of-stream. Returns the
/// first and last arrival instants and the total byte count.
async fn drain<S>(mut rx: S, packets: usize, packet_size: usize) -> anyhow::Result<(Instant, Instant, usize)>
where
    S: DuplinkStream,
{
    // ---
    let mut buf = vec![0u8; packet_size];
    let mut first = None;
    let mut last = Instant::now();
    let mut total = 0;

    for _ in 0..packets {
        rx.read_exact(&mut buf).await?;
        last = Instant::now();
        first.get_or_insert(last);
        total += buf.len();
    }

    let n = rx.read(&mut buf).await?;
    anyhow::ensure!(n == 0, "expected end-of-stream, got {n} extra bytes");

    let first = first.context("no packets received")?;
    Ok((first, last, total))
}
