//! duplink example — drives a simulated link end to end and reports the
//! observed latency and throughput.
//!
//! Run with:
//!   cargo run -p duplink-example
//!   cargo run -p duplink-example -- --latency-ms 280 --bandwidth-kbps 512

use std::time::Duration;

use clap::Parser;

use duplink_pipe::PipeConfig;

mod pipe_demo;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "duplink-example", about = "duplink simulated-link demo runner")]
struct Config {
    // ---
    /// One-way propagation latency in milliseconds.
    #[arg(long, default_value_t = 50)]
    latency_ms: u64,

    /// Link bandwidth in kilobits per second (0 = unpaced).
    #[arg(long, default_value_t = 1024)]
    bandwidth_kbps: u64,

    /// Packet payload size in bytes (also the link MTU).
    #[arg(long, default_value_t = 8192)]
    packet_size: usize,

    /// Number of packets to push through the link.
    #[arg(long, default_value_t = 32)]
    packets: usize,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ---
    let cfg = Config::parse();

    let no_color = std::env::var("EMACS").is_ok()
        || std::env::var("NO_COLOR").is_ok()
        || std::env::var("CARGO_TERM_COLOR").as_deref() == Ok("never")
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .with_ansi(!no_color)
        .init();

    let pipe_config = PipeConfig {
        mtu: cfg.packet_size,
        latency: Duration::from_millis(cfg.latency_ms),
        ..PipeConfig::default()
    }
    .bandwidth_bps(cfg.bandwidth_kbps * 1000);

    println!("=== duplink pipe demo ===");
    pipe_demo::run(pipe_config, cfg.packets, cfg.packet_size).await?;

    Ok(())
}
