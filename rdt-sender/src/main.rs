//! RDT sender — entry point.
//!
//! ```text
//! rdt-sender file.bin                         Send with config/default peer
//! rdt-sender file.bin --peer 10.0.0.2:20001   Send to an explicit peer
//! rdt-sender --config sender.toml file.bin    Load a custom config TOML
//! rdt-sender --gen-config                     Write default config to stdout
//! ```

mod chunks;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rdt_core::Sender;

use crate::chunks::FileChunks;
use crate::config::SenderConfig;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rdt-sender", about = "Send a file over the RDT-over-UDP protocol")]
struct Cli {
    /// File to transfer.
    #[arg(required_unless_present = "gen_config")]
    file: Option<PathBuf>,

    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "rdt-sender.toml")]
    config: PathBuf,

    /// Peer address as host:port (overrides the config).
    #[arg(short, long)]
    peer: Option<String>,

    /// Local UDP port to bind, 0 for ephemeral (overrides the config).
    #[arg(short, long)]
    local_port: Option<u16>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&SenderConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = SenderConfig::load(&cli.config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let Some(file) = cli.file else {
        return Err("FILE is required".into());
    };

    let peer_name = cli.peer.unwrap_or_else(|| {
        format!("{}:{}", config.network.peer_host, config.network.peer_port)
    });
    let peer: SocketAddr = tokio::net::lookup_host(&peer_name)
        .await?
        .next()
        .ok_or_else(|| format!("could not resolve peer {peer_name}"))?;
    let local_port = cli.local_port.unwrap_or(config.network.local_port);

    info!("rdt-sender v{}", env!("CARGO_PKG_VERSION"));
    info!("sending {} to {peer}", file.display());

    let mut chunks = FileChunks::open(&file)?;
    let total_bytes = chunks.file_len();
    let started = Instant::now();

    let sender = Sender::new(local_port, peer, &mut chunks);
    let retransmissions = sender.run().await?;

    if let Some(err) = chunks.take_error() {
        return Err(Box::new(err) as Box<dyn std::error::Error>);
    }

    let secs = started.elapsed().as_secs_f64();
    let throughput = if secs > 0.0 {
        total_bytes as f64 / (1024.0 * 1024.0) / secs
    } else {
        0.0
    };
    println!("Re-transferred packets: {retransmissions}");
    println!("Sent {total_bytes} bytes in {secs:.3} s ({throughput:.2} MiB/s)");

    Ok(())
}
