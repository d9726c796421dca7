//! RDT receiver — entry point.
//!
//! ```text
//! rdt-receiver out.bin                       Receive with config/default port
//! rdt-receiver out.bin --port 20001          Listen on an explicit port
//! rdt-receiver --config recv.toml out.bin    Load a custom config TOML
//! rdt-receiver --gen-config                  Write default config to stdout
//! ```

mod config;
mod stats;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rdt_core::Receiver;

use crate::config::ReceiverConfig;
use crate::stats::TransferStats;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "rdt-receiver",
    about = "Receive a file over the RDT-over-UDP protocol"
)]
struct Cli {
    /// Output file for the received bytes.
    #[arg(required_unless_present = "gen_config")]
    output: Option<PathBuf>,

    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "rdt-receiver.toml")]
    config: PathBuf,

    /// Host address to bind (overrides the config).
    #[arg(short, long)]
    bind: Option<String>,

    /// UDP port to listen on (overrides the config).
    #[arg(short, long)]
    port: Option<u16>,

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
        let text = toml::to_string_pretty(&ReceiverConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = ReceiverConfig::load(&cli.config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let Some(output) = cli.output else {
        return Err("OUTPUT is required".into());
    };

    let host = cli.bind.unwrap_or(config.network.bind_host);
    let port = cli.port.unwrap_or(config.network.port);

    info!("rdt-receiver v{}", env!("CARGO_PKG_VERSION"));
    let mut receiver = Receiver::bind(&host, port).await?;
    info!("listening on {}", receiver.local_addr()?);

    let mut out = BufWriter::new(File::create(&output)?);
    let mut stats = TransferStats::new();
    while let Some(chunk) = receiver.next_chunk().await? {
        stats.record(chunk.sent_at, chunk.received_at, chunk.payload.len());
        out.write_all(&chunk.payload)?;
    }
    out.flush()?;

    println!(
        "Received {} bytes in {} packets into {}",
        stats.byte_count(),
        stats.chunk_count(),
        output.display()
    );
    println!(
        "Packets Average Transmission Time: {:.6} ms",
        stats.average_transmission_ms()
    );
    println!(
        "Communication Total Transmission Time: {:.6} ms",
        stats.total_transmission_ms()
    );

    Ok(())
}
