// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barcode-scanner")]
#[command(about = "Scan barcodes with a camera")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras, marking the one used for scanning
    List {
        /// Config file (default: ~/.config/barcode-scanner/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Scan a barcode and print its contents
    Scan {
        /// Read frames from still images instead of a camera (repeatable)
        #[arg(short, long)]
        image: Vec<PathBuf>,

        /// Start decoding as soon as the preview is up
        #[arg(short, long)]
        auto: bool,

        /// Config file (default: ~/.config/barcode-scanner/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barcode_scanner=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { config } => cli::list_cameras(config),
        Commands::Scan {
            image,
            auto,
            config,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(cli::scan(image, auto, config))
        }
    }
}
