use clap::Parser;
use tracing_subscriber::EnvFilter;

use circuit_cubes::cli::Cli;

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=circuit_cubes=debug for wire-level detail)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = circuit_cubes::cli::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
