// Prepaid Ledger Viewer - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use prepaid_ledger::web::{router, AppState};
use prepaid_ledger::{init_logging, Config, LedgerSource};
use tracing::info;

/// Serve the prepaid balance page over HTTP
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct ServerArgs {
    #[command(flatten)]
    config: Config,

    /// Address to listen on
    #[arg(long, env = "PREPAID_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    init_logging("info");

    let source = args.config.open_source();
    info!(source = %source.describe(), "Ledger source configured");

    let state = AppState::new(source, args.config.settings());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", args.addr))?;

    info!(addr = %args.addr, "Server running");
    println!("\n🚀 Server running on http://{}", args.addr);
    println!("   API: http://{}/api/page?store=<NAME>", args.addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
