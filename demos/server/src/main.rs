//! Pagelets demo server.
//!
//! Serves the same URLs two ways:
//! - with the `x-pagelet-request` header (sent by the pagelets client), as a
//!   framed pagelet response
//! - without it, as a full HTML page built from the response's main content
//!
//! Run:
//!   cargo run -p pagelets-demo-server -- --port 8080 --name "Pagelets Demo"
//!
//! Then:
//!   curl localhost:8080/pagelet
//!   curl -H 'x-pagelet-request: 1' localhost:8080/custom.json

mod layout;
mod server;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pagelets-demo")]
#[command(about = "Serve pagelet responses for the pagelets client")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PAGELETS_PORT", default_value_t = 8080)]
    port: u16,

    /// Site name shown in the page layout.
    #[arg(long, env = "PAGELETS_NAME", default_value = "Pagelets Demo")]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pagelets_demo=info".parse()?))
        .init();

    let args = Args::parse();
    tracing::info!("Starting '{}' on port {}", args.name, args.port);

    server::run(args.port, args.name).await
}
