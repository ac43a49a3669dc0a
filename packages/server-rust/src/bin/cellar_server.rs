//! `cellar-server` binary: parse configuration, open the store, serve.

use std::sync::Arc;

use anyhow::Context;
use cellar_server::cli::ServerArgs;
use cellar_server::network::{shutdown_signal, NetworkModule};
use cellar_server::render::Views;
use cellar_server::storage::open_store;
use cellar_server::telemetry::init_tracing;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("cellar-server error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_format)?;

    let storage = args.storage_config()?;
    let store = open_store(&storage)
        .await
        .with_context(|| format!("failed to open {} store", storage.backend_name()))?;
    let views = Arc::new(Views::new().context("failed to load page templates")?);

    let mut module = NetworkModule::new(args.network_config(), store, views);
    let port = module.start().await.context("failed to bind listener")?;
    info!(host = %args.host, port, backend = storage.backend_name(), "cellar server listening");

    module.serve(shutdown_signal()).await
}
