//! Passgate token authority server binary.
//!
//! Seeds the default roles, users, and demo client on startup, then serves
//! the token and role administration endpoints.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use passgate_core::{seed, store::CredentialStore};

/// CLI arguments for the token authority server.
#[derive(Parser, Debug)]
#[command(name = "passgate_server", about = "Passgate token authority server")]
struct Args {
    /// Address to bind (overrides BIND_ADDR).
    #[arg(long)]
    bind_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passgate_api=debug,passgate_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let mut config = passgate_api::config::ApiConfig::from_env();
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }

    let store = Arc::new(CredentialStore::new());
    let report = seed::seed(&store)?;
    info!(
        roles_created = report.roles_created,
        claims_added = report.claims_added,
        users_registered = report.users_registered,
        clients_registered = report.clients_registered,
        "store seeded"
    );

    let state = passgate_api::AppState {
        store,
        config: config.clone(),
    };
    let app = passgate_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "token authority listening");

    axum::serve(listener, app).await?;

    Ok(())
}
