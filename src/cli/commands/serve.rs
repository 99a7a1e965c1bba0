use anyhow::Context;
use clap::Args;

use crate::config;
use crate::database::DatabaseManager;
use crate::Storage;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (defaults to API_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Serve from in-process tables instead of Postgres")]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    config.validate().map_err(anyhow::Error::msg)?;
    tracing::info!("Starting storefront admin API in {:?} mode", config.environment);

    let storage = if args.in_memory {
        if crate::is_production!() {
            tracing::warn!("Serving in-memory tables in production; nothing will persist");
        }
        Storage::in_memory()
    } else {
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        Storage::postgres(pool)?
    };

    let router = crate::app(config, storage)?;

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
