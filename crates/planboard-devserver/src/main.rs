use std::net::SocketAddr;

use planboard_devserver::{serve, AppState, Config};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planboard_devserver=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let addr = SocketAddr::from((config.host, config.port));
    tracing::info!("Development backend listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    serve(listener, AppState::default()).await?;

    Ok(())
}
