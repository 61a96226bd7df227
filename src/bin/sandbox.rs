use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use central_pet_care::{
    config::AppConfig,
    sandbox::{self, SandboxState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,central_pet_care=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let state = SandboxState::seeded();
    tracing::info!(products = state.catalog.len(), "sandbox catalog seeded");

    let app = sandbox::app(state);
    let addr = SocketAddr::from((
        config.sandbox_host.parse::<std::net::IpAddr>()?,
        config.sandbox_port,
    ));
    tracing::info!("sandbox listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
