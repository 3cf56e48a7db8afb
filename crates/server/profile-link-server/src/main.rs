use anyhow::Result;
use profile_link_server::{AppState, Config, router, telemetry};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    telemetry::init_tracing(&config.logging);

    if config.provider.domain.is_empty() {
        warn!("Provider domain is not set; the login link is hidden and callbacks will fail");
    }

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let addr = config.socket_addr();
    info!("Profile link server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
