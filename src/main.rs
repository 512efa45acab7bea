use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gatecheck::config::Config;
use gatecheck::db::{self, AppState};
use gatecheck::email::EmailService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let db = db::open_pool(&config.database_path)?;
    let email = EmailService::new(config.resend_api_key.clone(), config.email_from.clone());

    let addr = config.addr();
    let state = AppState {
        db,
        config: Arc::new(config),
        email,
    };

    let app = gatecheck::app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "gatecheck listening");
    axum::serve(listener, app).await?;

    Ok(())
}
