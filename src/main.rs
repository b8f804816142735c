use invoice_extractor::config::{self, Config};
use invoice_extractor::llm_extract::LlmClient;
use invoice_extractor::web::{self, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A local .env may hold the API key.
    dotenvy::dotenv().ok();

    // init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    let cfg = Config::load_or_default(config::DEFAULT_CONFIG_PATH)?;
    let api_key = cfg
        .llm
        .resolve_api_key(std::env::var(config::API_KEY_ENV).ok())?;
    let llm = LlmClient::new(&cfg.llm, api_key)?;

    let state = AppState::new(&cfg, Arc::new(llm))?;
    let listener = TcpListener::bind(&cfg.server.bind).await?;
    info!(
        bind = %cfg.server.bind,
        backend = ?cfg.pdf.backend,
        model = %cfg.llm.model,
        "Starting invoice extractor"
    );

    web::serve(listener, state).await?;
    Ok(())
}
