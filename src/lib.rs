pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod server;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use api::AppState;
use config::Config;
use model_gateway::GeminiGateway;

pub async fn run() -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting gemini-chat");
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        warn!(error = %err, "failed to load .env file");
    }

    let cfg = Config::from_env()?;
    info!(
        model = %cfg.model,
        base_url = %cfg.base_url,
        timeout_secs = cfg.timeout_secs,
        bind_addr = %cfg.bind_addr,
        "loaded runtime configuration"
    );

    let bind_addr = cfg.bind_addr;
    let gateway = GeminiGateway::new(cfg)?;
    let app = api::build_router(AppState::new(Arc::new(gateway)));

    server::serve(app, bind_addr).await
}
