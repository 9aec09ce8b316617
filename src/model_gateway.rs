use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::Config;
use crate::model::Generation;
use crate::providers;

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<Generation>> + Send + 'a>>;

/// Single-shot access to a generative model.
///
/// Implementations are shared across concurrent requests and must not keep
/// per-call state.
pub trait ModelGateway: Send + Sync {
    fn model(&self) -> &str;

    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a>;
}

/// Gateway bound to the Gemini REST API. Holds one pooled HTTP client for
/// the lifetime of the process.
pub struct GeminiGateway {
    client: Client,
    cfg: Config,
}

impl GeminiGateway {
    pub fn new(cfg: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to initialize HTTP client")?;
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: Client, cfg: Config) -> Self {
        Self { client, cfg }
    }
}

impl ModelGateway for GeminiGateway {
    fn model(&self) -> &str {
        &self.cfg.model
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a> {
        Box::pin(providers::gemini::generate_content(
            &self.client,
            &self.cfg,
            prompt,
        ))
    }
}
