use anyhow::{Context, Result, anyhow};
use std::env;
use std::fmt;
use std::net::SocketAddr;

const DEFAULT_MODEL: &str = "gemini-pro";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub bind_addr: SocketAddr,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let api_key = non_blank(get_var("GEMINI_API_KEY")).ok_or_else(|| {
            anyhow!("Missing GEMINI_API_KEY. Add it to your .env file or export it in the shell.")
        })?;
        let model =
            non_blank(get_var("GEMINI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = parse_base_url(get_var("GEMINI_BASE_URL").as_deref());
        let timeout_secs = parse_timeout_secs(get_var("GEMINI_TIMEOUT_SECS").as_deref());
        let bind_addr = parse_bind_addr(get_var("BIND_ADDR").as_deref())?;

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout_secs,
            bind_addr,
        })
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_base_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

fn parse_bind_addr(raw: Option<&str>) -> Result<SocketAddr> {
    let value = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BIND_ADDR);
    value.parse::<SocketAddr>().with_context(|| {
        format!("Invalid BIND_ADDR '{value}'. Expected host:port, e.g. {DEFAULT_BIND_ADDR}.")
    })
}
