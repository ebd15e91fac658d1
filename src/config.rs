use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::quote::{FeedCategory, Instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub ticket: TicketConfig,
    pub instrument: InstrumentConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
    #[serde(default = "default_transactions_path")]
    pub transactions_path: String,
    #[serde(default = "default_quote_path")]
    pub quote_path: String,
    /// Session token sent as the `auth_token` cookie.
    #[serde(skip)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketConfig {
    pub default_leverage: u32,
    pub max_leverage: u32,
    pub feedback_clear_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub feed: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub quote_poll_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_profile_path() -> String {
    "user/profile".to_string()
}

fn default_transactions_path() -> String {
    "trade/transactions".to_string()
}

fn default_quote_path() -> String {
    "market/quote".to_string()
}

impl BrokerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl TicketConfig {
    pub fn feedback_clear_after(&self) -> Duration {
        Duration::from_millis(self.feedback_clear_ms)
    }

    /// Clamp a leverage value into the widget range `1..=max_leverage`.
    pub fn clamp_leverage(&self, leverage: u32) -> u32 {
        leverage.clamp(1, self.max_leverage.max(1))
    }
}

impl InstrumentConfig {
    pub fn instrument(&self) -> Result<Instrument> {
        let feed: FeedCategory = self
            .feed
            .parse()
            .with_context(|| format!("instrument.feed '{}' is invalid", self.feed))?;
        Ok(Instrument::new(&self.symbol, feed))
    }
}

fn config_path() -> PathBuf {
    std::env::var("ORDER_TICKET_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/default.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = config_path();
        let mut config = Self::load_from_path(&path)?;
        config.broker.auth_token = std::env::var("ORDER_TICKET_AUTH_TOKEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.broker.base_url)
            .with_context(|| format!("broker.base_url '{}' is not a URL", self.broker.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("broker.base_url must be http or https, got '{}'", base.scheme());
        }
        if self.broker.request_timeout_ms == 0 {
            bail!("broker.request_timeout_ms must be > 0");
        }
        if self.ticket.max_leverage == 0 {
            bail!("ticket.max_leverage must be > 0");
        }
        if self.ticket.default_leverage == 0 || self.ticket.default_leverage > self.ticket.max_leverage {
            bail!(
                "ticket.default_leverage {} must be within 1..={}",
                self.ticket.default_leverage,
                self.ticket.max_leverage
            );
        }
        if self.ticket.feedback_clear_ms == 0 {
            bail!("ticket.feedback_clear_ms must be > 0");
        }
        if self.instrument.symbol.trim().is_empty() {
            bail!("instrument.symbol is empty");
        }
        self.instrument.instrument()?;
        Ok(())
    }
}
