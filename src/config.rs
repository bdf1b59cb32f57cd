use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;
use tokio::time::Duration;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    #[serde(default = "default_rate_limit_sweep_interval_ms")]
    pub rate_limit_sweep_interval_ms: u64,

    #[serde(default = "default_bulk_batch_size")]
    pub bulk_batch_size: usize,

    #[serde(default = "default_bulk_batch_pause_ms")]
    pub bulk_batch_pause_ms: u64,

    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    #[serde(default = "default_push_batch_ceiling")]
    pub push_batch_ceiling: usize,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default)]
    pub fcm_project_id: Option<String>,

    #[serde(default)]
    pub email_webhook_url: Option<String>,

    #[serde(default)]
    pub sms_webhook_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn bulk_batch_pause(&self) -> Duration {
        Duration::from_millis(self.bulk_batch_pause_ms)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_sweep_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate_limit_window_ms: default_rate_limit_window_ms(),
            rate_limit_sweep_interval_ms: default_rate_limit_sweep_interval_ms(),
            bulk_batch_size: default_bulk_batch_size(),
            bulk_batch_pause_ms: default_bulk_batch_pause_ms(),
            provider_timeout_ms: default_provider_timeout_ms(),
            push_batch_ceiling: default_push_batch_ceiling(),
            server_port: default_server_port(),
            redis_url: None,
            fcm_project_id: None,
            email_webhook_url: None,
            sms_webhook_url: None,
        }
    }
}

fn default_rate_limit_window_ms() -> u64 {
    60_000
}

fn default_rate_limit_sweep_interval_ms() -> u64 {
    30_000
}

fn default_bulk_batch_size() -> usize {
    50
}

fn default_bulk_batch_pause_ms() -> u64 {
    100
}

fn default_provider_timeout_ms() -> u64 {
    10_000
}

fn default_push_batch_ceiling() -> usize {
    500
}

fn default_server_port() -> u16 {
    8080
}
