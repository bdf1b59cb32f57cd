use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use tracing::info;
use tracing_subscriber::EnvFilter;

use notify_dispatch::{
    api::run_api_server,
    clients::{
        fcm_provider::FcmProvider,
        http_provider::HttpProvider,
        provider::ProviderRegistry,
        ratelimit_store::InMemoryRateLimitStore,
    },
    config::Config,
    models::channel::Channel,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(build_registry(&config)?);

    for channel in Channel::ALL {
        info!(
            %channel,
            active_providers = registry.active_count(channel),
            "Channel provider coverage"
        );
    }

    let rate_limits = InMemoryRateLimitStore::new();
    rate_limits.spawn_sweeper(config.rate_limit_sweep_interval());

    run_api_server(config, registry)
        .await
        .map_err(|e| anyhow!("API server failed: {}", e))
}

fn build_registry(config: &Config) -> Result<ProviderRegistry, Error> {
    let mut registry = ProviderRegistry::new();

    if let Some(url) = &config.email_webhook_url {
        registry.register(Arc::new(HttpProvider::new(
            "email-webhook",
            Channel::Email,
            url.clone(),
            1,
        )?));
    }

    if let Some(url) = &config.sms_webhook_url {
        registry.register(Arc::new(HttpProvider::new(
            "sms-webhook",
            Channel::Sms,
            url.clone(),
            1,
        )?));
    }

    if let Some(project_id) = &config.fcm_project_id {
        registry.register(Arc::new(FcmProvider::new("fcm", project_id.clone(), 1)));
    }

    Ok(registry)
}
