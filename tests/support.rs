#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use tokio::time::{Duration, sleep};

use notify_dispatch::{
    clients::{
        audit::{AuditSink, InMemoryAuditSink},
        profiles::InMemoryProfiles,
        provider::{ChannelProvider, ProviderRegistry},
        ratelimit_store::InMemoryRateLimitStore,
        store::InMemoryNotificationStore,
        template_store::InMemoryTemplateStore,
    },
    config::Config,
    engine::orchestrator::NotificationOrchestrator,
    error::NotifyError,
    models::{
        audit::AuditRecord,
        channel::{Channel, ChannelAddress, Delivery, ProviderReceipt},
        recipient::RecipientProfile,
    },
};

/// Scripted behaviors for test providers.
pub enum ProviderScript {
    /// Always delivers, reporting one delivery per address/token.
    Succeed,
    /// Always fails with the given message.
    Fail(&'static str),
    /// Sleeps past any reasonable provider timeout.
    Hang,
    /// Fails any push sub-batch containing the given token, succeeds otherwise.
    FailToken(&'static str),
}

pub struct ScriptedProvider {
    id: String,
    channel: Channel,
    priority: u8,
    active: bool,
    script: ProviderScript,
    pub calls: Arc<AtomicU32>,
    pub call_log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(id: &str, channel: Channel, priority: u8, script: ProviderScript) -> Self {
        Self {
            id: id.to_string(),
            channel,
            priority,
            active: true,
            script,
            calls: Arc::new(AtomicU32::new(0)),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Share one log across several providers to assert attempt ordering.
    pub fn with_call_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.call_log = log;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel(&self) -> Channel {
        self.channel
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn send(&self, delivery: &Delivery) -> Result<ProviderReceipt, NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_log.lock().unwrap().push(self.id.clone());

        let address_count = match &delivery.address {
            ChannelAddress::PushTokens(tokens) => tokens.len() as u32,
            _ => 1,
        };

        match &self.script {
            ProviderScript::Succeed => Ok(ProviderReceipt {
                message_id: Some(format!("{}-msg", self.id)),
                delivered: address_count,
                failed: 0,
            }),
            ProviderScript::Fail(message) => Err(NotifyError::Provider {
                provider_id: self.id.clone(),
                message: message.to_string(),
            }),
            ProviderScript::Hang => {
                sleep(Duration::from_secs(5)).await;
                Ok(ProviderReceipt {
                    message_id: Some(format!("{}-msg", self.id)),
                    delivered: address_count,
                    failed: 0,
                })
            }
            ProviderScript::FailToken(poison) => {
                if let ChannelAddress::PushTokens(tokens) = &delivery.address {
                    if tokens.iter().any(|t| t == poison) {
                        return Err(NotifyError::Provider {
                            provider_id: self.id.clone(),
                            message: format!("sub-batch containing {} rejected", poison),
                        });
                    }
                }
                Ok(ProviderReceipt {
                    message_id: Some(format!("{}-msg", self.id)),
                    delivered: address_count,
                    failed: 0,
                })
            }
        }
    }
}

/// Audit sink that always errors, for asserting that audit failures are
/// swallowed by the orchestrator.
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn record(&self, _record: AuditRecord) -> Result<(), NotifyError> {
        Err(NotifyError::Store("audit sink unavailable".to_string()))
    }
}

pub struct Harness {
    pub orchestrator: Arc<NotificationOrchestrator>,
    pub store: Arc<InMemoryNotificationStore>,
    pub profiles: Arc<InMemoryProfiles>,
    pub templates: Arc<InMemoryTemplateStore>,
    pub audit: Arc<InMemoryAuditSink>,
    pub rate_limits: Arc<InMemoryRateLimitStore>,
    pub registry: Arc<ProviderRegistry>,
    pub config: Config,
}

pub fn test_config() -> Config {
    Config {
        provider_timeout_ms: 200,
        bulk_batch_pause_ms: 100,
        ..Config::default()
    }
}

pub fn harness(providers: Vec<Arc<dyn ChannelProvider>>) -> Harness {
    harness_with_config(providers, test_config())
}

pub fn harness_with_config(providers: Vec<Arc<dyn ChannelProvider>>, config: Config) -> Harness {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    let registry = Arc::new(registry);

    let store = Arc::new(InMemoryNotificationStore::new());
    let profiles = Arc::new(InMemoryProfiles::new());
    let templates = Arc::new(InMemoryTemplateStore::new());
    let audit = Arc::new(InMemoryAuditSink::new());
    let rate_limits = Arc::new(InMemoryRateLimitStore::new());

    let orchestrator = Arc::new(NotificationOrchestrator::new(
        store.clone(),
        profiles.clone(),
        templates.clone(),
        audit.clone(),
        rate_limits.clone(),
        Arc::clone(&registry),
        &config,
    ));

    Harness {
        orchestrator,
        store,
        profiles,
        templates,
        audit,
        rate_limits,
        registry,
        config,
    }
}

pub fn full_profile(recipient_id: &str) -> RecipientProfile {
    RecipientProfile::new(recipient_id)
        .with_email(format!("{}@example.com", recipient_id))
        .with_phone("+15550100")
        .with_push_tokens(vec!["token-1".to_string(), "token-2".to_string()])
}
