use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::clients::{
    audit::AuditSink, profiles::RecipientProfiles, provider::ProviderRegistry,
    ratelimit_store::RateLimitStore, store::NotificationStore, template_store::TemplateStore,
};
use crate::config::Config;
use crate::engine::{
    dispatcher::ChannelDispatcher, router::ChannelRouter, template::TemplateEngine,
    tracker::DeliveryTracker,
};
use crate::error::NotifyError;
use crate::models::{
    audit::AuditRecord,
    channel::{Channel, ChannelOutcome},
    notification::{
        ChannelStatusEntry, Notification, NotificationIntent, NotificationType, Priority,
    },
    validation::validate_intent,
};

/// Options for template-based sends; everything defaults to the plain-send
/// behavior when absent.
#[derive(Debug, Clone, Default)]
pub struct TemplateSendOptions {
    pub notification_type: Option<NotificationType>,
    pub channels: Vec<Channel>,
    pub priority: Priority,
    pub data: JsonValue,
    pub issuer_id: Option<String>,
    pub provider_id: Option<String>,
}

/// The single entry point for sends: validate, rate-limit, route, persist,
/// fan out, aggregate, audit.
pub struct NotificationOrchestrator {
    store: Arc<dyn NotificationStore>,
    profiles: Arc<dyn RecipientProfiles>,
    templates: Arc<dyn TemplateStore>,
    audit: Arc<dyn AuditSink>,
    rate_limits: Arc<dyn RateLimitStore>,
    dispatcher: ChannelDispatcher,
    tracker: DeliveryTracker,
    rate_limit_window_ms: u64,
}

impl NotificationOrchestrator {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        profiles: Arc<dyn RecipientProfiles>,
        templates: Arc<dyn TemplateStore>,
        audit: Arc<dyn AuditSink>,
        rate_limits: Arc<dyn RateLimitStore>,
        registry: Arc<ProviderRegistry>,
        config: &Config,
    ) -> Self {
        let tracker = DeliveryTracker::new(Arc::clone(&store));
        let dispatcher = ChannelDispatcher::new(registry, tracker.clone(), config);

        Self {
            store,
            profiles,
            templates,
            audit,
            rate_limits,
            dispatcher,
            tracker,
            rate_limit_window_ms: config.rate_limit_window_ms,
        }
    }

    /// Sends one notification. Validation and rate-limit denial abort before
    /// any persistence; channel failures fold into per-channel status and the
    /// call still returns the notification, possibly with `Failed` status.
    /// Each call creates one new notification; no deduplication is performed.
    pub async fn send(&self, intent: NotificationIntent) -> Result<Notification, NotifyError> {
        validate_intent(&intent)?;

        let rate_key = format!("{}:{}", intent.recipient_id, intent.notification_type);
        let decision = self
            .rate_limits
            .check(
                &rate_key,
                self.rate_limit_window_ms,
                intent.notification_type.max_per_window(),
            )
            .await?;

        if !decision.allowed {
            info!(
                recipient_id = %intent.recipient_id,
                notification_type = %intent.notification_type,
                retry_after_seconds = decision.retry_after_seconds.unwrap_or(0),
                "Send denied by rate limiter"
            );
            return Err(NotifyError::RateLimitExceeded {
                retry_after_seconds: decision.retry_after_seconds.unwrap_or(1),
            });
        }

        let profile = self
            .profiles
            .get(&intent.recipient_id)
            .await?
            .ok_or_else(|| NotifyError::RecipientNotFound(intent.recipient_id.clone()))?;

        let channels = ChannelRouter::resolve(&intent, &profile);

        let mut notification = Notification::from_intent(&intent, channels.clone());
        self.store.create(&notification).await?;

        debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            channel_count = channels.len(),
            "Notification persisted, dispatching"
        );

        // Settle-all fan-out: every channel runs to its own outcome; one
        // channel's failure never cancels a sibling's in-flight dispatch.
        let dispatches = channels.iter().map(|channel| {
            self.dispatcher.dispatch(
                &notification,
                *channel,
                &profile,
                intent.provider_id.as_deref(),
            )
        });
        let outcomes: Vec<ChannelOutcome> = join_all(dispatches).await;

        let mut channel_status = HashMap::new();
        for outcome in &outcomes {
            if let Err(e) = self.tracker.record_attempt(&notification.id, outcome).await {
                warn!(
                    notification_id = %notification.id,
                    channel = %outcome.channel,
                    error = %e,
                    "Failed to record channel outcome"
                );
            }
            channel_status.insert(outcome.channel, ChannelStatusEntry::from_outcome(outcome));
        }

        let status = DeliveryTracker::aggregate_status(&channel_status);
        self.store.update_status(&notification.id, status).await?;

        notification.status = status;
        notification.channel_status = channel_status;
        notification.updated_at = Utc::now();

        info!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            status = %status,
            "Notification send settled"
        );

        self.audit_send(&notification).await;

        Ok(notification)
    }

    /// Template-based send: fetch, render title and body, then proceed as a
    /// normal intent. Missing variables warn and render verbatim.
    pub async fn send_from_template(
        &self,
        recipient_id: &str,
        template_id: &str,
        variables: JsonValue,
        options: TemplateSendOptions,
    ) -> Result<Notification, NotifyError> {
        let template = self
            .templates
            .get(template_id)
            .await?
            .ok_or_else(|| NotifyError::TemplateNotFound(template_id.to_string()))?;

        let mut missing = TemplateEngine::find_missing_variables(&template.subject, &variables);
        for name in TemplateEngine::find_missing_variables(&template.body, &variables) {
            if !missing.contains(&name) {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            warn!(
                template_id = %template.id,
                missing = ?missing,
                "Template variables unresolved, sending with placeholders intact"
            );
        }

        let title = TemplateEngine::render(&template.subject, &variables);
        let body = TemplateEngine::render(&template.body, &variables);

        let mut channels = options.channels;
        if channels.is_empty() {
            if let Some(channel) = template.channel {
                channels = vec![channel];
            }
        }

        let mut intent = NotificationIntent::new(
            recipient_id,
            options.notification_type.unwrap_or(NotificationType::General),
            title,
            body,
        )
        .with_channels(channels)
        .with_priority(options.priority)
        .with_data(options.data);

        intent.issuer_id = options.issuer_id;
        intent.provider_id = options.provider_id;

        self.send(intent).await
    }

    pub async fn unread_count(&self, recipient_id: &str) -> Result<u64, NotifyError> {
        self.store.unread_count(recipient_id).await
    }

    pub async fn mark_read(
        &self,
        notification_id: &str,
        recipient_id: &str,
    ) -> Result<(), NotifyError> {
        self.store.mark_read(notification_id, recipient_id).await
    }

    pub async fn mark_all_read(&self, recipient_id: &str) -> Result<u64, NotifyError> {
        self.store.mark_all_read(recipient_id).await
    }

    /// Post-settlement audit write. Sink failures are logged and swallowed.
    async fn audit_send(&self, notification: &Notification) {
        let record = AuditRecord::new("notification.send", &notification.id)
            .with_status(notification.status)
            .with_channels(notification.channels.clone())
            .with_metadata(serde_json::json!({
                "recipient_id": notification.recipient_id,
                "notification_type": notification.notification_type,
                "priority": notification.priority,
            }));

        let record = match &notification.issuer_id {
            Some(issuer) => record.with_actor(issuer.clone()),
            None => record,
        };

        if let Err(e) = self.audit.record(record).await {
            warn!(
                notification_id = %notification.id,
                error = %e,
                "Failed to write audit record"
            );
        }
    }
}
