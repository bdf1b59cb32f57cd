use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::error::NotifyError;
use crate::models::audit::AuditRecord;

/// Fire-and-forget audit boundary. Callers swallow errors from this sink;
/// an audit failure must never fail the operation being audited.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<(), NotifyError>;
}

/// Default sink: emits audit records as structured log events.
#[derive(Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), NotifyError> {
        info!(
            action = %record.action,
            subject_id = %record.subject_id,
            actor_id = record.actor_id.as_deref().unwrap_or("-"),
            status = record.status.map(|s| s.to_string()).unwrap_or_default(),
            error = record.error_message.as_deref().unwrap_or(""),
            "audit"
        );
        Ok(())
    }
}

/// Collecting sink for tests and local inspection.
#[derive(Default)]
pub struct InMemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), NotifyError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}
