use std::sync::Arc;

use futures_util::future::join_all;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::orchestrator::NotificationOrchestrator;
use crate::models::bulk::{BulkError, BulkRequest, BulkResult};

/// Bounded fan-out over a recipient list: sends run concurrently within a
/// batch, batches run strictly sequentially with a fixed pause between them
/// to smooth load on downstream providers. The pause is a configured policy,
/// not an adaptive one.
pub struct BatchProcessor {
    orchestrator: Arc<NotificationOrchestrator>,
    batch_size: usize,
    batch_pause: Duration,
}

impl BatchProcessor {
    pub fn new(orchestrator: Arc<NotificationOrchestrator>, config: &Config) -> Self {
        Self {
            orchestrator,
            batch_size: config.bulk_batch_size.max(1),
            batch_pause: config.bulk_batch_pause(),
        }
    }

    /// Per-recipient failures are caught and recorded; they never abort the
    /// batch or the batches after it. `sent + failed == total` exactly.
    pub async fn send_bulk(&self, request: BulkRequest) -> BulkResult {
        let total = request.recipient_ids.len();
        let batch_size = request.batch_size.unwrap_or(self.batch_size).max(1);

        let mut notifications = Vec::new();
        let mut errors: Vec<BulkError> = Vec::new();

        let batches: Vec<&[String]> = request.recipient_ids.chunks(batch_size).collect();
        let batch_count = batches.len();

        info!(
            total,
            batch_size,
            batch_count,
            notification_type = %request.notification_type,
            "Starting bulk send"
        );

        for (index, batch) in batches.iter().enumerate() {
            let sends = batch.iter().map(|recipient_id| {
                let intent = request.intent_for(recipient_id);
                async move { (recipient_id.clone(), self.orchestrator.send(intent).await) }
            });

            for (recipient_id, result) in join_all(sends).await {
                match result {
                    Ok(notification) => notifications.push(notification),
                    Err(e) => {
                        warn!(
                            recipient_id = %recipient_id,
                            error = %e,
                            "Bulk recipient send failed"
                        );
                        errors.push(BulkError {
                            recipient_id,
                            error: e.to_string(),
                        });
                    }
                }
            }

            debug!(
                batch = index + 1,
                batch_count,
                sent_so_far = notifications.len(),
                failed_so_far = errors.len(),
                "Bulk batch settled"
            );

            if index + 1 < batch_count {
                sleep(self.batch_pause).await;
            }
        }

        let result = BulkResult {
            total,
            sent: notifications.len(),
            failed: errors.len(),
            notifications,
            errors,
        };

        info!(
            total = result.total,
            sent = result.sent,
            failed = result.failed,
            "Bulk send complete"
        );

        result
    }
}
