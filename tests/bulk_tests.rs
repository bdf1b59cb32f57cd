use std::sync::Arc;

use anyhow::Result;
use notify_dispatch::{
    engine::batch::BatchProcessor,
    models::{
        bulk::BulkRequest,
        channel::Channel,
        notification::{NotificationStatus, NotificationType},
    },
};
use tokio::time::Instant;

use crate::support::{ProviderScript, ScriptedProvider, full_profile, harness};

/// Test: Bulk counts are exact and batches are paced
#[tokio::test]
async fn test_bulk_120_recipients_three_batches() -> Result<()> {
    let h = harness(vec![]);

    let recipient_ids: Vec<String> = (1..=120).map(|i| format!("r{}", i)).collect();
    for id in &recipient_ids {
        h.profiles.insert(full_profile(id));
    }

    let processor = BatchProcessor::new(h.orchestrator.clone(), &h.config);
    let request = BulkRequest::new(
        recipient_ids,
        NotificationType::Announcement,
        "All hands",
        "Company meeting on Friday",
    )
    .with_channels(vec![Channel::InApp])
    .with_batch_size(50);

    let start = Instant::now();
    let result = processor.send_bulk(request).await;
    let elapsed = start.elapsed().as_millis();

    assert_eq!(result.total, 120);
    assert_eq!(result.sent + result.failed, 120);
    assert_eq!(result.failed, 0);
    assert_eq!(result.notifications.len(), result.sent);
    assert_eq!(h.store.len(), 120);

    // Three batches (50/50/20) means two inter-batch pauses of 100ms each.
    assert!(
        elapsed >= 200,
        "expected at least two inter-batch pauses, elapsed {}ms",
        elapsed
    );

    Ok(())
}

/// Test: Individual recipient failures are recorded and never abort the batch
#[tokio::test]
async fn test_bulk_partial_failures_are_recorded() -> Result<()> {
    let h = harness(vec![]);

    // Only even-numbered recipients have profiles; the rest fail lookup.
    let recipient_ids: Vec<String> = (1..=10).map(|i| format!("r{}", i)).collect();
    for i in (2..=10).step_by(2) {
        h.profiles.insert(full_profile(&format!("r{}", i)));
    }

    let processor = BatchProcessor::new(h.orchestrator.clone(), &h.config);
    let request = BulkRequest::new(
        recipient_ids,
        NotificationType::Announcement,
        "Notice",
        "Body",
    )
    .with_channels(vec![Channel::InApp])
    .with_batch_size(3);

    let result = processor.send_bulk(request).await;

    assert_eq!(result.total, 10);
    assert_eq!(result.sent, 5);
    assert_eq!(result.failed, 5);
    assert_eq!(result.sent + result.failed, result.total);
    assert_eq!(result.notifications.len(), 5);
    assert_eq!(result.errors.len(), 5);

    let mut failed_ids: Vec<&str> = result.errors.iter().map(|e| e.recipient_id.as_str()).collect();
    failed_ids.sort();
    assert_eq!(failed_ids, vec!["r1", "r3", "r5", "r7", "r9"]);
    assert!(result.errors.iter().all(|e| e.error.contains("recipient not found")));

    Ok(())
}

/// Test: A recipient whose channels all fail still counts as sent (accepted but undeliverable)
#[tokio::test]
async fn test_undeliverable_recipient_counts_as_sent() -> Result<()> {
    let email = Arc::new(ScriptedProvider::new(
        "email-1",
        Channel::Email,
        1,
        ProviderScript::Fail("relay down"),
    ));

    let h = harness(vec![email.clone()]);
    h.profiles.insert(full_profile("r1"));
    h.profiles.insert(full_profile("r2"));

    let processor = BatchProcessor::new(h.orchestrator.clone(), &h.config);
    let request = BulkRequest::new(
        vec!["r1".to_string(), "r2".to_string()],
        NotificationType::General,
        "Hello",
        "Body",
    )
    .with_channels(vec![Channel::Email]);

    let result = processor.send_bulk(request).await;

    assert_eq!(result.sent, 2);
    assert_eq!(result.failed, 0);
    assert!(
        result
            .notifications
            .iter()
            .all(|n| n.status == NotificationStatus::Failed),
        "undeliverable sends are accepted, with Failed status on the notification"
    );

    Ok(())
}

/// Test: A single batch pays no inter-batch pause
#[tokio::test]
async fn test_single_batch_has_no_pause() -> Result<()> {
    let h = harness(vec![]);
    for i in 1..=10 {
        h.profiles.insert(full_profile(&format!("r{}", i)));
    }

    let processor = BatchProcessor::new(h.orchestrator.clone(), &h.config);
    let request = BulkRequest::new(
        (1..=10).map(|i| format!("r{}", i)).collect(),
        NotificationType::Announcement,
        "Notice",
        "Body",
    )
    .with_channels(vec![Channel::InApp])
    .with_batch_size(50);

    let start = Instant::now();
    let result = processor.send_bulk(request).await;
    let elapsed = start.elapsed().as_millis();

    assert_eq!(result.sent, 10);
    assert!(elapsed < 100, "one batch must not sleep, elapsed {}ms", elapsed);

    Ok(())
}

/// Test: An empty recipient list yields an empty, consistent result
#[tokio::test]
async fn test_bulk_empty_request() -> Result<()> {
    let h = harness(vec![]);
    let processor = BatchProcessor::new(h.orchestrator.clone(), &h.config);

    let request = BulkRequest::new(
        Vec::new(),
        NotificationType::Announcement,
        "Notice",
        "Body",
    );

    let result = processor.send_bulk(request).await;

    assert_eq!(result.total, 0);
    assert_eq!(result.sent, 0);
    assert_eq!(result.failed, 0);
    assert!(result.notifications.is_empty());
    assert!(result.errors.is_empty());

    Ok(())
}
