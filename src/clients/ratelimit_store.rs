use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::models::ratelimit::{RateLimitDecision, RateLimitEntry};

/// Fixed-window counter store, injected at construction time. The in-memory
/// implementation is the single-process default; the Redis one shares the
/// window across instances.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn check(
        &self,
        key: &str,
        window_ms: u64,
        max_requests: u32,
    ) -> Result<RateLimitDecision, NotifyError>;
}

fn retry_after_seconds(remaining_ms: i64) -> u64 {
    ((remaining_ms.max(0) as u64) + 999) / 1000
}

fn reset_at_from_ms(reset_at_ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(reset_at_ms).unwrap_or_else(Utc::now)
}

/// Process-local window map. Reads and increments are last-writer-wins under
/// a plain mutex; an occasional extra send past the nominal limit is an
/// accepted trade for not serializing the hot path on a transactional guard.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Periodic sweep of expired windows, independent of lookups, so idle
    /// keys do not accumulate.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let entries = Arc::clone(&self.entries);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let now_ms = Utc::now().timestamp_millis();
                let mut map = entries.lock().unwrap();
                let before = map.len();
                map.retain(|_, entry| entry.reset_at_ms > now_ms);

                if before > map.len() {
                    debug!(
                        removed = before - map.len(),
                        remaining = map.len(),
                        "Swept expired rate limit windows"
                    );
                }
            }
        })
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check(
        &self,
        key: &str,
        window_ms: u64,
        max_requests: u32,
    ) -> Result<RateLimitDecision, NotifyError> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock().unwrap();

        let entry = entries.get(key);
        let fresh_window = match entry {
            None => true,
            Some(entry) => now_ms > entry.reset_at_ms,
        };

        if fresh_window {
            let reset_at_ms = now_ms + window_ms as i64;
            entries.insert(
                key.to_string(),
                RateLimitEntry {
                    count: 1,
                    reset_at_ms,
                },
            );

            return Ok(RateLimitDecision {
                allowed: true,
                remaining: max_requests.saturating_sub(1),
                reset_at: reset_at_from_ms(reset_at_ms),
                retry_after_seconds: None,
            });
        }

        let entry = entries.get_mut(key).unwrap();

        if entry.count < max_requests {
            entry.count += 1;
            Ok(RateLimitDecision {
                allowed: true,
                remaining: max_requests - entry.count,
                reset_at: reset_at_from_ms(entry.reset_at_ms),
                retry_after_seconds: None,
            })
        } else {
            Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: reset_at_from_ms(entry.reset_at_ms),
                retry_after_seconds: Some(retry_after_seconds(entry.reset_at_ms - now_ms)),
            })
        }
    }
}

/// Shared keyed-counter alternative for multi-instance deployments.
pub struct RedisRateLimitStore {
    connection: MultiplexedConnection,
}

impl RedisRateLimitStore {
    pub async fn connect(redis_url: &str) -> Result<Self, NotifyError> {
        let client = Client::open(redis_url)
            .map_err(|e| NotifyError::Store(format!("failed to create redis client: {}", e)))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| NotifyError::Store(format!("failed to connect to redis: {}", e)))?;

        info!("Redis rate limit store connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn check(
        &self,
        key: &str,
        window_ms: u64,
        max_requests: u32,
    ) -> Result<RateLimitDecision, NotifyError> {
        let full_key = format!("ratelimit:{}", key);
        let mut conn = self.connection.clone();

        let count: u32 = conn
            .incr(&full_key, 1)
            .await
            .map_err(|e| NotifyError::Store(format!("rate limit incr failed: {}", e)))?;

        if count == 1 {
            conn.pexpire::<_, ()>(&full_key, window_ms as i64)
                .await
                .map_err(|e| NotifyError::Store(format!("rate limit expire failed: {}", e)))?;
        }

        let ttl_ms: i64 = conn
            .pttl(&full_key)
            .await
            .map_err(|e| NotifyError::Store(format!("rate limit ttl failed: {}", e)))?;
        let remaining_ms = if ttl_ms > 0 { ttl_ms } else { window_ms as i64 };
        let reset_at = Utc::now() + chrono::Duration::milliseconds(remaining_ms);

        if count <= max_requests {
            Ok(RateLimitDecision {
                allowed: true,
                remaining: max_requests - count,
                reset_at,
                retry_after_seconds: None,
            })
        } else {
            Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at,
                retry_after_seconds: Some(retry_after_seconds(remaining_ms)),
            })
        }
    }
}
