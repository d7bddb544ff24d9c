use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;

/// The most recently decoded telemetry values and when they arrived.
///
/// Holds zeros and the process start time until the first message lands.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestReading {
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
    pub timestamp: NaiveDateTime,
}

impl LatestReading {
    fn zero() -> Self {
        Self {
            suhu: 0.0,
            humidity: 0.0,
            lux: 0.0,
            timestamp: Utc::now().naive_utc(),
        }
    }
}

/// In-memory slot for the latest reading.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Uses a `tokio::sync::RwLock` so many readers never block each other;
/// only the ingestion loop writes.
#[derive(Clone)]
pub struct ReadingCache {
    inner: Arc<RwLock<LatestReading>>,
}

impl ReadingCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LatestReading::zero())),
        }
    }

    /// Replace the cached reading. The whole struct swaps at once, so
    /// readers never observe mixed old/new fields.
    pub async fn set(&self, reading: LatestReading) {
        *self.inner.write().await = reading;
    }

    /// Snapshot copy of the current reading.
    pub async fn get(&self) -> LatestReading {
        self.inner.read().await.clone()
    }
}

impl Default for ReadingCache {
    fn default() -> Self {
        Self::new()
    }
}
