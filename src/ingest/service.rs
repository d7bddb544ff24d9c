use std::time::Duration;

use chrono::Utc;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::{
    db::store::ReadingStore,
    mqtt::models::TelemetryMessage,
    reading_cache::{LatestReading, ReadingCache},
};

/// Bridges the MQTT subscription to the cache and the store.
///
/// Messages are handled sequentially in arrival order; the HTTP side only
/// ever sees this service through the cache and the table.
pub struct IngestService {
    store: ReadingStore,
    cache: ReadingCache,
    data_topic: String,
}

impl IngestService {
    pub fn new(store: ReadingStore, cache: ReadingCache, data_topic: String) -> Self {
        Self {
            store,
            cache,
            data_topic,
        }
    }

    /// Drives the MQTT connection forever. Spawn via `tokio::spawn`.
    ///
    /// Poll errors (broker unreachable, connection lost) are logged and
    /// retried after a short pause; this task never exits the process.
    pub async fn run(self, client: AsyncClient, mut eventloop: EventLoop) {
        info!(topic = %self.data_topic, "Ingestion loop started");

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("Connected to MQTT broker");
                    // The broker may have dropped our session; subscribe on
                    // every (re)connect.
                    if let Err(e) = client.subscribe(&self.data_topic, QoS::AtMostOnce).await {
                        error!(topic = %self.data_topic, error = %e, "Subscribe failed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle_payload(&publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "MQTT connection error, retrying");
                    time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    /// Decode one payload, refresh the cache, write through to the store.
    ///
    /// The cache update is not rolled back when the insert fails; the
    /// latest reading stays visible even while the database is down.
    async fn handle_payload(&self, payload: &[u8]) {
        let message = match TelemetryMessage::from_payload(payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable telemetry payload");
                return;
            }
        };

        debug!(
            suhu = message.suhu,
            humidity = message.humidity,
            lux = message.lux,
            "Telemetry received"
        );

        self.cache
            .set(LatestReading {
                suhu: message.suhu,
                humidity: message.humidity,
                lux: message.lux,
                timestamp: Utc::now().naive_utc(),
            })
            .await;

        if let Err(e) = self
            .store
            .insert(message.suhu, message.humidity, message.lux)
            .await
        {
            error!(error = %e, "Failed to persist telemetry reading");
        }
    }
}
