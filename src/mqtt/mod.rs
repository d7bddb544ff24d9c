pub mod models;

use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions};

use crate::config::Config;

/// Capacity of the client's outgoing request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Build the shared MQTT client and its event loop from config.
///
/// `AsyncClient` is cheap to clone and is handed to both the ingestion
/// loop (for subscribing) and the control service (for publishing). The
/// event loop must be polled by exactly one task; polling drives the
/// connection, including automatic reconnects.
pub fn connect(config: &Config) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(
        config.mqtt_client_id.clone(),
        config.mqtt_broker_host.clone(),
        config.mqtt_broker_port,
    );
    options.set_keep_alive(Duration::from_secs(30));
    AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY)
}
