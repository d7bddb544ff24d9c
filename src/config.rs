use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub mqtt_broker_host: String,
    pub mqtt_broker_port: u16,
    pub mqtt_client_id: String,
    /// Topic the device publishes telemetry on.
    pub mqtt_data_topic: String,
    /// Topic relay commands are published to.
    pub mqtt_relay_topic: String,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: optional("DATABASE_URL", "sqlite://data_sensor.db?mode=rwc"),
            mqtt_broker_host: optional("MQTT_BROKER_HOST", "test.mosquitto.org"),
            mqtt_broker_port: optional("MQTT_BROKER_PORT", "1883")
                .parse()
                .context("MQTT_BROKER_PORT must be a valid port number")?,
            mqtt_client_id: optional("MQTT_CLIENT_ID", "iot-sensor-bridge"),
            mqtt_data_topic: optional("MQTT_DATA_TOPIC", "iot/sensor/data"),
            mqtt_relay_topic: optional("MQTT_RELAY_TOPIC", "iot/relay/control"),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "5000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
