use rumqttc::{AsyncClient, QoS};
use thiserror::Error;
use tracing::info;

use crate::mqtt::models::{RelayCommand, RelayState};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode relay command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("publish not accepted by MQTT client: {0}")]
    Rejected(#[from] rumqttc::ClientError),
}

/// Publishes relay commands to the control topic.
///
/// Fire-and-forget: Ok means the local client accepted the publish;
/// nothing is awaited from the device, and that is exactly what the API
/// reports back.
#[derive(Clone)]
pub struct ControlService {
    client: AsyncClient,
    relay_topic: String,
}

impl ControlService {
    pub fn new(client: AsyncClient, relay_topic: String) -> Self {
        Self {
            client,
            relay_topic,
        }
    }

    pub async fn send_relay_command(&self, state: RelayState) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(&RelayCommand { relay: state })?;
        self.client
            .publish(&self.relay_topic, QoS::AtMostOnce, false, payload)
            .await?;
        info!(state = %state, topic = %self.relay_topic, "Relay command published");
        Ok(())
    }
}
