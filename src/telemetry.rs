// Status telemetry over zenoh
use tracing::{info, warn};
use zenoh::pubsub::Publisher;

use crate::config::TOPIC_STATUS;
use crate::messages::RobotStatus;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Zenoh error: {0}")]
    Zenoh(String),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

fn zenoh_err(e: zenoh::Error) -> TelemetryError {
    TelemetryError::Zenoh(e.to_string())
}

/// Open a zenoh session with the default (peer, multicast scouting) config
pub async fn open_session() -> Result<zenoh::Session, TelemetryError> {
    info!("Opening Zenoh session...");
    zenoh::open(zenoh::Config::default()).await.map_err(zenoh_err)
}

/// Publishes a RobotStatus per control tick
pub struct StatusPublisher {
    publisher: Publisher<'static>,
    failing: bool,
}

impl StatusPublisher {
    pub async fn new(session: &zenoh::Session) -> Result<Self, TelemetryError> {
        let publisher = session
            .declare_publisher(TOPIC_STATUS)
            .await
            .map_err(zenoh_err)?;
        info!("Publishing status to: {}", TOPIC_STATUS);
        Ok(Self {
            publisher,
            failing: false,
        })
    }

    /// Publish one snapshot; failures are logged once and never propagate
    pub async fn publish(&mut self, status: &RobotStatus) {
        let result = match serde_json::to_string(status) {
            Ok(json) => self.publisher.put(json).await.map_err(zenoh_err),
            Err(e) => Err(TelemetryError::from(e)),
        };

        match result {
            Ok(()) => self.failing = false,
            Err(e) if !self.failing => {
                warn!("Status publish failed: {}", e);
                self.failing = true;
            }
            Err(_) => {}
        }
    }
}
