//! Export job producer
//!
//! Publishes playlist-export jobs to a durable queue for the consumer
//! process. Fire-and-forget: nothing beyond a confirmed publish is awaited,
//! and a publish failure surfaces as a server error to the caller.

use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Queue carrying playlist-export jobs.
pub const EXPORT_QUEUE: &str = "export:playlists";

/// The wire shape of one export job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportJob {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    #[serde(rename = "targetEmail")]
    pub target_email: String,
}

#[derive(Clone)]
pub struct ExportProducer {
    amqp_url: String,
}

impl ExportProducer {
    pub fn new(amqp_url: impl Into<String>) -> Self {
        Self {
            amqp_url: amqp_url.into(),
        }
    }

    /// Publish one message to the named durable queue. The connection is
    /// opened per message and dropped once the publish is confirmed, so the
    /// API process holds no standing broker connection.
    pub async fn send_message(&self, queue: &str, payload: &[u8]) -> Result<(), ServiceError> {
        let conn = Connection::connect(&self.amqp_url, ConnectionProperties::default())
            .await
            .map_err(|e| {
                ServiceError::Internal(anyhow::anyhow!("failed to connect to message broker: {e}"))
            })?;

        let channel = conn.create_channel().await.map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("failed to open broker channel: {e}"))
        })?;

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                ServiceError::Internal(anyhow::anyhow!("failed to declare queue {queue}: {e}"))
            })?;

        channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to publish: {e}")))?
            .await
            .map_err(|e| {
                ServiceError::Internal(anyhow::anyhow!("publish was not confirmed: {e}"))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_job_wire_shape() {
        let job = ExportJob {
            playlist_id: "playlist-x".into(),
            target_email: "listener@example.com".into(),
        };

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["playlistId"], "playlist-x");
        assert_eq!(json["targetEmail"], "listener@example.com");

        let back: ExportJob = serde_json::from_value(json).unwrap();
        assert_eq!(back, job);
    }
}
