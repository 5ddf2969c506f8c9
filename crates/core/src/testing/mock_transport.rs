//! Mock transport for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::job::{MediaKind, UserId};
use crate::transport::{
    DeliveryMetadata, InputDescriptor, OutputDescriptor, Transport, TransportError,
};

/// A recorded delivery for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDelivery {
    pub user_id: UserId,
    pub file_name: String,
    pub size_bytes: u64,
    pub media_kind: MediaKind,
    pub caption: String,
    pub metadata: DeliveryMetadata,
    /// Whether the output file existed when it was delivered.
    pub file_present: bool,
}

/// Mock implementation of the Transport trait.
///
/// Inputs are registered in memory by location. Deliveries and notifications
/// are recorded instead of sent.
#[derive(Debug, Default)]
pub struct MockTransport {
    inputs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    deliveries: Arc<RwLock<Vec<RecordedDelivery>>>,
    notifications: Arc<RwLock<Vec<(UserId, String)>>>,
    fetch_error: Arc<RwLock<Option<TransportError>>>,
    deliver_error: Arc<RwLock<Option<TransportError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register input bytes under `location`.
    pub async fn add_input(&self, location: impl Into<String>, content: Vec<u8>) {
        self.inputs.write().await.insert(location.into(), content);
    }

    pub async fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries.read().await.clone()
    }

    pub async fn notifications(&self) -> Vec<(UserId, String)> {
        self.notifications.read().await.clone()
    }

    /// Messages sent to one user, oldest first.
    pub async fn notifications_for(&self, user_id: UserId) -> Vec<String> {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_fetch_error(&self, error: TransportError) {
        *self.fetch_error.write().await = Some(error);
    }

    /// Configure the next delivery to fail with the given error.
    pub async fn set_deliver_error(&self, error: TransportError) {
        *self.deliver_error.write().await = Some(error);
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, input: &InputDescriptor, dest: &Path) -> Result<u64, TransportError> {
        if let Some(err) = self.fetch_error.write().await.take() {
            return Err(err);
        }

        let content = self
            .inputs
            .read()
            .await
            .get(&input.location)
            .cloned()
            .ok_or_else(|| TransportError::NotFound {
                location: input.location.clone(),
            })?;

        tokio::fs::write(dest, &content)
            .await
            .map_err(|source| TransportError::FetchFailed {
                location: input.location.clone(),
                source,
            })?;
        Ok(content.len() as u64)
    }

    async fn deliver(
        &self,
        user_id: UserId,
        output: &OutputDescriptor,
        metadata: &DeliveryMetadata,
    ) -> Result<(), TransportError> {
        if let Some(err) = self.deliver_error.write().await.take() {
            return Err(err);
        }

        let file_present = tokio::fs::metadata(&output.path).await.is_ok();
        self.deliveries.write().await.push(RecordedDelivery {
            user_id,
            file_name: output.file_name.clone(),
            size_bytes: output.size_bytes,
            media_kind: output.media_kind,
            caption: metadata.caption.clone(),
            metadata: metadata.clone(),
            file_present,
        });
        Ok(())
    }

    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), TransportError> {
        self.notifications
            .write()
            .await
            .push((user_id, text.to_string()));
        Ok(())
    }
}
