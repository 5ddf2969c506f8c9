//! Trait definitions for the transport module.

use async_trait::async_trait;
use std::path::Path;

use crate::job::UserId;

use super::error::TransportError;
use super::types::{DeliveryMetadata, InputDescriptor, OutputDescriptor};

/// The channel files arrive on and results leave by.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the name of this transport implementation.
    fn name(&self) -> &str;

    /// Copies the input to `dest`. Returns the number of bytes written.
    async fn fetch(&self, input: &InputDescriptor, dest: &Path) -> Result<u64, TransportError>;

    /// Sends a finished output to the user.
    async fn deliver(
        &self,
        user_id: UserId,
        output: &OutputDescriptor,
        metadata: &DeliveryMetadata,
    ) -> Result<(), TransportError>;

    /// Sends a text message to the user.
    async fn notify(&self, user_id: UserId, text: &str) -> Result<(), TransportError>;
}
