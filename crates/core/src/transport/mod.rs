//! Transport abstraction.
//!
//! This module provides a `Transport` trait for the channel that files arrive
//! on and results are returned by, plus [`LocalTransport`], a filesystem
//! implementation that reads from an inbox and writes per-user outboxes.

mod config;
mod error;
mod local;
mod traits;
mod types;

pub use config::LocalTransportConfig;
pub use error::TransportError;
pub use local::LocalTransport;
pub use traits::Transport;
pub use types::{is_plain_file_name, DeliveryMetadata, InputDescriptor, OutputDescriptor};
