//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external seams (the
//! transcoder process and the user transport), so the pipeline can be driven
//! end to end without ffmpeg or a real messaging channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use squish_core::testing::{fixtures, MockTranscoder, MockTransport};
//!
//! let transcoder = Arc::new(MockTranscoder::new());
//! let transport = Arc::new(MockTransport::new());
//! transport.add_input("voice.ogg", vec![0u8; 8192]).await;
//!
//! let config = fixtures::test_config(temp_dir.path());
//! let pipeline = MediaPipeline::new(&config, transcoder, transport, stats);
//! ```

mod mock_transcoder;
mod mock_transport;

pub use mock_transcoder::MockTranscoder;
pub use mock_transport::{MockTransport, RecordedDelivery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::Config;
    use crate::job::{MediaKind, UserId};
    use crate::pipeline::FileEvent;
    use crate::runner::WorkspaceConfig;
    use crate::transport::{InputDescriptor, LocalTransportConfig};

    /// Default configuration with every directory placed under `root`.
    pub fn test_config(root: &Path) -> Config {
        Config {
            workspace: WorkspaceConfig::default().with_root_dir(root.join("work")),
            transport: LocalTransportConfig::new(root.join("inbox"), root.join("outbox")),
            ..Config::default()
        }
    }

    /// An audio file event whose input lives at `location`.
    pub fn audio_event(user_id: i64, location: &str, size_bytes: u64) -> FileEvent {
        FileEvent::new(
            UserId(user_id),
            MediaKind::Audio,
            InputDescriptor::new(location, size_bytes),
        )
    }

    /// A video file event whose input lives at `location`.
    pub fn video_event(user_id: i64, location: &str, size_bytes: u64) -> FileEvent {
        FileEvent::new(
            UserId(user_id),
            MediaKind::Video,
            InputDescriptor::new(location, size_bytes),
        )
    }
}
