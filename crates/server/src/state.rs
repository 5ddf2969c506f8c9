use std::sync::Arc;
use squish_core::{Config, InMemoryStats, LocalTransport, MediaPipeline};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<MediaPipeline>,
    transport: Arc<LocalTransport>,
    stats: Arc<InMemoryStats>,
}

impl AppState {
    pub fn new(
        config: Config,
        pipeline: Arc<MediaPipeline>,
        transport: Arc<LocalTransport>,
        stats: Arc<InMemoryStats>,
    ) -> Self {
        Self {
            config,
            pipeline,
            transport,
            stats,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &MediaPipeline {
        &self.pipeline
    }

    /// Used to resolve and size intake locations before submission.
    pub fn transport(&self) -> &LocalTransport {
        &self.transport
    }

    pub fn stats(&self) -> &InMemoryStats {
        &self.stats
    }
}
