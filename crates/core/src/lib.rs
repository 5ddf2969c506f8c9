pub mod config;
pub mod gate;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod preset;
pub mod runner;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod testing;
pub mod transcoder;
pub mod transport;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, ServerConfig,
};
pub use gate::{AdmissionRejected, LimitsConfig, RateScope, SizeAndRateGate};
pub use job::{CompressionSummary, Job, JobError, JobId, JobReport, MediaKind, UserId};
pub use pipeline::{FileEvent, MediaPipeline, PipelineStatus, SubmitError};
pub use preset::{PresetLevel, PresetProfile, PresetResolver, RequestedPreset};
pub use scheduler::{
    CancelError, CancelOutcome, ConcurrencyScheduler, JobHandle, JobOutcome, JobState,
    SchedulerStatus,
};
pub use stats::{InMemoryStats, StatsRecorder, StatsSnapshot, UserStats};
pub use transcoder::{FfmpegTranscoder, Transcoder, TranscoderConfig};
pub use transport::{InputDescriptor, LocalTransport, LocalTransportConfig, Transport};
