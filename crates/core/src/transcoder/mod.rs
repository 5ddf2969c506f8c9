//! Transcoder module for compressing media files.
//!
//! This module provides the `Transcoder` trait and an FFmpeg implementation
//! that runs exactly one external process per call, under a hard timeout and
//! a cancellation token.
//!
//! # Features
//!
//! - Audio re-encoding to MP3 at the profile's bitrate and channel count
//! - Video re-encoding to H.264/AAC MP4, scaled to the profile's height
//! - Partial output removal on timeout, cancellation and failure
//! - Optional input probe for duration and dimensions
//! - Configurable audio passthrough when ffmpeg is missing
//!
//! # Example
//!
//! ```ignore
//! use squish_core::transcoder::{FfmpegTranscoder, Transcoder, TranscodeRequest};
//!
//! let transcoder = FfmpegTranscoder::with_defaults();
//! transcoder.validate().await?;
//!
//! let request = TranscodeRequest {
//!     job_id: JobId::new(),
//!     input_path: PathBuf::from("/tmp/job/input.ogg"),
//!     output_path: PathBuf::from("/tmp/job/voice_compressed.mp3"),
//!     profile: resolver.resolve(MediaKind::Audio, "auto", 10 * 1024 * 1024)?,
//!     timeout: Duration::from_secs(300),
//! };
//!
//! let output = transcoder.transcode(request, CancellationToken::new()).await?;
//! println!("{} bytes in {} ms", output.output_size_bytes, output.elapsed_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::{TranscoderConfig, UnavailablePolicy};
pub use error::{TranscodeError, TranscodeErrorKind};
pub use ffmpeg::{output_path_for, FfmpegTranscoder};
pub use traits::Transcoder;
pub use types::{
    DerivedMetadata, EncodeMode, TranscodeOutput, TranscodeRequest, TranscodeResult,
};
