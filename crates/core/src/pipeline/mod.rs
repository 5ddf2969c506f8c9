//! Media compression pipeline.
//!
//! [`MediaPipeline`] wires the components together: inbound [`FileEvent`]s
//! pass the admission gate, pick up the user's preferred preset when they
//! name none, and are handed to the scheduler, whose runner fetches,
//! transcodes and delivers them.
//!
//! # Example
//!
//! ```ignore
//! use squish_core::pipeline::{FileEvent, MediaPipeline};
//!
//! let pipeline = MediaPipeline::new(&config, transcoder, transport, stats);
//! pipeline.start().await;
//!
//! let event = FileEvent::new(UserId(42), MediaKind::Audio, input).with_preset("low");
//! match pipeline.submit(event).await {
//!     Ok(handle) => println!("queued {}", handle.id()),
//!     Err(e) => println!("not queued: {}", e),
//! }
//!
//! pipeline.stop().await;
//! ```

mod error;
mod media;
mod types;

pub use error::SubmitError;
pub use media::MediaPipeline;
pub use types::{FileEvent, PipelineStatus};
