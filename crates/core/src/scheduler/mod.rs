//! Concurrency scheduler for admitted jobs.
//!
//! This module provides the [`ConcurrencyScheduler`], which caps the number
//! of jobs running system-wide, runs at most one job per user at a time, and
//! keeps everything else in a FIFO queue. Execution itself is delegated to a
//! [`JobExecutor`].
//!
//! # Example
//!
//! ```ignore
//! use squish_core::scheduler::{ConcurrencyScheduler, SchedulerConfig, JobOutcome};
//!
//! let scheduler = ConcurrencyScheduler::new(SchedulerConfig::default(), Arc::new(runner));
//!
//! let handle = scheduler.submit(job).await;
//! println!("{} is {}", handle.id(), handle.state());
//!
//! match handle.wait().await {
//!     JobOutcome::Succeeded(report) => println!("saved {} bytes", report.summary.space_saved),
//!     JobOutcome::Failed(e) => eprintln!("failed: {}", e),
//!     JobOutcome::Cancelled => println!("cancelled"),
//! }
//! ```

mod config;
mod error;
mod pool;
mod traits;
mod types;

pub use config::SchedulerConfig;
pub use error::CancelError;
pub use pool::ConcurrencyScheduler;
pub use traits::JobExecutor;
pub use types::{CancelOutcome, JobHandle, JobOutcome, JobState, SchedulerStatus};
