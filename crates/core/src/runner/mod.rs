//! Job execution.
//!
//! The [`JobRunner`] is the scheduler's [`JobExecutor`](crate::scheduler::JobExecutor):
//! for each dispatched job it creates a private workspace, fetches the input
//! through the transport, resolves the preset, transcodes, delivers the result
//! and records stats. The workspace is removed on every exit path.
//!
//! [`MaintenanceTask`] periodically sweeps artifacts that outlived their job
//! (for example after a crash) and evicts idle per-user state.
//!
//! # Example
//!
//! ```ignore
//! use squish_core::runner::{JobRunner, RunnerConfig};
//!
//! let runner = JobRunner::new(
//!     RunnerConfig::new(&config.workspace, &config.transcoder),
//!     PresetResolver::new(config.presets.clone()),
//!     transcoder,
//!     transport,
//!     stats,
//! );
//! let scheduler = ConcurrencyScheduler::new(config.scheduler.clone(), Arc::new(runner));
//! ```

mod executor;
mod maintenance;
pub mod messages;
mod workspace;

pub use executor::{JobRunner, RunnerConfig};
pub use maintenance::{sweep_artifacts, MaintenanceTask};
pub use messages::format_file_size;
pub use workspace::{JobWorkspace, WorkspaceConfig};
