//! Admission control for submitted files.
//!
//! This module provides [`SizeAndRateGate`], which checks a file against
//! per-kind size bounds and the submitting user's sliding hourly and daily
//! admission windows before anything is queued.

mod config;
mod error;
mod limiter;
mod window;

pub use config::LimitsConfig;
pub use error::{AdmissionRejected, RateScope};
pub use limiter::{Admission, SizeAndRateGate};
pub use window::ActivityWindow;
