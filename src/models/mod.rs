//! Data models for the queue dashboard.
//!
//! This module contains the job entity parsed from scheduler text, the
//! atomically-replaced queue snapshot with its derived aggregates, and the
//! configuration types.

mod config;
mod job;
mod snapshot;

pub use config::{DisplayConfig, InputConfig, SystemConfig, TopConfig};
pub use job::{Job, JobState};
pub use snapshot::QueueSnapshot;
