//! Stage-tracking analytics for a graduate program.
//!
//! Computes a program summary, the stage distribution, per-stage duration
//! analysis and a ranked list of delayed students from a read-only snapshot
//! supplied through a [`StageStore`].

pub mod config;
pub mod db;
pub mod delayed;
pub mod distribution;
pub mod duration;
pub mod error;
pub mod models;
pub mod report;
pub mod risk;
pub mod semester;
pub mod snapshot;
pub mod stage;
pub mod store;
pub mod summary;

pub use delayed::get_delayed_students;
pub use distribution::get_stage_distribution;
pub use duration::get_duration_analysis;
pub use error::{Error, Result};
pub use store::StageStore;
pub use summary::get_summary;
