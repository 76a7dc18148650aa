//! Core 2-D flocking ("boids") simulation library.
//!
//! Main components:
//! - [`agent`] - a flock member and its separation/alignment/cohesion rules.
//! - [`simulator`] - owns the flock and advances it one tick at a time.
//! - [`update`] - the sequential and synchronous per-step passes.
//! - [`arena`] - arena bounds and the boundary reflection policy.
//! - [`config`] - rule parameters and run settings.
//! - [`grid`] - uniform grid for separation-radius neighbor lookups.
//! - [`delta_buffer`] - per-agent velocity accumulator for synchronous steps.
//! - [`snapshot`] - read-only positions handed to renderers.
//! - [`error`] - configuration errors.
//! - [`types`] - shared type aliases and IDs.

pub mod agent;
pub mod arena;
pub mod config;
pub mod delta_buffer;
pub mod error;
pub mod grid;
pub mod simulator;
pub mod snapshot;
pub mod types;
pub mod update;

pub use agent::Agent;
pub use config::{Config, SimSettings, UpdateOrder};
pub use error::FlockError;
pub use simulator::{Simulator, StepSummary};
pub use snapshot::Snapshot;
