//! Fleet orchestration and control
//!
//! This module contains the fleet spawner, fleet statistics, logging setup
//! and error handling.
//!
//! # Overview
//!
//! - **FleetSpawner**: validates configuration and creates one device task per wall
//! - **Fleet**: owns the running device tasks and shuts them down
//! - **FleetStatistics**: lock-free publish counters shared by all devices
//! - **SimulationError**: error handling for fleet setup and lifecycle
//!
//! # Usage Example
//!
//! ```rust
//! use locker_wall_simulator::simulation::*;
//! use locker_wall_simulator::transport::MemorySink;
//! use locker_wall_simulator::types::FleetConfig;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), SimulationError> {
//! let config = FleetConfig {
//!     device_count: 10,
//!     tick_interval_ms: 100,
//!     ..Default::default()
//! };
//!
//! let sink = Arc::new(MemorySink::new());
//! let fleet = FleetSpawner::new(&config, sink.clone())?.spawn();
//! assert_eq!(fleet.len(), 10);
//!
//! let report = fleet.shutdown().await;
//! assert_eq!(report.devices.len(), 10);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fleet;
pub mod logging;
pub mod statistics;

// Re-export all public types for convenience
pub use error::*;
pub use fleet::*;
pub use logging::*;
pub use statistics::*;
