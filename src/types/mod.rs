//! Core types and identifiers for the locker wall simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: tenant and device name newtypes
//! - **Enums**: door states and the two door phases a wall alternates between
//! - **Configuration**: fleet configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use locker_wall_simulator::types::*;
//!
//! let tenant = Tenant::new("tester");
//! assert_eq!(tenant.status_topic(), "tester/status");
//!
//! let name = DeviceName::from_template("spurdo{n}", 3);
//! assert_eq!(name.as_str(), "spurdo3");
//!
//! assert_eq!(DoorPhase::for_cycle(15, 15), DoorPhase::Rising);
//!
//! let config = FleetConfig {
//!     device_count: 10,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
