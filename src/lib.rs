//! Locker Wall Simulator
//!
//! Simulates a fleet of locker walls that periodically report the state of
//! their doors over a publish/subscribe message bus, to generate synthetic
//! traffic for systems consuming device status messages.
//!
//! # Overview
//!
//! Every simulated wall is an independent task running a small cyclic state
//! machine. Each tick it advances its cycle, picks one of two sixteen-door
//! patterns and publishes `<timestamp>,<name>,<16 door tokens>` to
//! `<tenant>/status`.
//!
//! ## Key Features
//!
//! - **Deterministic Devices**: the door pattern is a pure function of the cycle
//! - **Independent Actors**: one tokio task per wall, no shared state besides the sink
//! - **Orderly Shutdown**: the fleet owns every task and stops them through one token
//! - **Pluggable Transport**: MQTT, stdout or in-memory message sinks
//!
//! ## Quick Start
//!
//! ```rust
//! use locker_wall_simulator::*;
//! use std::sync::Arc;
//!
//! let config = FleetConfig {
//!     device_count: 100,
//!     ..Default::default()
//! };
//!
//! let spawner = FleetSpawner::new(&config, Arc::new(MemorySink::new()))?;
//! assert_eq!(spawner.device_count(), 100);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, door states and configuration
//! - [`device`]: cycle counter, status message format and the device actor
//! - [`transport`]: message sinks (MQTT, console, memory)
//! - [`simulation`]: fleet spawning, statistics, logging and errors
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Simulation  │    │   Device    │    │  Transport  │
//! │             │    │             │    │             │
//! │ Spawner ────┼───►│ Actor ──────┼───►│ MessageSink │
//! │ Fleet       │    │ Cycle       │    │ MQTT        │
//! │ Statistics  │    │ Status      │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        │                  │
//!        ▼                  ▼
//! ┌───────────────────────────────┐
//! │             Types             │
//! │ Config, Tenant, DoorPhase     │
//! └───────────────────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod device;
pub mod simulation;
pub mod transport;
pub mod types;

// Core types and identifiers
pub use types::{
    CliArgs, ConfigError, ConfigValidationError, DeviceName, DoorPhase, DoorState, FleetConfig,
    MqttConfig, Tenant,
};

// Device types
pub use device::{CycleCounter, CycleStep, DeviceActor, StatusMessage, StatusParseError};

// Transport types
pub use transport::{
    ConnectionObserver, ConsoleSink, LoggingObserver, MemorySink, MessageSink, MqttSink,
    PublishedMessage, SinkError,
};

// Simulation types and functionality
pub use simulation::{
    load_config, DeviceReport, Fleet, FleetReport, FleetSpawner, FleetStatistics, LogFormat,
    LoggingConfig, SimulationError, SimulationResult, StatisticsSnapshot,
};
