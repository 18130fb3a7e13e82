//! Error types and handling
//!
//! This module contains the error type returned by fleet construction and
//! lifecycle operations.

use crate::transport::SinkError;
use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;

/// Errors that can occur while setting up or running a fleet
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Configuration(#[from] ConfigValidationError),

    /// Configuration could not be loaded
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] ConfigError),

    /// Transport setup failed
    #[error("Transport error: {0}")]
    Transport(#[from] SinkError),

    /// Runtime failure outside the device loops
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl SimulationError {
    /// Create a runtime error
    pub fn runtime_error(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::Configuration(_) => false,
            SimulationError::ConfigLoad(_) => false,
            SimulationError::Transport(SinkError::Config(_)) => false,
            SimulationError::Transport(SinkError::Connect(_)) => false,
            SimulationError::Transport(_) => true,
            SimulationError::Runtime(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::Configuration(_) => "Configuration",
            SimulationError::ConfigLoad(_) => "Configuration Loading",
            SimulationError::Transport(_) => "Transport",
            SimulationError::Runtime(_) => "Runtime",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
