//! Status message wire format
//!
//! A status payload is `<timestamp>,<device name>,<16 door tokens>` where the
//! timestamp is UTC in the ANSI C layout (`Mon Jan  2 15:04:05 2006`) and
//! every token is `CL` or `OE`.

use crate::types::{DeviceName, DoorPhase, DoorState, DOORS_PER_WALL};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use thiserror::Error;

/// chrono layout of the payload timestamp
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Number of comma-separated fields in a payload
pub const PAYLOAD_FIELD_COUNT: usize = DOORS_PER_WALL + 2;

/// Errors raised when reading a payload back
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusParseError {
    /// Wrong number of comma-separated fields
    #[error("Expected {expected} fields, found {found}")]
    FieldCount {
        /// Required field count
        expected: usize,
        /// Fields present in the payload
        found: usize,
    },

    /// Timestamp does not match the ANSI C layout
    #[error("Invalid timestamp {0:?}")]
    Timestamp(String),

    /// Device name field is empty
    #[error("Device name is empty")]
    EmptyDevice,

    /// A door token is not `CL` or `OE`
    #[error("Invalid door token {0:?}")]
    DoorToken(String),

    /// Tokens are valid but match neither phase
    #[error("Door states match neither the rising nor the falling pattern")]
    UnknownPattern,
}

/// One status report of a locker wall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// When the tick happened
    pub timestamp: DateTime<Utc>,
    /// Reporting device
    pub device: DeviceName,
    /// Door pattern reported
    pub phase: DoorPhase,
}

impl StatusMessage {
    /// Create a status message
    pub fn new(timestamp: DateTime<Utc>, device: DeviceName, phase: DoorPhase) -> Self {
        Self { timestamp, device, phase }
    }

    /// Wire payload
    pub fn payload(&self) -> String {
        self.to_string()
    }

    /// Read a payload back into a message
    pub fn parse(payload: &str) -> Result<Self, StatusParseError> {
        let fields: Vec<&str> = payload.split(',').collect();
        if fields.len() != PAYLOAD_FIELD_COUNT {
            return Err(StatusParseError::FieldCount {
                expected: PAYLOAD_FIELD_COUNT,
                found: fields.len(),
            });
        }

        let timestamp = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT)
            .map_err(|_| StatusParseError::Timestamp(fields[0].to_string()))?
            .and_utc();

        if fields[1].is_empty() {
            return Err(StatusParseError::EmptyDevice);
        }

        let states = fields[2..]
            .iter()
            .map(|token| {
                token.parse::<DoorState>().map_err(|_| StatusParseError::DoorToken(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let phase = DoorPhase::from_states(&states).ok_or(StatusParseError::UnknownPattern)?;

        Ok(Self { timestamp, device: DeviceName::new(fields[1]), phase })
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.device,
            self.phase.tokens()
        )
    }
}
