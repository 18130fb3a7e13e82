//! Simulated locker wall devices
//!
//! - **CycleCounter**: the per-device state machine selecting the door phase
//! - **StatusMessage**: the payload a wall publishes each tick
//! - **DeviceActor**: the timer loop tying both to a message sink

pub mod actor;
pub mod cycle;
pub mod status;

pub use actor::*;
pub use cycle::*;
pub use status::*;
