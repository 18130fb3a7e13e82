//! Message transport
//!
//! Locker walls hand their status messages to a [`MessageSink`]. The sink
//! owns delivery: connection handling, reconnects and queueing all live here,
//! never in the device loop.
//!
//! - **MqttSink**: publishes to an MQTT broker with QoS 0
//! - **ConsoleSink**: prints messages to stdout
//! - **MemorySink**: records messages in memory

pub mod mqtt;
pub mod sink;

pub use mqtt::*;
pub use sink::*;
