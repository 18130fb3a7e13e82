//! Message sink abstraction
//!
//! A sink accepts a `(topic, payload)` pair and attempts best-effort delivery.
//! Locker walls never wait for an acknowledgment and never retry.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors a sink may report for a single publish or while connecting
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The transport is not connected
    #[error("Transport is disconnected")]
    Disconnected,

    /// The outgoing queue is full
    #[error("Outgoing queue is full")]
    Backpressure,

    /// The transport refused the message
    #[error("Publish rejected: {0}")]
    Rejected(String),

    /// The transport could not establish a session
    #[error("Could not connect to broker: {0}")]
    Connect(String),

    /// The transport settings are unusable
    #[error("Invalid transport configuration: {0}")]
    Config(String),
}

/// Destination for status messages.
///
/// `publish` is fire-and-forget with at-most-once semantics. Implementations
/// must be safe to call from many tasks at once.
pub trait MessageSink: Send + Sync + fmt::Debug {
    /// Attempt to deliver `payload` on `topic`
    fn publish(&self, topic: &str, payload: &str) -> Result<(), SinkError>;
}

/// Sink that prints `<topic> <payload>` lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a console sink
    pub fn new() -> Self {
        Self
    }
}

impl MessageSink for ConsoleSink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), SinkError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{} {}", topic, payload).map_err(|e| SinkError::Rejected(e.to_string()))
    }
}

/// A message captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic the message was published to
    pub topic: String,
    /// Raw payload
    pub payload: String,
}

/// Sink that keeps every accepted message in memory
///
/// It can be switched into a failing mode where every publish returns
/// [`SinkError::Disconnected`] and nothing is recorded.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<PublishedMessage>>,
    attempts: AtomicU64,
    failing: AtomicBool,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Copy of every accepted message, in acceptance order
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of accepted messages
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no message has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of publish calls, accepted or not
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl MessageSink for MemorySink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Disconnected);
        }

        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PublishedMessage { topic: topic.to_string(), payload: payload.to_string() });
        Ok(())
    }
}
