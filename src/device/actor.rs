//! Locker wall device actor
//!
//! One actor simulates one locker wall. It owns its cycle counter and timer,
//! shares nothing with other actors except the sink and the statistics
//! counters, and publishes one status message per elapsed tick interval.

use super::{CycleCounter, StatusMessage};
use crate::simulation::{DeviceReport, FleetStatistics};
use crate::transport::MessageSink;
use crate::types::{DeviceName, Tenant};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A simulated locker wall
pub struct DeviceActor {
    tenant: Tenant,
    name: DeviceName,
    topic: String,
    counter: CycleCounter,
    tick_interval: Duration,
    sink: Arc<dyn MessageSink>,
    statistics: Arc<FleetStatistics>,
    ticks: u64,
    failed: u64,
}

impl fmt::Debug for DeviceActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceActor")
            .field("tenant", &self.tenant)
            .field("name", &self.name)
            .field("counter", &self.counter)
            .field("tick_interval", &self.tick_interval)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl DeviceActor {
    /// Create an actor with its cycle at the initial value
    pub fn new(
        tenant: Tenant,
        name: DeviceName,
        change_at: u32,
        tick_interval: Duration,
        sink: Arc<dyn MessageSink>,
        statistics: Arc<FleetStatistics>,
    ) -> Self {
        let topic = tenant.status_topic();
        Self {
            tenant,
            name,
            topic,
            counter: CycleCounter::new(change_at),
            tick_interval,
            sink,
            statistics,
            ticks: 0,
            failed: 0,
        }
    }

    /// Tenant this wall belongs to
    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    /// Name of this wall
    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Topic this wall publishes to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Current cycle value
    pub fn cycle(&self) -> u32 {
        self.counter.current()
    }

    /// Ticks completed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the cycle and build the message for a tick at `now`
    pub fn tick(&mut self, now: DateTime<Utc>) -> StatusMessage {
        let step = self.counter.advance();
        self.ticks += 1;
        trace!(device = %self.name, cycle = step.cycle, phase = %step.phase, "Tick");
        StatusMessage::new(now, self.name.clone(), step.phase)
    }

    /// Run one tick and hand the message to the sink.
    ///
    /// A refused publish is counted and logged; it never stops the actor.
    pub fn emit(&mut self) {
        let message = self.tick(Utc::now());
        match self.sink.publish(&self.topic, &message.payload()) {
            Ok(()) => self.statistics.record_published(),
            Err(e) => {
                self.failed += 1;
                self.statistics.record_failed();
                debug!(device = %self.name, error = %e, "Status publish failed");
            }
        }
    }

    /// Tick every interval until `cancel` fires.
    ///
    /// The first tick happens one full interval after the call.
    pub async fn run(mut self, cancel: CancellationToken) -> DeviceReport {
        let mut ticker = time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.emit(),
            }
        }

        debug!(device = %self.name, ticks = self.ticks, "Device stopped");
        self.into_report()
    }

    /// Summary of this actor's run so far
    pub fn into_report(self) -> DeviceReport {
        DeviceReport { name: self.name, ticks: self.ticks, failed: self.failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemorySink;
    use crate::types::DoorPhase;

    fn actor(change_at: u32, sink: Arc<MemorySink>) -> DeviceActor {
        DeviceActor::new(
            Tenant::new("tester"),
            DeviceName::new("spurdo0"),
            change_at,
            Duration::from_secs(1),
            sink,
            Arc::new(FleetStatistics::new()),
        )
    }

    #[test]
    fn test_actor_topic_and_initial_state() {
        let actor = actor(15, Arc::new(MemorySink::new()));
        assert_eq!(actor.topic(), "tester/status");
        assert_eq!(actor.cycle(), 1);
        assert_eq!(actor.ticks(), 0);
    }

    #[test]
    fn test_emit_publishes_to_tenant_topic() {
        let sink = Arc::new(MemorySink::new());
        let mut actor = actor(15, sink.clone());
        actor.emit();

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "tester/status");

        let parsed = StatusMessage::parse(&messages[0].payload).unwrap();
        assert_eq!(parsed.device.as_str(), "spurdo0");
        assert_eq!(parsed.phase, DoorPhase::Falling);
    }

    #[test]
    fn test_emit_survives_publish_failure() {
        let sink = Arc::new(MemorySink::new());
        sink.set_failing(true);
        let mut actor = actor(15, sink.clone());

        actor.emit();
        actor.emit();
        assert_eq!(actor.ticks(), 2);
        assert_eq!(actor.cycle(), 3);

        sink.set_failing(false);
        actor.emit();
        assert_eq!(sink.len(), 1);

        let report = actor.into_report();
        assert_eq!(report.ticks, 3);
        assert_eq!(report.failed, 2);
    }
}
