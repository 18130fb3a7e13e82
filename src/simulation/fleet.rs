//! Fleet spawning and lifecycle
//!
//! The [`FleetSpawner`] validates the configuration and creates one
//! [`DeviceActor`] per locker wall. Spawning returns a [`Fleet`], which owns
//! every device task together with one cancellation token, so the fleet can
//! be inspected and shut down in order instead of dying with the process.

use crate::device::DeviceActor;
use crate::fleet_event;
use crate::simulation::{
    DeviceReport, FleetReport, FleetStatistics, SimulationError, SimulationResult,
    StatisticsSnapshot,
};
use crate::transport::MessageSink;
use crate::types::{CliArgs, DeviceName, FleetConfig, Tenant};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Load the layered configuration for `args` and validate it.
///
/// File errors surface as [`SimulationError::ConfigLoad`], invalid values as
/// [`SimulationError::Configuration`].
pub fn load_config(args: CliArgs) -> SimulationResult<FleetConfig> {
    let config = FleetConfig::from_cli_args(args)?;
    config.validate()?;
    Ok(config)
}

/// Creates the devices of a fleet
pub struct FleetSpawner {
    tenant: Tenant,
    name_template: String,
    device_count: usize,
    change_at: u32,
    tick_interval: Duration,
    sink: Arc<dyn MessageSink>,
}

impl fmt::Debug for FleetSpawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetSpawner")
            .field("tenant", &self.tenant)
            .field("name_template", &self.name_template)
            .field("device_count", &self.device_count)
            .field("change_at", &self.change_at)
            .field("tick_interval", &self.tick_interval)
            .field("sink", &self.sink)
            .finish()
    }
}

impl FleetSpawner {
    /// Validate `config` and prepare a spawner publishing through `sink`.
    ///
    /// Fails before any device exists when the configuration is invalid.
    #[instrument(skip(config, sink), fields(device_count = config.device_count, tenant = %config.tenant))]
    pub fn new(config: &FleetConfig, sink: Arc<dyn MessageSink>) -> SimulationResult<Self> {
        config.validate()?;

        Ok(Self {
            tenant: config.tenant(),
            name_template: config.name_template.clone(),
            device_count: config.device_count,
            change_at: config.change_at,
            tick_interval: config.tick_interval(),
            sink,
        })
    }

    /// Number of devices the spawner will create
    pub fn device_count(&self) -> usize {
        self.device_count
    }

    /// Names the devices will get, in spawn order
    pub fn device_names(&self) -> impl Iterator<Item = DeviceName> + '_ {
        (0..self.device_count).map(|index| DeviceName::from_template(&self.name_template, index))
    }

    /// Start one task per device and return the owning fleet handle.
    ///
    /// Must be called within a tokio runtime. Returns without waiting for
    /// any device to tick.
    pub fn spawn(self) -> Fleet {
        let cancel = CancellationToken::new();
        let statistics = Arc::new(FleetStatistics::new());
        let mut devices = Vec::with_capacity(self.device_count);

        for name in self.device_names() {
            let actor = DeviceActor::new(
                self.tenant.clone(),
                name.clone(),
                self.change_at,
                self.tick_interval,
                Arc::clone(&self.sink),
                Arc::clone(&statistics),
            );
            let handle = tokio::spawn(actor.run(cancel.child_token()));
            devices.push(DeviceHandle { name, handle });
        }

        fleet_event!(
            info,
            "Fleet spawned",
            devices = self.device_count,
            change_at = self.change_at,
            tick_interval_ms = self.tick_interval.as_millis() as u64,
        );

        Fleet { tenant: self.tenant, devices, cancel, statistics }
    }
}

/// Handle of one running device task
#[derive(Debug)]
struct DeviceHandle {
    name: DeviceName,
    handle: JoinHandle<DeviceReport>,
}

/// Owned collection of running devices
#[derive(Debug)]
pub struct Fleet {
    tenant: Tenant,
    devices: Vec<DeviceHandle>,
    cancel: CancellationToken,
    statistics: Arc<FleetStatistics>,
}

impl Fleet {
    /// Number of devices in the fleet
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the fleet has no devices
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Tenant all devices publish under
    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    /// Names of all devices, in spawn order
    pub fn device_names(&self) -> Vec<DeviceName> {
        self.devices.iter().map(|d| d.name.clone()).collect()
    }

    /// Token that stops every device when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Live counters
    pub fn statistics(&self) -> StatisticsSnapshot {
        self.statistics.snapshot(self.devices.len())
    }

    /// Run until `signal` completes, then shut down
    pub async fn run_until<F>(self, signal: F) -> FleetReport
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = signal => {}
            _ = self.cancel.cancelled() => {}
        }
        self.shutdown().await
    }

    /// Stop every device and wait for all of them to finish.
    ///
    /// Each device exits at its next wait point, so this returns within one
    /// tick interval.
    pub async fn shutdown(self) -> FleetReport {
        info!(devices = self.devices.len(), "Stopping fleet");
        self.cancel.cancel();

        let mut reports = Vec::with_capacity(self.devices.len());
        let mut aborted_devices = 0;
        for device in self.devices {
            match device.handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    aborted_devices += 1;
                    let error = SimulationError::runtime_error(format!(
                        "device {} task ended abnormally: {}",
                        device.name, e
                    ));
                    warn!(category = error.category(), "{}", error);
                }
            }
        }

        let totals = self.statistics.snapshot(reports.len() + aborted_devices);
        fleet_event!(
            info,
            "Fleet stopped",
            ticks = totals.ticks,
            published = totals.published,
            failed = totals.failed,
        );

        FleetReport { devices: reports, aborted_devices, totals }
    }
}
