//! MQTT message sink
//!
//! Wraps a `rumqttc` client. Publishing only enqueues the message (QoS 0, not
//! retained); a background driver task polls the event loop, reconnects after
//! failures and reports connection changes to a [`ConnectionObserver`].

use super::{MessageSink, SinkError};
use crate::types::MqttConfig;
use rumqttc::{AsyncClient, ClientError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Time the driver gets to flush the disconnect request on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Receives connection state changes of an [`MqttSink`]
pub trait ConnectionObserver: Send + Sync {
    /// The broker accepted the session (initially or after a reconnect)
    fn on_connected(&self);

    /// The established connection was lost
    fn on_connection_lost(&self, reason: &str);
}

/// Observer that reports connection changes through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ConnectionObserver for LoggingObserver {
    fn on_connected(&self) {
        info!("Connected to MQTT broker");
    }

    fn on_connection_lost(&self, reason: &str) {
        error!(reason, "Connection to MQTT broker lost");
    }
}

/// Random client identifier used when none is configured
pub fn generated_client_id() -> String {
    format!("locker-wall-sim-{}", Uuid::new_v4().simple())
}

/// Message sink publishing to an MQTT broker
pub struct MqttSink {
    client: AsyncClient,
    client_id: String,
    connected: Arc<AtomicBool>,
    cancel: CancellationToken,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for MqttSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttSink")
            .field("client_id", &self.client_id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl MqttSink {
    /// Connect to the broker described by `config`.
    ///
    /// Waits until the broker acknowledges the session or the connect timeout
    /// elapses, then hands the event loop to a background driver task.
    #[instrument(skip(config, observer), fields(url = %config.url))]
    pub async fn connect(
        config: &MqttConfig,
        observer: Arc<dyn ConnectionObserver>,
    ) -> Result<Self, SinkError> {
        let (host, port) = config.broker_address().map_err(|e| SinkError::Config(e.to_string()))?;
        let client_id = config.client_id.clone().unwrap_or_else(generated_client_id);

        let mut options = MqttOptions::new(client_id.clone(), host.clone(), port);
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);
        if let Some(username) = &config.username {
            options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
        }

        let (client, mut event_loop) = AsyncClient::new(options, config.request_capacity.max(1));

        info!(host = %host, port, client_id = %client_id, "Connecting to MQTT broker");
        match tokio::time::timeout(config.connect_timeout(), wait_for_session(&mut event_loop)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(SinkError::Connect(format!(
                    "no session acknowledgment from {}:{} within {:?}",
                    host,
                    port,
                    config.connect_timeout()
                )))
            }
        }
        observer.on_connected();

        let connected = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();
        let driver = tokio::spawn(drive_event_loop(
            event_loop,
            observer,
            Arc::clone(&connected),
            config.reconnect_delay(),
            cancel.clone(),
        ));

        Ok(Self { client, client_id, connected, cancel, driver: Mutex::new(Some(driver)) })
    }

    /// Client identifier presented to the broker
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Whether the broker session is currently up
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Disconnect from the broker and stop the driver task
    pub async fn shutdown(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Err(e) = self.client.try_disconnect() {
            debug!(error = %e, "Disconnect request could not be queued");
        }

        let driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(mut driver) = driver {
            let joined = match tokio::time::timeout(SHUTDOWN_GRACE, &mut driver).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("MQTT driver did not stop in time, cancelling");
                    self.cancel.cancel();
                    driver.await
                }
            };
            if let Err(e) = joined {
                warn!(error = %e, "MQTT driver task ended abnormally");
            }
        }
        self.cancel.cancel();
        info!("Disconnected from MQTT broker");
    }
}

impl MessageSink for MqttSink {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), SinkError> {
        if !self.is_connected() {
            return Err(SinkError::Disconnected);
        }
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| match e {
                ClientError::TryRequest(_) => SinkError::Backpressure,
                other => SinkError::Rejected(other.to_string()),
            })
    }
}

/// Poll until the broker acknowledges the session
async fn wait_for_session(event_loop: &mut EventLoop) -> Result<(), SinkError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
            Ok(_) => {}
            Err(e) => return Err(SinkError::Connect(e.to_string())),
        }
    }
}

/// Keep the event loop running until shutdown
async fn drive_event_loop(
    mut event_loop: EventLoop,
    observer: Arc<dyn ConnectionObserver>,
    connected: Arc<AtomicBool>,
    reconnect_delay: Duration,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = event_loop.poll() => event,
        };

        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                if !connected.swap(true, Ordering::SeqCst) {
                    observer.on_connected();
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
            Ok(_) => {}
            Err(e) => {
                if connected.swap(false, Ordering::SeqCst) {
                    observer.on_connection_lost(&e.to_string());
                } else {
                    debug!(error = %e, "Reconnect attempt failed");
                }

                // the next poll reconnects
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }
    }
    debug!("MQTT event loop stopped");
}
