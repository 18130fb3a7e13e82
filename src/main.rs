// Locker Wall Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ MQTT_URL=tcp://localhost:1883 ./target/release/locker-wall-simulator
// ```
//
// Or without a broker:
//
// ```console
// $ ./target/release/locker-wall-simulator --device-count 5 --stdout --verbose
// ```

use anyhow::Context;
use clap::Parser;
use locker_wall_simulator::simulation::{
    load_config, FleetReport, FleetSpawner, LoggingConfig, SimulationResult,
};
use locker_wall_simulator::transport::{ConsoleSink, LoggingObserver, MessageSink, MqttSink};
use locker_wall_simulator::types::{CliArgs, FleetConfig};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// How often fleet counters are logged while running
const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // MQTT_* settings may come from a .env file; a missing file is fine
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    if args.print_config {
        match FleetConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = LoggingConfig::from_cli_args(&args).init() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Starting Locker Wall Simulator");

    let config = match load_config(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!(category = e.category(), "{}", e);
            process::exit(1);
        }
    };

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - fleet will not be started.");
        print_configuration_summary(&config, args.stdout);
        return;
    }

    print_startup_banner(&config, args.stdout);

    match run(config, args.stdout).await.context("Simulation failed") {
        Ok(report) => {
            eprintln!("{}", report.summary());
            info!("Locker Wall Simulator stopped");
        }
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

/// Connect the sink, run the fleet until shutdown, then tear everything down
async fn run(config: FleetConfig, to_stdout: bool) -> SimulationResult<FleetReport> {
    let mqtt = if to_stdout {
        None
    } else {
        Some(Arc::new(MqttSink::connect(&config.mqtt, Arc::new(LoggingObserver)).await?))
    };

    let sink: Arc<dyn MessageSink> = match &mqtt {
        Some(mqtt) => mqtt.clone(),
        None => Arc::new(ConsoleSink::new()),
    };

    let fleet = FleetSpawner::new(&config, sink)?.spawn();
    eprintln!("[INFO] Locker Walls initialized, press Ctrl + C to terminate the program ...");

    let shutdown = shutdown_signal(config.run_for());
    tokio::pin!(shutdown);

    let mut progress = tokio::time::interval(PROGRESS_INTERVAL);
    progress.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = progress.tick() => info!("{}", fleet.statistics().compact_summary()),
        }
    }

    let report = fleet.shutdown().await;
    if let Some(mqtt) = mqtt {
        mqtt.shutdown().await;
    }

    Ok(report)
}

/// Resolve on Ctrl+C, SIGTERM or when the optional run duration elapses
async fn shutdown_signal(run_for: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let deadline = async {
        match run_for {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
        _ = deadline => info!("Run duration elapsed"),
    }
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &FleetConfig, to_stdout: bool) {
    eprintln!("Locker Wall Simulator");
    eprintln!("=====================");
    eprintln!("Synthetic door-state telemetry for locker walls");
    eprintln!();

    print_configuration_summary(config, to_stdout);
}

/// Print configuration summary
fn print_configuration_summary(config: &FleetConfig, to_stdout: bool) {
    eprintln!("Configuration:");
    eprintln!("  Device Count: {}", config.device_count);
    eprintln!("  Change At: {}", config.change_at);
    eprintln!("  Tick Interval: {} ms", config.tick_interval_ms);
    eprintln!("  Tenant: {}", config.tenant);
    eprintln!("  Topic: {}", config.tenant().status_topic());
    eprintln!("  Name Template: {}", config.name_template);
    if to_stdout {
        eprintln!("  Sink: stdout");
    } else {
        eprintln!("  Sink: MQTT {}", config.mqtt.url);
    }
    if let Some(secs) = config.run_for_secs {
        eprintln!("  Run For: {} s", secs);
    }
    eprintln!("\nEstimated Load:");
    eprintln!("  Messages per Second: ~{:.0}", config.messages_per_second());
    eprintln!("  Pattern Period: {} ticks", u64::from(config.change_at) * 2);
    eprintln!();
}
