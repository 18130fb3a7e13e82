// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use locker_wall_simulator::*;
use std::sync::Arc;

#[test]
fn test_identifier_types() {
    let tenant = Tenant::new("tester");
    assert_eq!(tenant.status_topic(), "tester/status");

    let first = DeviceName::from_template("spurdo{n}", 0);
    let second = DeviceName::from_template("spurdo{n}", 1);
    assert_ne!(first, second);
    assert_eq!(first.to_string(), "spurdo0");
}

#[test]
fn test_enum_types() {
    for state in [DoorState::Closed, DoorState::Open] {
        assert_eq!(state.to_string().parse::<DoorState>().unwrap(), state);
    }

    for phase in [DoorPhase::Rising, DoorPhase::Falling] {
        assert!(!phase.to_string().is_empty());
        assert_eq!(phase.states().len(), 16);
        assert_eq!(phase.tokens().split(',').count(), 16);
    }
}

#[test]
fn test_default_config_builds_spawner() {
    let config = FleetConfig::default();
    let spawner = FleetSpawner::new(&config, Arc::new(MemorySink::new())).unwrap();
    assert_eq!(spawner.device_count(), 1000);
}

#[test]
fn test_serialization_roundtrip() {
    let phase = DoorPhase::Rising;
    let json = serde_json::to_string(&phase).unwrap();
    let deserialized: DoorPhase = serde_json::from_str(&json).unwrap();
    assert_eq!(phase, deserialized);

    let config = FleetConfig { device_count: 7, tenant: "acme".to_string(), ..Default::default() };
    let json = serde_json::to_string(&config).unwrap();
    let deserialized: FleetConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, deserialized);
}
