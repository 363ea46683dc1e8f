//! Loading monitor configuration from JSON
//!
//! Boards ship partial JSON overrides; every field left out must keep the
//! firmware default.

#![cfg(feature = "serde")]

use biosense_core::{
    config::MonitorConfig,
    routing::{EventSource, LineMode, Route},
    traits::HostIrq,
};

#[test]
fn empty_object_is_the_firmware_default() {
    let config: MonitorConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, MonitorConfig::default());
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let json = r#"{
        "sampler": { "ready_timeout_ms": null },
        "power": { "boost_mv": 5000 },
        "pulse_ox": { "red_amplitude": 48, "mode": "Spo2" },
        "ecg": { "line_modes": { "line_b": "OpenDrainPullup" } }
    }"#;

    let config: MonitorConfig = serde_json::from_str(json).unwrap();
    let defaults = MonitorConfig::default();

    assert_eq!(config.sampler.ready_timeout_ms, None);
    assert_eq!(config.sampler.refresh_len, 100);
    assert_eq!(config.power.boost_mv, 5000);
    assert!(config.power.boost_enabled);
    assert_eq!(config.pulse_ox.red_amplitude, 48);
    assert_eq!(config.pulse_ox.ir_amplitude, 0x24);
    assert_eq!(config.pulse_ox.fifo, defaults.pulse_ox.fifo);
    assert_eq!(config.ecg.line_modes.line_a, LineMode::OpenDrainNoPullup);
    assert_eq!(config.ecg.line_modes.line_b, LineMode::OpenDrainPullup);
    assert_eq!(config.ecg.routes, defaults.ecg.routes);
    assert_eq!(config.priorities, defaults.priorities);
}

#[test]
fn saved_config_loads_back() {
    let mut config = MonitorConfig::default();
    config.priorities.assign(HostIrq::GpioPort(2), 7).unwrap();
    config.ecg.calibration.vmag = 0;

    let json = serde_json::to_string(&config).unwrap();
    let loaded: MonitorConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.ecg.routes.route(EventSource::RtoR), Route::LineA);
    assert_eq!(loaded.priorities.priority_of(HostIrq::GpioPort(2)), Some(7));
}
