#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;

use ad2kp_config::{Config, load_config_from, profile_to_keypad_config, render_config};
use ad2kp_core::TransportKind;

const SAMPLE: &str = r#"
default_profile = "home"

[profiles.home]
host = "10.0.0.5"
partition = 1
code = 3

[profiles.bench]
host = "127.0.0.1"
transport = "tcp"
port = 10000
heartbeat_secs = 5
reconnect_ms = 500
"#;

#[test]
fn loads_profiles_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("home"));
    assert_eq!(cfg.profiles.len(), 2);

    let (name, home) = cfg.active_profile(None).unwrap().unwrap();
    assert_eq!(name, "home");
    assert_eq!(home.transport, TransportKind::Websocket);

    let bench = profile_to_keypad_config(&cfg.profiles["bench"]).unwrap();
    assert_eq!(bench.endpoint.to_string(), "tcp://127.0.0.1:10000");
    assert_eq!(bench.keypad.heartbeat_interval, Duration::from_secs(5));
    assert_eq!(bench.keypad.reconnect_delay, Duration::from_millis(500));
}

#[test]
fn missing_file_yields_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert!(cfg.profiles.is_empty());
    assert!(cfg.active_profile(None).unwrap().is_none());
}

#[test]
fn invalid_transport_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profiles.x]\nhost = \"h\"\ntransport = \"serial\"\n").unwrap();

    assert!(load_config_from(&path).is_err());
}

#[test]
fn rendered_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    let cfg = load_config_from(&path).unwrap();

    let rendered = render_config(&cfg).unwrap();
    assert!(rendered.contains("[profiles.bench]"));

    let copy = dir.path().join("copy.toml");
    std::fs::write(&copy, &rendered).unwrap();
    let reloaded: Config = load_config_from(&copy).unwrap();
    assert_eq!(reloaded.profiles, cfg.profiles);
}
