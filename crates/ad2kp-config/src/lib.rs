//! Shared configuration for the ad2kp tools.
//!
//! TOML profiles (one per keypad endpoint) and translation to the runtime
//! `ad2kp_core::{Endpoint, KeypadConfig}` pair. The CLI adds flag
//! overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ad2kp_core::{Endpoint, KeypadConfig, TransportKind};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is requested explicitly.
    pub default_profile: Option<String>,

    /// Named keypad profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

/// A named keypad endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Device host name or address.
    pub host: String,

    /// `websocket` (default) or `tcp`.
    #[serde(default)]
    pub transport: TransportKind,

    /// Port; required for TCP.
    pub port: Option<u16>,

    /// Virtual partition id.
    #[serde(default)]
    pub partition: u32,

    /// Code slot id.
    #[serde(default)]
    pub code: u32,

    /// Override heartbeat interval.
    pub heartbeat_secs: Option<u64>,

    /// Override reconnect delay.
    pub reconnect_ms: Option<u64>,
}

impl Config {
    /// Pick the active profile: the requested one (which must exist), else
    /// the default profile when it exists, else none.
    pub fn active_profile(&self, requested: Option<&str>) -> Result<Option<(&str, &Profile)>, ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, v)| Some((k.as_str(), v)))
                .ok_or_else(|| ConfigError::UnknownProfile {
                    profile: name.to_owned(),
                });
        }

        Ok(self
            .default_profile
            .as_deref()
            .and_then(|name| self.profiles.get_key_value(name))
            .map(|(k, v)| (k.as_str(), v)))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ad2kp", "ad2kp").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ad2kp");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, then `AD2KP_*` environment variables.
///
/// Nested keys use a double underscore, e.g.
/// `AD2KP_PROFILES__HOME__HOST=10.0.0.5`. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AD2KP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Render a config as pretty TOML.
pub fn render_config(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Runtime translation ─────────────────────────────────────────────

/// Endpoint plus session settings built from one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub endpoint: Endpoint,
    pub keypad: KeypadConfig,
}

/// Validate a profile and build the runtime configuration.
pub fn profile_to_keypad_config(profile: &Profile) -> Result<ResolvedProfile, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    if profile.transport == TransportKind::Tcp && profile.port.is_none() {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "required for the tcp transport".into(),
        });
    }

    let mut keypad = KeypadConfig {
        partition: profile.partition,
        code: profile.code,
        ..KeypadConfig::default()
    };

    if let Some(secs) = profile.heartbeat_secs {
        if secs == 0 {
            return Err(ConfigError::Validation {
                field: "heartbeat_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        keypad.heartbeat_interval = Duration::from_secs(secs);
    }

    if let Some(ms) = profile.reconnect_ms {
        keypad.reconnect_delay = Duration::from_millis(ms);
    }

    Ok(ResolvedProfile {
        endpoint: Endpoint {
            transport: profile.transport,
            host: host.to_owned(),
            port: profile.port,
        },
        keypad,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(host: &str) -> Profile {
        Profile {
            host: host.into(),
            transport: TransportKind::Websocket,
            port: None,
            partition: 1,
            code: 2,
            heartbeat_secs: None,
            reconnect_ms: None,
        }
    }

    #[test]
    fn websocket_profile_uses_default_timing() {
        let resolved = profile_to_keypad_config(&profile("10.0.0.5")).unwrap();
        assert_eq!(resolved.endpoint.to_string(), "ws://10.0.0.5/ad2ws");
        assert_eq!(resolved.keypad.partition, 1);
        assert_eq!(resolved.keypad.code, 2);
        assert_eq!(resolved.keypad.heartbeat_interval, Duration::from_secs(15));
        assert_eq!(resolved.keypad.reconnect_delay, Duration::from_secs(1));
    }

    #[test]
    fn overrides_apply() {
        let mut p = profile("panel.local");
        p.heartbeat_secs = Some(30);
        p.reconnect_ms = Some(250);

        let resolved = profile_to_keypad_config(&p).unwrap();
        assert_eq!(resolved.keypad.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(resolved.keypad.reconnect_delay, Duration::from_millis(250));
    }

    #[test]
    fn tcp_requires_port() {
        let mut p = profile("localhost");
        p.transport = TransportKind::Tcp;
        assert!(matches!(
            profile_to_keypad_config(&p),
            Err(ConfigError::Validation { field, .. }) if field == "port"
        ));

        p.port = Some(10000);
        let resolved = profile_to_keypad_config(&p).unwrap();
        assert_eq!(resolved.endpoint.to_string(), "tcp://localhost:10000");
    }

    #[test]
    fn rejects_empty_host_and_zero_heartbeat() {
        assert!(profile_to_keypad_config(&profile("  ")).is_err());

        let mut p = profile("panel");
        p.heartbeat_secs = Some(0);
        assert!(profile_to_keypad_config(&p).is_err());
    }

    #[test]
    fn active_profile_selection() {
        let mut cfg = Config {
            default_profile: Some("home".into()),
            ..Config::default()
        };
        assert!(cfg.active_profile(None).unwrap().is_none());

        cfg.profiles.insert("home".into(), profile("10.0.0.5"));
        let (name, p) = cfg.active_profile(None).unwrap().unwrap();
        assert_eq!(name, "home");
        assert_eq!(p.host, "10.0.0.5");

        assert!(matches!(
            cfg.active_profile(Some("cabin")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }
}
