//! CLI configuration: thin wrapper around `ad2kp_config`.
//!
//! Adds flag overrides (`--host`, `--transport`, ...) on top of the
//! active profile. With no profile at all, the flags alone must name an
//! endpoint.

use ad2kp_core::TransportKind;

use crate::cli::{GlobalOpts, TransportArg};
use crate::error::CliError;

pub use ad2kp_config::{
    Config, Profile, ResolvedProfile, config_path, load_config, load_config_or_default,
    profile_to_keypad_config, render_config,
};

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Websocket => TransportKind::Websocket,
            TransportArg::Tcp => TransportKind::Tcp,
        }
    }
}

/// Resolve endpoint + session settings from config, profile and flags.
///
/// Flag values take priority over profile values.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<ResolvedProfile, CliError> {
    let active = cfg.active_profile(global.profile.as_deref()).map_err(|e| match e {
        ad2kp_config::ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
            name: profile,
            available: available_profiles(cfg),
        },
        other => other.into(),
    })?;

    let mut profile = match (active, global.host.as_deref()) {
        (Some((name, profile)), _) => {
            tracing::debug!(profile = name, "using profile");
            profile.clone()
        }
        (None, Some(host)) => Profile {
            host: host.to_owned(),
            transport: TransportKind::default(),
            port: None,
            partition: 0,
            code: 0,
            heartbeat_secs: None,
            reconnect_ms: None,
        },
        (None, None) => {
            return Err(CliError::NoEndpoint {
                path: config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);
    Ok(profile_to_keypad_config(&profile)?)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(transport) = global.transport {
        profile.transport = transport.into();
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if let Some(partition) = global.partition {
        profile.partition = partition;
    }
    if let Some(code) = global.code {
        profile.code = code;
    }
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["ad2kp"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "path"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_home() -> Config {
        let mut cfg = Config {
            default_profile: Some("home".into()),
            ..Config::default()
        };
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: "10.0.0.5".into(),
                transport: TransportKind::Websocket,
                port: None,
                partition: 1,
                code: 2,
                heartbeat_secs: None,
                reconnect_ms: None,
            },
        );
        cfg
    }

    #[test]
    fn flags_alone_build_an_endpoint() {
        let resolved = resolve(
            &global(&["--host", "localhost", "--transport", "tcp", "--port", "10000"]),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(resolved.endpoint.to_string(), "tcp://localhost:10000");
    }

    #[test]
    fn flags_override_profile() {
        let resolved = resolve(&global(&["--partition", "4"]), &config_with_home()).unwrap();
        assert_eq!(resolved.endpoint.to_string(), "ws://10.0.0.5/ad2ws");
        assert_eq!(resolved.keypad.partition, 4);
        assert_eq!(resolved.keypad.code, 2);
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = resolve(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoEndpoint { .. }));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let err = resolve(&global(&["--profile", "cabin"]), &config_with_home()).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "cabin");
                assert_eq!(available, "home");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
