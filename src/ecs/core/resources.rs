use bevy::prelude::*;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const DEFAULT_SNAPSHOT_WARN_SECS: u64 = 5;

/// Connection parameters and the stored display name.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub player_name: String,
    /// How long to wait for the initial snapshot before the debug plugin warns.
    pub snapshot_warn_after: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            snapshot_warn_after: Duration::from_secs(DEFAULT_SNAPSHOT_WARN_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("SYNC_HOST").unwrap_or(defaults.host),
            port: parse_or("SYNC_PORT", lookup("SYNC_PORT"), defaults.port),
            player_name: lookup("PLAYER_NAME")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.player_name),
            snapshot_warn_after: Duration::from_secs(parse_or(
                "SYNC_SNAPSHOT_WARN_SECS",
                lookup("SYNC_SNAPSHOT_WARN_SECS"),
                DEFAULT_SNAPSHOT_WARN_SECS,
            )),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}
