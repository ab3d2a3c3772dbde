//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use chrono::TimeDelta;
use serde::Deserialize;

use super::{
    error::RelayError,
    routing::{Route, RoutingTable},
    types::Res,
};

/// Default offset, in hours, applied to UTC for record timestamps.
fn default_timestamp_offset_hours() -> i64 {
    5
}

/// Configuration for the reaction-relay application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Discord bot token (`BOT_TOKEN`).
    pub bot_token: String,
    /// Guild → log channel routes.
    ///
    /// Filled from a `[[routes]]` table in the config file and from numbered
    /// `GUILD_ID_n` / `LOG_CHANNEL_ID_n` pairs.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Fixed offset applied to UTC for record timestamps (`TIMESTAMP_OFFSET_HOURS`).
    /// Not daylight-aware.
    #[serde(default = "default_timestamp_offset_hours")]
    pub timestamp_offset_hours: i64,
}

impl ConfigInner {
    /// The record timestamp offset as a duration.
    pub fn timestamp_offset(&self) -> TimeDelta {
        TimeDelta::hours(self.timestamp_offset_hours)
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::from_builder(cfg)
    }

    /// Build and validate a configuration from prepared sources.
    pub fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Res<Self> {
        let built = builder.build()?;

        let mut inner: ConfigInner = built.clone().try_deserialize()?;
        inner.routes.extend(numbered_routes(&built)?);

        let result = Config { inner: Arc::new(inner) };

        if result.bot_token.trim().is_empty() {
            return Err(RelayError::startup("BOT_TOKEN must not be empty.").into());
        }

        if result.routes.is_empty() {
            return Err(RelayError::startup("At least one GUILD_ID_n / LOG_CHANNEL_ID_n pair must be configured.").into());
        }

        if !(-12..=14).contains(&result.timestamp_offset_hours) {
            return Err(RelayError::startup("Timestamp offset must be between -12 and 14 hours.").into());
        }

        // Surface duplicate guilds now rather than when the runtime starts.
        result.routing_table()?;

        Ok(result)
    }

    /// The routing table described by this configuration.
    pub fn routing_table(&self) -> Res<RoutingTable> {
        Ok(RoutingTable::from_routes(self.routes.iter().copied())?)
    }
}

/// Collect `guild_id_1`/`log_channel_id_1`, `guild_id_2`/`log_channel_id_2`, ...
///
/// Numbering must be contiguous from 1; a pair past the first gap is rejected.
fn numbered_routes(built: &config::Config) -> Res<Vec<Route>> {
    let mut routes = Vec::new();

    for n in 1.. {
        let guild_key = format!("guild_id_{n}");
        let channel_key = format!("log_channel_id_{n}");

        let guild = optional_id(built, &guild_key)?;
        let channel = optional_id(built, &channel_key)?;

        match (guild, channel) {
            (Some(guild_id), Some(log_channel_id)) => routes.push(Route { guild_id, log_channel_id }),
            (Some(_), None) => return Err(RelayError::startup(format!("{} is set but {} is missing.", guild_key.to_uppercase(), channel_key.to_uppercase())).into()),
            (None, Some(_)) => return Err(RelayError::startup(format!("{} is set but {} is missing.", channel_key.to_uppercase(), guild_key.to_uppercase())).into()),
            (None, None) => break,
        }
    }

    let gap = routes.len() + 1;
    let keys: config::Map<String, config::Value> = built.clone().try_deserialize()?;

    let mut stranded: Vec<(usize, &str)> = keys.keys().filter_map(|key| route_index(key).map(|n| (n, key.as_str()))).filter(|(n, _)| *n > gap).collect();
    stranded.sort();

    if let Some((_, key)) = stranded.first() {
        return Err(RelayError::startup(format!("{} is set but GUILD_ID_{gap} / LOG_CHANNEL_ID_{gap} is missing.", key.to_uppercase())).into());
    }

    Ok(routes)
}

/// The `n` of a `guild_id_n` or `log_channel_id_n` key.
fn route_index(key: &str) -> Option<usize> {
    key.strip_prefix("guild_id_").or_else(|| key.strip_prefix("log_channel_id_"))?.parse().ok()
}

/// Read a numeric id, treating an absent key as `None`.
fn optional_id(built: &config::Config, key: &str) -> Res<Option<u64>> {
    match built.get_string(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| RelayError::startup(format!("{} must be a numeric id, got `{raw}`.", key.to_uppercase())).into()),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
