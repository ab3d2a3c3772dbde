//! Guild to log channel routing.

use std::{collections::HashMap, sync::Arc};

use serde::Deserialize;

use super::{
    error::RelayError,
    types::{ChannelId, CommunityId},
};

/// One configured route: reactions in `guild_id` are logged to `log_channel_id`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub guild_id: CommunityId,
    pub log_channel_id: ChannelId,
}

/// Immutable guild → log channel table, built once at startup.
///
/// It is trivially cloneable, so it can be handed to every event without
/// the need for a lock.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: Arc<HashMap<CommunityId, ChannelId>>,
}

impl RoutingTable {
    /// Build the table, rejecting zero ids and a guild that appears twice.
    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Result<Self, RelayError> {
        let mut table = HashMap::new();

        for route in routes {
            if route.guild_id == 0 || route.log_channel_id == 0 {
                return Err(RelayError::startup(format!("route for guild {} has a zero id", route.guild_id)));
            }

            if table.insert(route.guild_id, route.log_channel_id).is_some() {
                return Err(RelayError::startup(format!("duplicate route for guild {}", route.guild_id)));
            }
        }

        Ok(Self { routes: Arc::new(table) })
    }

    /// Look up the log channel for a guild. Unmapped guilds are a miss, not an error.
    pub fn resolve(&self, community_id: CommunityId) -> Option<ChannelId> {
        self.routes.get(&community_id).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes sorted by guild id.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .routes
            .iter()
            .map(|(&guild_id, &log_channel_id)| Route { guild_id, log_channel_id })
            .collect();
        routes.sort_by_key(|r| r.guild_id);
        routes
    }
}
