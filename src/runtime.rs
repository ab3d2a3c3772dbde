//! Runtime services and shared state for the reaction-relay.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        routing::RoutingTable,
        types::{Res, Void},
    },
    service::chat::discord,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and the routing table built from it.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// Guild → log channel routes, fixed for the life of the process.
    pub routes: RoutingTable,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        let routes = config.routing_table()?;

        for route in routes.routes() {
            info!("Routing reactions in guild {} to channel {}", route.guild_id, route.log_channel_id);
        }

        Ok(Self { config, routes })
    }

    /// Connect to Discord and relay reactions until shutdown.
    pub async fn start(&self) -> Void {
        discord::listen(self.clone()).await
    }
}
