//! Relaying reaction changes into audit channels.

use chrono::{TimeDelta, Utc};
use tracing::{debug, error, info, instrument};

use crate::{
    base::{
        error::RelayError,
        record::AuditRecord,
        routing::RoutingTable,
        types::{ChannelId, ReactionEvent},
    },
    service::chat::ChatClient,
};

/// Everything a reaction handler needs, passed explicitly to each event.
///
/// It is trivially cloneable.
#[derive(Clone)]
pub struct RelayContext {
    /// Guild → log channel routes.
    pub routes: RoutingTable,
    /// Offset added to UTC for record timestamps.
    pub timestamp_offset: TimeDelta,
    /// Where records are resolved and sent.
    pub chat: ChatClient,
}

/// What happened to an event that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A record was posted to the log channel.
    Logged { channel_id: ChannelId },
    /// The actor is a bot; nothing was posted.
    SkippedAutomated,
}

/// Handles a reaction event and logs the result.
///
/// Errors never propagate past this point, so a failing event cannot affect
/// the gateway connection or any later event.
#[instrument(skip_all, fields(kind = %event.kind, guild = event.community_id))]
pub async fn dispatch_reaction(event: ReactionEvent, context: &RelayContext) {
    let actor = event.actor.clone();
    let channel = event.channel.clone();
    let kind = event.kind;

    match relay_reaction(event, context).await {
        Ok(RelayOutcome::Logged { channel_id }) => {
            info!("Logged reaction {} by {} ({}) in {} to {}", kind, actor.name, actor.id, channel, channel_id);
        }
        Ok(RelayOutcome::SkippedAutomated) => {
            debug!("Skipping reaction {} by automated user {}.", kind, actor.id);
        }
        Err(err) => {
            error!("Error while relaying reaction {}: {}", kind, err);
        }
    }
}

/// Relays a single reaction event.
///
/// Bot reactions are skipped; unmapped guilds, unavailable log channels, and
/// send failures are returned as errors for the caller to report.
#[instrument(skip_all)]
pub async fn relay_reaction(event: ReactionEvent, context: &RelayContext) -> Result<RelayOutcome, RelayError> {
    if event.actor.is_automated {
        return Ok(RelayOutcome::SkippedAutomated);
    }

    let channel_id = context
        .routes
        .resolve(event.community_id)
        .ok_or(RelayError::ConfigurationGap { community_id: event.community_id })?;

    let channel = context.chat.resolve_channel(channel_id).await.ok_or(RelayError::ChannelUnavailable { channel_id })?;

    let record = AuditRecord::new(&event, Utc::now(), context.timestamp_offset);

    context
        .chat
        .send_record(&channel, &record)
        .await
        .map_err(|e| RelayError::TransientSendFailure { channel_id, cause: format!("{e:#}") })?;

    Ok(RelayOutcome::Logged { channel_id: channel.id })
}
