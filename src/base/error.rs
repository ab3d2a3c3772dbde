//! Error taxonomy for relaying reactions.

use thiserror::Error;

use super::types::{ChannelId, CommunityId};

/// Everything that can stop a reaction from reaching its audit channel.
///
/// Only [`RelayError::StartupConfig`] is fatal; the others are logged by the
/// dispatcher and the event is dropped.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The community has no configured log channel.
    #[error("log channel not found for guild {community_id}")]
    ConfigurationGap { community_id: CommunityId },

    /// The configured log channel could not be resolved.
    #[error("log channel {channel_id} is unavailable")]
    ChannelUnavailable { channel_id: ChannelId },

    /// Posting the record failed. Not retried.
    #[error("failed to send audit record to channel {channel_id}: {cause}")]
    TransientSendFailure { channel_id: ChannelId, cause: String },

    /// The gateway delivered an event that could not be interpreted.
    #[error("malformed reaction event: {reason}")]
    MalformedEvent { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("invalid configuration: {reason}")]
    StartupConfig { reason: String },
}

impl RelayError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent { reason: reason.into() }
    }

    pub fn startup(reason: impl Into<String>) -> Self {
        Self::StartupConfig { reason: reason.into() }
    }
}
