//! Chat service integration for reaction-relay.
//!
//! This module provides functionality for interacting with the chat platform:
//! - Resolving audit channels
//! - Posting audit records
//! - Listening for reaction events
//!
//! It defines the `GenericChatClient` trait that the relay talks to, with a
//! default implementation for Discord.

pub mod discord;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{
    record::AuditRecord,
    types::{ChannelId, Void},
};

// Types.

/// A live, resolved channel that records can be posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: ChannelId,
    pub name: String,
}

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This is the send capability handed to the relay. Substituting it lets the
/// relay run without a gateway connection.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Resolve a channel id to a live channel.
    ///
    /// Returns `None` when the channel is deleted, unknown, or not reachable
    /// with the bot's permissions.
    async fn resolve_channel(&self, channel_id: ChannelId) -> Option<ChannelHandle>;

    /// Post an audit record to a channel.
    async fn send_record(&self, channel: &ChannelHandle, record: &AuditRecord) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
