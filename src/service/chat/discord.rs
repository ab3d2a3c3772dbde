//! Discord implementation of the chat service, backed by serenity.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serenity::all::{ChannelId as DiscordChannelId, Client, Colour, Context, CreateEmbed, CreateMessage, EventHandler, GatewayIntents, Reaction, Ready, Timestamp, User};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        error::RelayError,
        record::AuditRecord,
        types::{Actor, ChannelId, EventKind, MessageRef, ReactionEvent, SourceChannel, Void},
    },
    interaction::reaction::{RelayContext, dispatch_reaction},
    runtime::Runtime,
};

use super::{ChannelHandle, ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the discord implementation.

impl ChatClient {
    /// Creates a Discord chat client bound to a gateway context.
    pub fn discord(ctx: Context) -> Self {
        Self::new(Arc::new(DiscordChatClient { ctx }))
    }
}

// Structs.

/// Discord client implementation.
///
/// Wraps the per-event serenity context, which carries the shared cache and
/// HTTP client.
#[derive(Clone)]
struct DiscordChatClient {
    ctx: Context,
}

#[async_trait]
impl GenericChatClient for DiscordChatClient {
    #[instrument(skip(self))]
    async fn resolve_channel(&self, channel_id: ChannelId) -> Option<ChannelHandle> {
        // Cache first, then HTTP.
        let channel = match DiscordChannelId::new(channel_id).to_channel(&self.ctx).await {
            Ok(channel) => channel,
            Err(e) => {
                warn!("Failed to resolve channel {}: {}", channel_id, e);
                return None;
            }
        };

        let channel = channel.guild()?;

        Some(ChannelHandle {
            id: channel.id.get(),
            name: channel.name,
        })
    }

    #[instrument(skip_all, fields(channel = channel.id))]
    async fn send_record(&self, channel: &ChannelHandle, record: &AuditRecord) -> Void {
        let timestamp = Timestamp::from_unix_timestamp(record.timestamp.timestamp()).map_err(|_| anyhow!("Record timestamp is out of range."))?;

        let embed = CreateEmbed::new().title(record.title).colour(Colour::new(record.color.rgb())).timestamp(timestamp);
        let embed = record.fields().into_iter().fold(embed, |embed, field| embed.field(field.name, field.value, field.inline));

        DiscordChannelId::new(channel.id)
            .send_message(&self.ctx.http, CreateMessage::new().embed(embed))
            .await
            .map_err(|e| anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Gateway listener.

/// Intents needed to observe reactions and resolve the users and channels involved.
fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::GUILD_MESSAGE_REACTIONS | GatewayIntents::GUILD_MEMBERS
}

/// Connects to the gateway and relays reactions until the connection ends or Ctrl-C is received.
#[instrument(skip_all)]
pub async fn listen(runtime: Runtime) -> Void {
    let mut client = Client::builder(&runtime.config.bot_token, intents())
        .event_handler(ReactionListener { runtime: runtime.clone() })
        .await?;

    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down ...");
            shard_manager.shutdown_all().await;
        }
    }

    Ok(())
}

/// Gateway event handler that feeds both reaction kinds through one relay path.
struct ReactionListener {
    runtime: Runtime,
}

impl ReactionListener {
    #[instrument(skip_all, fields(kind = %kind))]
    async fn relay(&self, ctx: Context, reaction: Reaction, kind: EventKind) {
        if reaction.guild_id.is_none() {
            debug!("Ignoring reaction {} outside of a guild.", kind);
            return;
        }

        let user = match reacting_user(&ctx, &reaction).await {
            Ok(user) => user,
            Err(err) => {
                error!("Error while relaying reaction {}: {}", kind, err);
                return;
            }
        };

        // The channel name only feeds the success log, so bots never pay for the lookup.
        let channel_name = if user.bot { None } else { reaction.channel_id.name(&ctx).await.ok() };

        let Some(event) = reaction_event(&reaction, user, channel_name, kind) else {
            return;
        };

        let context = RelayContext {
            routes: self.runtime.routes.clone(),
            timestamp_offset: self.runtime.config.timestamp_offset(),
            chat: ChatClient::discord(ctx),
        };

        dispatch_reaction(event, &context).await;
    }
}

#[async_trait]
impl EventHandler for ReactionListener {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        self.relay(ctx, add_reaction, EventKind::Added).await;
    }

    async fn reaction_remove(&self, ctx: Context, removed_reaction: Reaction) {
        self.relay(ctx, removed_reaction, EventKind::Removed).await;
    }
}

/// The user attached to the event, if the gateway sent one.
///
/// Reaction adds in a guild carry the member; removals do not.
fn attached_user(reaction: &Reaction) -> Option<User> {
    reaction.member.as_ref().map(|m| m.user.clone())
}

/// Resolves who reacted: the attached member first, then a cache/HTTP lookup.
async fn reacting_user(ctx: &Context, reaction: &Reaction) -> Result<User, RelayError> {
    if let Some(user) = attached_user(reaction) {
        return Ok(user);
    }

    reaction.user(ctx).await.map_err(|e| RelayError::malformed(format!("failed to resolve reacting user: {e}")))
}

/// Translates a serenity reaction into a relay event.
///
/// Returns `None` for reactions outside of a guild.
fn reaction_event(reaction: &Reaction, user: User, channel_name: Option<String>, kind: EventKind) -> Option<ReactionEvent> {
    let guild_id = reaction.guild_id?;

    Some(ReactionEvent {
        actor: Actor {
            id: user.id.get(),
            name: user.name,
            is_automated: user.bot,
        },
        community_id: guild_id.get(),
        channel: SourceChannel {
            id: reaction.channel_id.get(),
            name: channel_name,
        },
        message: MessageRef {
            id: reaction.message_id.get(),
            jump_url: reaction.message_id.link(reaction.channel_id, Some(guild_id)),
        },
        emoji: reaction.emoji.to_string(),
        kind,
    })
}
