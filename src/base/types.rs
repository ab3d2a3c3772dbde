use std::fmt;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Identifier of a community (a Discord guild).
pub type CommunityId = u64;
/// Identifier of a channel, either a reaction's source or an audit destination.
pub type ChannelId = u64;
/// Identifier of the user that added or removed a reaction.
pub type ActorId = u64;
/// Identifier of the message that was reacted to.
pub type MessageId = u64;

/// Whether a reaction was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Removed,
}

impl EventKind {
    /// The audit record title for this kind of event.
    pub fn title(self) -> &'static str {
        match self {
            EventKind::Added => "Reaction Added",
            EventKind::Removed => "Reaction Removed",
        }
    }

    /// The audit record color for this kind of event.
    pub fn color(self) -> ColorTag {
        match self {
            EventKind::Added => ColorTag::Green,
            EventKind::Removed => ColorTag::Red,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Added => f.write_str("add"),
            EventKind::Removed => f.write_str("remove"),
        }
    }
}

/// Accent color of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Green,
    Red,
}

impl ColorTag {
    /// The RGB value Discord renders for this color.
    pub fn rgb(self) -> u32 {
        match self {
            ColorTag::Green => 0x2E_CC_71,
            ColorTag::Red => 0xE7_4C_3C,
        }
    }
}

/// The user behind a reaction change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    /// Set for bot accounts; their reactions are never relayed.
    pub is_automated: bool,
}

/// The channel the reacted-to message lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChannel {
    pub id: ChannelId,
    pub name: Option<String>,
}

impl fmt::Display for SourceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#{name}"),
            None => write!(f, "{}", self.id),
        }
    }
}

/// The message that was reacted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub id: MessageId,
    /// Permalink that opens the message in the client.
    pub jump_url: String,
}

/// A single reaction change, as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub actor: Actor,
    pub community_id: CommunityId,
    pub channel: SourceChannel,
    pub message: MessageRef,
    /// Textual form of the emoji (unicode as-is, custom emoji as `<:name:id>`).
    pub emoji: String,
    pub kind: EventKind,
}
