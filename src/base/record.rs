//! Audit records posted to log channels.

use chrono::{DateTime, TimeDelta, Utc};

use super::types::{ColorTag, ReactionEvent};

/// A named value in a rendered audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditField {
    pub name: &'static str,
    pub value: String,
    pub inline: bool,
}

/// The formatted description of a reaction change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub title: &'static str,
    pub color: ColorTag,
    pub actor_mention: String,
    pub channel_mention: String,
    pub message_link: String,
    pub emoji_text: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Build the record for `event` as observed at `now`.
    ///
    /// The timestamp is `now` shifted by the fixed `offset`, regardless of the
    /// host timezone.
    pub fn new(event: &ReactionEvent, now: DateTime<Utc>, offset: TimeDelta) -> Self {
        Self {
            title: event.kind.title(),
            color: event.kind.color(),
            actor_mention: format!("<@{}>", event.actor.id),
            channel_mention: format!("<#{}>", event.channel.id),
            message_link: format!("[Jump to message]({})", event.message.jump_url),
            emoji_text: event.emoji.clone(),
            timestamp: now + offset,
        }
    }

    /// Discord renders `<t:UNIX:f>` as a full date and time in the reader's locale.
    pub fn time_text(&self) -> String {
        format!("<t:{}:f>", self.timestamp.timestamp())
    }

    /// Fields in display order.
    pub fn fields(&self) -> Vec<AuditField> {
        vec![
            AuditField { name: "User", value: self.actor_mention.clone(), inline: true },
            AuditField { name: "Channel", value: self.channel_mention.clone(), inline: true },
            AuditField { name: "Message", value: self.message_link.clone(), inline: true },
            AuditField { name: "Reaction", value: self.emoji_text.clone(), inline: true },
            AuditField { name: "Time", value: self.time_text(), inline: false },
        ]
    }
}
