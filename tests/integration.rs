#![cfg(test)]

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use mockall::{mock, predicate::eq};
use reaction_relay::{
    base::{
        error::RelayError,
        record::AuditRecord,
        routing::{Route, RoutingTable},
        types::{Actor, ChannelId, ColorTag, EventKind, MessageRef, ReactionEvent, SourceChannel, Void},
    },
    interaction::reaction::{RelayContext, RelayOutcome, dispatch_reaction, relay_reaction},
    service::chat::{ChannelHandle, ChatClient, GenericChatClient},
};

// Log capture.

/// Shared buffer the test subscriber writes formatted log lines into.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap().lines().map(str::to_string).collect()
    }

    fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|line| line.contains(needle)).count()
    }
}

/// Installs a debug-level subscriber for the current thread that writes into the returned buffer.
fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let guard = tracing::subscriber::set_default(subscriber);

    (buffer, guard)
}

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn resolve_channel(&self, channel_id: ChannelId) -> Option<ChannelHandle>;
        async fn send_record(&self, channel: &ChannelHandle, record: &AuditRecord) -> Void;
    }
}

fn audit_channel() -> ChannelHandle {
    ChannelHandle { id: 200, name: "reaction-log".to_string() }
}

/// A chat client whose log channel 200 always resolves.
fn resolving_chat() -> MockChat {
    let mut mock = MockChat::new();
    mock.expect_resolve_channel().with(eq(200)).returning(|_| Some(audit_channel()));
    mock
}

/// Helper function to set up a relay context routing guild 100 to channel 200.
fn relay_context(chat: MockChat) -> RelayContext {
    RelayContext {
        routes: RoutingTable::from_routes([Route { guild_id: 100, log_channel_id: 200 }]).unwrap(),
        timestamp_offset: TimeDelta::hours(5),
        chat: ChatClient::new(Arc::new(chat)),
    }
}

fn reaction(kind: EventKind) -> ReactionEvent {
    ReactionEvent {
        actor: Actor {
            id: 42,
            name: "alice".to_string(),
            is_automated: false,
        },
        community_id: 100,
        channel: SourceChannel {
            id: 300,
            name: Some("general".to_string()),
        },
        message: MessageRef {
            id: 400,
            jump_url: "https://discord.com/channels/100/300/400".to_string(),
        },
        emoji: "👍".to_string(),
        kind,
    }
}

#[tokio::test]
async fn test_added_reaction_is_logged_to_routed_channel() {
    let mut chat = MockChat::new();
    chat.expect_resolve_channel().with(eq(200)).times(1).returning(|_| Some(audit_channel()));
    chat.expect_send_record()
        .withf(|channel, record| {
            channel.id == 200
                && record.title == "Reaction Added"
                && record.color == ColorTag::Green
                && record.actor_mention == "<@42>"
                && record.channel_mention == "<#300>"
                && record.message_link.contains("https://discord.com/channels/100/300/400")
                && record.emoji_text == "👍"
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let context = relay_context(chat);

    let outcome = relay_reaction(reaction(EventKind::Added), &context).await.unwrap();

    assert_eq!(outcome, RelayOutcome::Logged { channel_id: 200 });
}

#[tokio::test]
async fn test_removed_reaction_is_red() {
    let mut chat = resolving_chat();
    chat.expect_send_record()
        .withf(|_, record| record.title == "Reaction Removed" && record.color == ColorTag::Red)
        .times(1)
        .returning(|_, _| Ok(()));

    let context = relay_context(chat);

    let outcome = relay_reaction(reaction(EventKind::Removed), &context).await.unwrap();

    assert_eq!(outcome, RelayOutcome::Logged { channel_id: 200 });
}

#[tokio::test]
async fn test_automated_actor_is_skipped() {
    let mut chat = MockChat::new();
    chat.expect_resolve_channel().times(0);
    chat.expect_send_record().times(0);

    let context = relay_context(chat);

    let mut event = reaction(EventKind::Added);
    event.actor.is_automated = true;

    let outcome = relay_reaction(event, &context).await.unwrap();

    assert_eq!(outcome, RelayOutcome::SkippedAutomated);
}

#[tokio::test]
async fn test_unmapped_guild_is_a_configuration_gap() {
    let mut chat = MockChat::new();
    chat.expect_resolve_channel().times(0);
    chat.expect_send_record().times(0);

    let context = relay_context(chat);

    let mut event = reaction(EventKind::Added);
    event.community_id = 999;

    let err = relay_reaction(event, &context).await.unwrap_err();

    assert!(matches!(err, RelayError::ConfigurationGap { community_id: 999 }));
    assert!(err.to_string().contains("999"));
}

#[tokio::test]
async fn test_unavailable_log_channel_is_dropped() {
    let mut chat = MockChat::new();
    chat.expect_resolve_channel().with(eq(200)).times(1).returning(|_| None);
    chat.expect_send_record().times(0);

    let context = relay_context(chat);

    let err = relay_reaction(reaction(EventKind::Added), &context).await.unwrap_err();

    assert!(matches!(err, RelayError::ChannelUnavailable { channel_id: 200 }));
}

#[tokio::test]
async fn test_send_failure_reports_cause() {
    let mut chat = resolving_chat();
    chat.expect_send_record().times(1).returning(|_, _| Err(anyhow::anyhow!("connection reset")));

    let context = relay_context(chat);

    let err = relay_reaction(reaction(EventKind::Added), &context).await.unwrap_err();

    match err {
        RelayError::TransientSendFailure { channel_id, cause } => {
            assert_eq!(channel_id, 200);
            assert!(cause.contains("connection reset"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_timestamp_is_utc_plus_offset() {
    let before = Utc::now();

    let mut chat = resolving_chat();
    chat.expect_send_record().times(1).returning(move |_, record| {
        let after = Utc::now();
        assert!(record.timestamp >= before + TimeDelta::hours(5));
        assert!(record.timestamp <= after + TimeDelta::hours(5));
        Ok(())
    });

    let context = relay_context(chat);

    relay_reaction(reaction(EventKind::Added), &context).await.unwrap();
}

#[tokio::test]
async fn test_timestamp_offset_is_configurable() {
    let before = Utc::now();

    let mut chat = resolving_chat();
    chat.expect_send_record().times(1).returning(move |_, record| {
        let after = Utc::now();
        assert!(record.timestamp >= before - TimeDelta::hours(3));
        assert!(record.timestamp <= after - TimeDelta::hours(3));
        Ok(())
    });

    let mut context = relay_context(chat);
    context.timestamp_offset = TimeDelta::hours(-3);

    relay_reaction(reaction(EventKind::Added), &context).await.unwrap();
}

#[tokio::test]
async fn test_each_guild_routes_to_its_own_channel() {
    let mut chat = MockChat::new();
    chat.expect_resolve_channel().returning(|id| Some(ChannelHandle { id, name: format!("log-{id}") }));
    chat.expect_send_record().withf(|channel, _| channel.id == 200).times(1).returning(|_, _| Ok(()));
    chat.expect_send_record().withf(|channel, _| channel.id == 201).times(1).returning(|_, _| Ok(()));

    let context = RelayContext {
        routes: RoutingTable::from_routes([Route { guild_id: 100, log_channel_id: 200 }, Route { guild_id: 101, log_channel_id: 201 }]).unwrap(),
        timestamp_offset: TimeDelta::hours(5),
        chat: ChatClient::new(Arc::new(chat)),
    };

    let mut second = reaction(EventKind::Added);
    second.community_id = 101;

    assert_eq!(relay_reaction(reaction(EventKind::Added), &context).await.unwrap(), RelayOutcome::Logged { channel_id: 200 });
    assert_eq!(relay_reaction(second, &context).await.unwrap(), RelayOutcome::Logged { channel_id: 201 });
}

#[tokio::test]
async fn test_logs_success_with_actor_and_channel() {
    let (logs, _guard) = capture_logs();

    let mut chat = resolving_chat();
    chat.expect_send_record().times(1).returning(|_, _| Ok(()));

    let context = relay_context(chat);

    dispatch_reaction(reaction(EventKind::Added), &context).await;

    let logged: Vec<_> = logs.lines().into_iter().filter(|line| line.contains("Logged reaction")).collect();
    assert_eq!(logged.len(), 1);
    assert!(logged[0].contains("alice"));
    assert!(logged[0].contains("#general"));
    assert!(logged[0].contains("add"));
}

#[tokio::test]
async fn test_automated_actor_logs_no_success_line() {
    let (logs, _guard) = capture_logs();

    let mut chat = MockChat::new();
    chat.expect_resolve_channel().times(0);
    chat.expect_send_record().times(0);

    let context = relay_context(chat);

    let mut event = reaction(EventKind::Added);
    event.actor.is_automated = true;

    dispatch_reaction(event, &context).await;

    assert_eq!(logs.count("Logged reaction"), 0);
    assert_eq!(logs.count("ERROR"), 0);
    assert_eq!(logs.count("automated user 42"), 1);
}

#[tokio::test]
async fn test_configuration_gap_is_logged_once() {
    let (logs, _guard) = capture_logs();

    let mut chat = MockChat::new();
    chat.expect_resolve_channel().times(0);
    chat.expect_send_record().times(0);

    let context = relay_context(chat);

    let mut event = reaction(EventKind::Added);
    event.community_id = 999;

    dispatch_reaction(event, &context).await;

    assert_eq!(logs.count("log channel not found for guild 999"), 1);
    assert_eq!(logs.count("Logged reaction"), 0);
}

#[tokio::test]
async fn test_send_failure_is_logged_with_cause_and_next_event_succeeds() {
    let (logs, _guard) = capture_logs();

    let mut chat = resolving_chat();
    chat.expect_send_record()
        .withf(|_, record| record.emoji_text == "💥")
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("rate limited")));
    chat.expect_send_record()
        .withf(|_, record| record.emoji_text == "👍")
        .times(1)
        .returning(|_, _| Ok(()));

    let context = relay_context(chat);

    let mut failing = reaction(EventKind::Added);
    failing.emoji = "💥".to_string();

    dispatch_reaction(failing, &context).await;
    dispatch_reaction(reaction(EventKind::Added), &context).await;

    let errors: Vec<_> = logs.lines().into_iter().filter(|line| line.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("rate limited"));
    assert!(errors[0].contains("200"));
    assert_eq!(logs.count("Logged reaction"), 1);
}
