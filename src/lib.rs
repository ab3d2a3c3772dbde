//! Library root for `reaction-relay`.
//!
//! Reaction-relay is a Discord bot that keeps an audit trail of reactions:
//! - Watches reactions being added to and removed from messages
//! - Routes each guild to its configured log channel
//! - Posts a formatted record of who reacted, where, and with what
//!
//! The chat platform sits behind the `GenericChatClient` trait, so the relay
//! logic can run against any implementation of it.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Builds the runtime context from the configuration and starts listening
/// for reaction events.
pub async fn start(config: Config) -> Void {
    info!("Starting reaction-relay ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
