//! Event handling for reaction-relay.
//!
//! This module turns reaction events into audit records:
//! - Skipping reactions made by bots
//! - Routing each guild to its log channel
//! - Reporting failures without interrupting the event stream

pub mod reaction;
