//! Core components, types, and utilities for the reaction-relay.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The guild → log channel routing table.
//! - Audit record formatting.
//! - Common types, result aliases, and the relay error taxonomy.

pub mod config;
pub mod error;
pub mod record;
pub mod routing;
pub mod types;
