// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Switchboard chat hub.
//!
//! This crate provides the unified protocol (messages, content, events,
//! senders, conversations), the composite identifier formats, the
//! [`ChannelAdapter`] contract with its connection state machine, and the
//! shared error type. Platform integrations implement the trait defined here.

pub mod base;
pub mod error;
pub mod ids;
pub mod state;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use base::{AdapterBase, AdapterSignal};
pub use error::SwitchboardError;
pub use ids::{ConversationId, MessageRef};
pub use state::ConnectionState;
pub use traits::ChannelAdapter;
pub use types::{
    ChannelCapabilities, ChannelConfig, Conversation, EventPayload, EventType, MessageContent,
    PlatformType, SendOptions, SendResult, UnifiedEvent, UnifiedMessage, UnifiedSender,
};
