// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat platform integrations (Telegram, Discord, etc.).

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::base::{AdapterBase, AdapterSignal};
use crate::error::SwitchboardError;
use crate::state::ConnectionState;
use crate::types::{
    ChannelCapabilities, ChannelConfig, Conversation, MessageContent, PlatformType, SendOptions,
    SendResult,
};

/// Contract every platform connection implements.
///
/// Adapters are shared behind `Arc` by the hub, so every method takes `&self`
/// and the adapter keeps its mutable platform state internally. Connection
/// state lives in the embedded [`AdapterBase`].
///
/// Optional capabilities (reactions, typing, conversation lookup) have
/// default implementations so every adapter exposes the same call shape:
/// reactions fail with [`SwitchboardError::Unsupported`], typing is a no-op,
/// lookups return nothing.
#[async_trait]
pub trait ChannelAdapter: Send + Sync + 'static {
    /// The shared state machine and signal emitter of this adapter.
    fn base(&self) -> &AdapterBase;

    /// Unique adapter id from the channel config.
    fn id(&self) -> &str {
        self.base().id()
    }

    fn platform(&self) -> PlatformType {
        self.base().platform()
    }

    fn config(&self) -> &ChannelConfig {
        self.base().config()
    }

    fn state(&self) -> ConnectionState {
        self.base().state()
    }

    /// Subscribes to messages, events, and lifecycle signals.
    fn subscribe(&self) -> broadcast::Receiver<AdapterSignal> {
        self.base().subscribe()
    }

    /// Optional features this adapter implements.
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_edit: true,
            supports_delete: true,
            ..ChannelCapabilities::default()
        }
    }

    /// Establishes the platform session. Ends in `connected` or `error`.
    ///
    /// Failures are reported on the error signal and also returned.
    async fn connect(&self) -> Result<(), SwitchboardError>;

    /// Releases all platform resources. Idempotent; ends in `disconnected`.
    async fn disconnect(&self) -> Result<(), SwitchboardError>;

    /// Sends `content` to a platform-native conversation id.
    async fn send_message(
        &self,
        conversation_id: &str,
        content: MessageContent,
        options: SendOptions,
    ) -> SendResult;

    /// Replaces the content of an adapter-addressed message.
    async fn edit_message(&self, message_id: &str, content: MessageContent) -> SendResult;

    async fn delete_message(&self, message_id: &str) -> Result<(), SwitchboardError>;

    async fn add_reaction(&self, _message_id: &str, _emoji: &str) -> Result<(), SwitchboardError> {
        Err(SwitchboardError::unsupported(self.platform(), "add_reaction"))
    }

    async fn remove_reaction(
        &self,
        _message_id: &str,
        _emoji: &str,
    ) -> Result<(), SwitchboardError> {
        Err(SwitchboardError::unsupported(self.platform(), "remove_reaction"))
    }

    async fn send_typing_indicator(&self, _conversation_id: &str) -> Result<(), SwitchboardError> {
        Ok(())
    }

    async fn get_conversation(
        &self,
        _conversation_id: &str,
    ) -> Result<Option<Conversation>, SwitchboardError> {
        Ok(None)
    }

    async fn list_conversations(
        &self,
        _limit: usize,
    ) -> Result<Vec<Conversation>, SwitchboardError> {
        Ok(Vec::new())
    }
}
