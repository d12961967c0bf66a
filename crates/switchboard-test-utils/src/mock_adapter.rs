// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockAdapter` implements `ChannelAdapter` on top of a real
//! [`AdapterBase`], so its connection state machine and signals behave
//! exactly like a platform adapter's. Inbound traffic is injected by the
//! test; outbound calls are captured for assertion. Connect and send
//! failures can be scripted.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use switchboard_core::types::ChannelCapabilities;
use switchboard_core::{
    AdapterBase, ChannelAdapter, ChannelConfig, Conversation, EventPayload, MessageContent,
    MessageRef, PlatformType, SendOptions, SendResult, SwitchboardError, UnifiedMessage,
    UnifiedSender,
};

/// Separator between conversation and message in the mock's message ids.
pub const MOCK_MESSAGE_SEPARATOR: &str = ":";

/// One captured `send_message` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentCall {
    /// Platform-native conversation id the hub routed to.
    pub conversation_id: String,
    pub content: MessageContent,
    pub options: SendOptions,
}

/// A scriptable in-memory channel adapter.
pub struct MockAdapter {
    base: AdapterBase,
    capabilities: ChannelCapabilities,
    fail_connect: AtomicBool,
    failing_conversations: Mutex<HashSet<String>>,
    conversations: Mutex<BTreeMap<String, Conversation>>,
    sent: Mutex<Vec<SentCall>>,
    edits: Mutex<Vec<(String, MessageContent)>>,
    deleted: Mutex<Vec<String>>,
    reactions: Mutex<Vec<(String, String)>>,
    typing: Mutex<Vec<String>>,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl MockAdapter {
    /// Create a mock for `platform` with every optional capability enabled.
    pub fn new(id: &str, platform: PlatformType) -> Self {
        Self::from_config(ChannelConfig::new(id, platform, format!("Mock {id}")))
    }

    pub fn from_config(config: ChannelConfig) -> Self {
        Self {
            base: AdapterBase::new(config),
            capabilities: ChannelCapabilities {
                supports_edit: true,
                supports_delete: true,
                supports_reactions: true,
                supports_typing: true,
                supports_conversation_lookup: true,
                max_message_length: Some(4096),
            },
            fail_connect: AtomicBool::new(false),
            failing_conversations: Mutex::new(HashSet::new()),
            conversations: Mutex::new(BTreeMap::new()),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
            typing: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_capabilities(mut self, capabilities: ChannelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Make every subsequent `connect` fail (and enter `error`).
    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make sends to the native conversation `conversation_id` fail.
    pub async fn fail_sends_to(&self, conversation_id: &str) {
        self.failing_conversations
            .lock()
            .await
            .insert(conversation_id.to_string());
    }

    /// Emit an inbound text message from a fixed test user and return it.
    pub async fn inject_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<UnifiedMessage, SwitchboardError> {
        let sender = UnifiedSender::new(self.platform(), "test-user", "Test User");
        let message = self.base.build_message(
            conversation_id,
            uuid::Uuid::new_v4().to_string(),
            sender,
            MessageContent::text(text),
        )?;
        self.remember(&message).await;
        self.base.emit_message(message.clone());
        Ok(message)
    }

    /// Emit an arbitrary event.
    pub fn inject_event(&self, payload: EventPayload) {
        self.base.emit_event(payload);
    }

    pub async fn sent_calls(&self) -> Vec<SentCall> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    pub async fn edits(&self) -> Vec<(String, MessageContent)> {
        self.edits.lock().await.clone()
    }

    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }

    /// Currently applied `(message_id, emoji)` reactions.
    pub async fn reactions(&self) -> Vec<(String, String)> {
        self.reactions.lock().await.clone()
    }

    pub async fn typing_calls(&self) -> Vec<String> {
        self.typing.lock().await.clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    async fn remember(&self, message: &UnifiedMessage) {
        let mut conversations = self.conversations.lock().await;
        let entry = conversations
            .entry(message.platform_conversation_id.clone())
            .or_insert_with(|| Conversation {
                id: message.conversation_id.clone(),
                platform: message.platform,
                adapter_id: message.adapter_id.clone(),
                platform_conversation_id: message.platform_conversation_id.clone(),
                title: None,
                is_group: false,
                participant_count: None,
                last_message_at: None,
            });
        entry.last_message_at = Some(message.timestamp);
    }

    fn outgoing(
        &self,
        conversation_id: &str,
        content: MessageContent,
        options: &SendOptions,
    ) -> Result<UnifiedMessage, SwitchboardError> {
        let sender = UnifiedSender::new(self.platform(), "mock-bot", "Mock Bot").bot();
        let native_message_id = MessageRef::new(conversation_id, uuid::Uuid::new_v4().to_string())
            .compose(MOCK_MESSAGE_SEPARATOR);
        let mut message =
            self.base
                .build_message(conversation_id, native_message_id, sender, content)?;
        message.is_outgoing = true;
        message.reply_to = options.reply_to.clone();
        message.thread_id = options.thread_id.clone();
        Ok(message)
    }
}

#[async_trait]
impl ChannelAdapter for MockAdapter {
    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn capabilities(&self) -> ChannelCapabilities {
        self.capabilities.clone()
    }

    async fn connect(&self) -> Result<(), SwitchboardError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.base.state().is_connected() {
            return Ok(());
        }

        self.base.begin_connect()?;
        if self.fail_connect.load(Ordering::SeqCst) {
            let error = SwitchboardError::channel(format!("mock connect refused for {}", self.id()));
            self.base.fail(&error, Some("connect"));
            return Err(error);
        }
        self.base.mark_connected()
    }

    async fn disconnect(&self) -> Result<(), SwitchboardError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.base.mark_disconnected(Some("disconnect requested".to_string()))
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        content: MessageContent,
        options: SendOptions,
    ) -> SendResult {
        if let Err(e) = self.base.ensure_connected() {
            return SendResult::failed(e);
        }
        if self
            .failing_conversations
            .lock()
            .await
            .contains(conversation_id)
        {
            return SendResult::failed(SwitchboardError::Send(format!(
                "mock send refused for {conversation_id}"
            )));
        }

        self.sent.lock().await.push(SentCall {
            conversation_id: conversation_id.to_string(),
            content: content.clone(),
            options: options.clone(),
        });
        debug!(adapter = %self.id(), conversation = %conversation_id, "mock send");

        let result = self.outgoing(conversation_id, content, &options);
        if let Ok(message) = &result {
            self.remember(message).await;
        }
        SendResult::from_result(result)
    }

    async fn edit_message(&self, message_id: &str, content: MessageContent) -> SendResult {
        if let Err(e) = self.base.ensure_connected() {
            return SendResult::failed(e);
        }
        let target = match MessageRef::split(message_id, MOCK_MESSAGE_SEPARATOR) {
            Ok(target) => target,
            Err(e) => return SendResult::failed(e),
        };
        self.edits
            .lock()
            .await
            .push((message_id.to_string(), content.clone()));

        let result = self
            .outgoing(&target.conversation, content, &SendOptions::default())
            .map(|mut message| {
                message.platform_message_id = message_id.to_string();
                message.edited_at = Some(Utc::now());
                message
            });
        SendResult::from_result(result)
    }

    async fn delete_message(&self, message_id: &str) -> Result<(), SwitchboardError> {
        self.base.ensure_connected()?;
        self.deleted.lock().await.push(message_id.to_string());
        Ok(())
    }

    async fn add_reaction(&self, message_id: &str, emoji: &str) -> Result<(), SwitchboardError> {
        self.base.ensure_connected()?;
        self.reactions
            .lock()
            .await
            .push((message_id.to_string(), emoji.to_string()));
        Ok(())
    }

    async fn remove_reaction(&self, message_id: &str, emoji: &str) -> Result<(), SwitchboardError> {
        self.base.ensure_connected()?;
        self.reactions
            .lock()
            .await
            .retain(|(id, e)| !(id == message_id && e == emoji));
        Ok(())
    }

    async fn send_typing_indicator(&self, conversation_id: &str) -> Result<(), SwitchboardError> {
        self.typing.lock().await.push(conversation_id.to_string());
        Ok(())
    }

    async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, SwitchboardError> {
        Ok(self.conversations.lock().await.get(conversation_id).cloned())
    }

    async fn list_conversations(&self, limit: usize) -> Result<Vec<Conversation>, SwitchboardError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.values().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::{AdapterSignal, ConnectionState};

    async fn connected(id: &str) -> MockAdapter {
        let adapter = MockAdapter::new(id, PlatformType::Telegram);
        adapter.connect().await.unwrap();
        adapter
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let adapter = MockAdapter::new("tg", PlatformType::Telegram);
        let mut rx = adapter.subscribe();
        adapter.connect().await.unwrap();
        adapter.connect().await.unwrap();

        assert_eq!(adapter.state(), ConnectionState::Connected);
        assert_eq!(adapter.connect_calls(), 2);
        assert!(matches!(rx.try_recv(), Ok(AdapterSignal::Connected)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn scripted_connect_failure_enters_error() {
        let adapter = MockAdapter::new("tg", PlatformType::Telegram);
        adapter.fail_connect(true);
        let err = adapter.connect().await.unwrap_err();
        assert!(err.to_string().contains("mock connect refused"));
        assert_eq!(adapter.state(), ConnectionState::Error);

        adapter.fail_connect(false);
        adapter.connect().await.unwrap();
        assert_eq!(adapter.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn send_requires_connection() {
        let adapter = MockAdapter::new("tg", PlatformType::Telegram);
        let result = adapter
            .send_message("1", MessageContent::text("hi"), SendOptions::default())
            .await;
        assert!(!result.success);
        assert_eq!(adapter.sent_count().await, 0);
    }

    #[tokio::test]
    async fn send_captures_call_and_returns_outgoing_message() {
        let adapter = connected("tg").await;
        let result = adapter
            .send_message(
                "12345",
                MessageContent::text("hello"),
                SendOptions::default().reply_to("7"),
            )
            .await;

        assert!(result.success);
        let message = result.message.unwrap();
        assert!(message.is_outgoing);
        assert_eq!(message.conversation_id, "telegram:tg:12345");
        assert_eq!(message.reply_to.as_deref(), Some("7"));
        assert!(message.platform_message_id.starts_with("12345:"));

        let calls = adapter.sent_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].conversation_id, "12345");
        assert_eq!(calls[0].content, MessageContent::text("hello"));
    }

    #[tokio::test]
    async fn scripted_send_failure_only_hits_one_conversation() {
        let adapter = connected("tg").await;
        adapter.fail_sends_to("bad").await;

        let bad = adapter
            .send_message("bad", MessageContent::text("x"), SendOptions::default())
            .await;
        let good = adapter
            .send_message("good", MessageContent::text("x"), SendOptions::default())
            .await;
        assert!(!bad.success);
        assert!(good.success);
        assert_eq!(adapter.sent_count().await, 1);
    }

    #[tokio::test]
    async fn edit_splits_composite_message_id() {
        let adapter = connected("tg").await;
        let result = adapter
            .edit_message("chat-1:abc", MessageContent::text("fixed"))
            .await;
        assert!(result.success);
        let message = result.message.unwrap();
        assert_eq!(message.platform_conversation_id, "chat-1");
        assert!(message.edited_at.is_some());

        let malformed = adapter
            .edit_message("no-separator", MessageContent::text("x"))
            .await;
        assert!(!malformed.success);
    }

    #[tokio::test]
    async fn reactions_are_added_and_removed() {
        let adapter = connected("tg").await;
        adapter.add_reaction("c:1", "👍").await.unwrap();
        adapter.add_reaction("c:1", "🎉").await.unwrap();
        adapter.remove_reaction("c:1", "👍").await.unwrap();
        assert_eq!(
            adapter.reactions().await,
            vec![("c:1".to_string(), "🎉".to_string())]
        );
    }

    #[tokio::test]
    async fn injected_messages_are_emitted_and_remembered() {
        let adapter = connected("tg").await;
        let mut rx = adapter.subscribe();
        let injected = adapter.inject_message("-100", "ping").await.unwrap();

        match rx.recv().await.unwrap() {
            AdapterSignal::Message(message) => assert_eq!(message, injected),
            other => panic!("expected message, got {other:?}"),
        }

        let conversation = adapter.get_conversation("-100").await.unwrap().unwrap();
        assert_eq!(conversation.id, "telegram:tg:-100");
        assert_eq!(adapter.list_conversations(10).await.unwrap().len(), 1);
        assert!(adapter.list_conversations(0).await.unwrap().is_empty());
    }
}
