// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared adapter plumbing: connection state, signal emission, and id helpers.
//!
//! Every [`ChannelAdapter`](crate::traits::ChannelAdapter) embeds one
//! [`AdapterBase`]. The base is the only owner of the adapter's
//! [`ConnectionState`]; all changes go through [`AdapterBase::transition`],
//! which rejects transitions the FSM does not allow and publishes the
//! matching [`AdapterSignal`].

use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::SwitchboardError;
use crate::ids::{self, ConversationId};
use crate::state::ConnectionState;
use crate::types::{
    ChannelConfig, EventPayload, MessageContent, PlatformType, UnifiedEvent, UnifiedMessage,
    UnifiedSender,
};

/// Default buffer size of an adapter's signal channel.
pub const DEFAULT_SIGNAL_CAPACITY: usize = 512;

/// Everything an adapter tells the outside world, as one tagged stream.
#[derive(Debug, Clone)]
pub enum AdapterSignal {
    /// A normalized inbound (or echoed outbound) message.
    Message(UnifiedMessage),
    /// A non-message lifecycle event.
    Event(UnifiedEvent),
    /// The adapter entered `connected` from another state.
    Connected,
    /// The adapter left `connected` for `disconnected`.
    Disconnected { reason: Option<String> },
    /// The adapter entered `error`.
    Error {
        error: String,
        context: Option<String>,
    },
}

/// Connection state, signal channel, and config of one adapter instance.
pub struct AdapterBase {
    config: ChannelConfig,
    state: Mutex<ConnectionState>,
    signals: broadcast::Sender<AdapterSignal>,
}

impl AdapterBase {
    pub fn new(config: ChannelConfig) -> Self {
        Self::with_capacity(config, DEFAULT_SIGNAL_CAPACITY)
    }

    /// Creates a base whose signal channel buffers `capacity` signals per subscriber.
    pub fn with_capacity(config: ChannelConfig, capacity: usize) -> Self {
        let (signals, _) = broadcast::channel(capacity.max(1));
        Self {
            config,
            state: Mutex::new(ConnectionState::Disconnected),
            signals,
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn platform(&self) -> PlatformType {
        self.config.platform
    }

    pub fn state(&self) -> ConnectionState {
        *self.lock_state()
    }

    /// Subscribes to this adapter's signal stream.
    pub fn subscribe(&self) -> broadcast::Receiver<AdapterSignal> {
        self.signals.subscribe()
    }

    /// Moves the FSM to `next`, emitting `Connected`/`Disconnected` as needed.
    ///
    /// Moving to `error` through this method emits an error signal without
    /// detail; prefer [`AdapterBase::fail`], which carries the cause.
    pub fn transition(&self, next: ConnectionState) -> Result<(), SwitchboardError> {
        self.apply(next, None, None)
    }

    /// `disconnected|reconnecting|error -> connecting`.
    pub fn begin_connect(&self) -> Result<(), SwitchboardError> {
        self.transition(ConnectionState::Connecting)
    }

    /// `connecting|reconnecting -> connected`.
    pub fn mark_connected(&self) -> Result<(), SwitchboardError> {
        self.transition(ConnectionState::Connected)
    }

    /// `connected|connecting|reconnecting|error -> disconnected`, with an optional reason.
    pub fn mark_disconnected(&self, reason: Option<String>) -> Result<(), SwitchboardError> {
        self.apply(ConnectionState::Disconnected, reason, None)
    }

    /// `connected|error -> reconnecting`.
    pub fn mark_reconnecting(&self) -> Result<(), SwitchboardError> {
        self.transition(ConnectionState::Reconnecting)
    }

    /// Enters `error` and emits an error signal carrying the cause.
    ///
    /// Always succeeds: `error` is reachable from every state.
    pub fn fail(&self, error: &SwitchboardError, context: Option<&str>) {
        let detail = (error.to_string(), context.map(str::to_string));
        if let Err(e) = self.apply(ConnectionState::Error, None, Some(detail)) {
            warn!(adapter = %self.id(), error = %e, "failed to enter error state");
        }
    }

    fn apply(
        &self,
        next: ConnectionState,
        reason: Option<String>,
        error: Option<(String, Option<String>)>,
    ) -> Result<(), SwitchboardError> {
        let previous = {
            let mut state = self.lock_state();
            let previous = *state;
            if !previous.can_transition_to(next) {
                warn!(
                    adapter = %self.id(),
                    from = %previous,
                    to = %next,
                    "rejected connection state transition"
                );
                return Err(SwitchboardError::InvalidTransition {
                    from: previous,
                    to: next,
                });
            }
            *state = next;
            previous
        };

        if previous != next {
            debug!(adapter = %self.id(), from = %previous, to = %next, "connection state changed");
        }

        match next {
            ConnectionState::Connected if previous != ConnectionState::Connected => {
                self.publish(AdapterSignal::Connected);
            }
            ConnectionState::Disconnected if previous == ConnectionState::Connected => {
                self.publish(AdapterSignal::Disconnected { reason });
            }
            ConnectionState::Error => {
                let (error, context) = error
                    .unwrap_or_else(|| (format!("{} entered error state", self.id()), None));
                self.publish(AdapterSignal::Error { error, context });
            }
            _ => {}
        }

        Ok(())
    }

    /// Publishes an inbound message on the signal stream.
    pub fn emit_message(&self, message: UnifiedMessage) {
        self.publish(AdapterSignal::Message(message));
    }

    /// Wraps `payload` in a [`UnifiedEvent`] stamped with this adapter and now.
    pub fn emit_event(&self, payload: EventPayload) {
        let event = UnifiedEvent::new(self.platform(), self.id(), payload);
        self.publish(AdapterSignal::Event(event));
    }

    fn publish(&self, signal: AdapterSignal) {
        // No subscribers yet is normal before the hub wires the adapter.
        let _ = self.signals.send(signal);
    }

    /// Fails with `AdapterNotConnected` unless the adapter is connected.
    pub fn ensure_connected(&self) -> Result<(), SwitchboardError> {
        let state = self.state();
        if state.is_connected() {
            Ok(())
        } else {
            Err(SwitchboardError::AdapterNotConnected {
                id: self.id().to_string(),
                state,
            })
        }
    }

    /// Advisory internal message id for this platform.
    pub fn generate_message_id(&self) -> String {
        ids::generate_message_id(self.platform())
    }

    /// Composite conversation id for a platform-native conversation id.
    pub fn conversation_id(&self, native_id: &str) -> Result<ConversationId, SwitchboardError> {
        ConversationId::new(self.platform(), self.id(), native_id)
    }

    /// Builds a [`UnifiedMessage`] owned by this adapter, timestamped now.
    ///
    /// Optional fields (`reply_to`, `thread_id`, `raw`, ...) start empty and
    /// can be set on the returned value.
    pub fn build_message(
        &self,
        native_conversation_id: &str,
        platform_message_id: impl Into<String>,
        sender: UnifiedSender,
        content: MessageContent,
    ) -> Result<UnifiedMessage, SwitchboardError> {
        let conversation_id = self.conversation_id(native_conversation_id)?;
        Ok(UnifiedMessage {
            id: self.generate_message_id(),
            platform: self.platform(),
            adapter_id: self.id().to_string(),
            platform_message_id: platform_message_id.into(),
            conversation_id: conversation_id.to_string(),
            platform_conversation_id: native_conversation_id.to_string(),
            sender,
            content,
            timestamp: Utc::now(),
            edited_at: None,
            reply_to: None,
            thread_id: None,
            is_outgoing: false,
            raw: serde_json::Value::Null,
        })
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ConnectionState> {
        // The guarded value is a Copy enum; a poisoned lock still holds a valid state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for AdapterBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterBase")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}
