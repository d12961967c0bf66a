// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel hub that owns every registered adapter.
//!
//! On registration the hub subscribes to the adapter's signal stream and
//! spawns a forwarder task that re-emits every signal on the hub's shared
//! broadcast channel. Outbound sends are routed back to the owning adapter
//! using the adapter id segment of the composite conversation id.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use switchboard_core::base::DEFAULT_SIGNAL_CAPACITY;
use switchboard_core::ids::{self, ConversationId};
use switchboard_core::{
    AdapterSignal, ChannelAdapter, ChannelCapabilities, ConnectionState, Conversation,
    MessageContent, SendOptions, SendResult, SwitchboardError, UnifiedMessage,
};

use crate::report::{AdapterStatus, BroadcastFailure, BroadcastResult};
use crate::signal::HubSignal;

/// A registered adapter and the task forwarding its signals.
struct RegisteredAdapter {
    adapter: Arc<dyn ChannelAdapter>,
    /// Dropping or firing this ends the forwarder after it drains pending signals.
    stop: oneshot::Sender<()>,
    forwarder: JoinHandle<()>,
}

impl RegisteredAdapter {
    async fn detach(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.forwarder.await {
            warn!(adapter = %self.adapter.id(), error = %e, "signal forwarder ended abnormally");
        }
    }
}

/// Registry and dispatcher for all channel adapters.
///
/// `send`, `broadcast`, and `reply` may be called concurrently from any task.
/// `start`, `stop` and `register_adapter` are serialized against each other.
pub struct ChannelHub {
    adapters: DashMap<String, RegisteredAdapter>,
    running: AtomicBool,
    /// Serializes start, stop and registration.
    lifecycle: Mutex<()>,
    signals: broadcast::Sender<HubSignal>,
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHub {
    /// Create an empty hub with the default signal buffer.
    pub fn new() -> Self {
        Self::with_signal_capacity(DEFAULT_SIGNAL_CAPACITY)
    }

    /// Create an empty hub whose signal stream buffers `capacity` signals per subscriber.
    pub fn with_signal_capacity(capacity: usize) -> Self {
        let (signals, _) = broadcast::channel(capacity.max(1));
        Self {
            adapters: DashMap::new(),
            running: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
            signals,
        }
    }

    /// Subscribe to the shared message/event/lifecycle stream.
    pub fn subscribe(&self) -> broadcast::Receiver<HubSignal> {
        self.signals.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Registered adapter ids, sorted.
    pub fn adapter_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.adapters.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Look up a registered adapter.
    pub fn adapter(&self, id: &str) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(id).map(|entry| Arc::clone(&entry.adapter))
    }

    pub fn capabilities(&self, id: &str) -> Option<ChannelCapabilities> {
        self.adapter(id).map(|adapter| adapter.capabilities())
    }

    /// Per-adapter status, sorted by id.
    pub fn status(&self) -> Vec<AdapterStatus> {
        let mut status: Vec<AdapterStatus> = self
            .snapshot()
            .iter()
            .map(|adapter| AdapterStatus {
                id: adapter.id().to_string(),
                platform: adapter.platform(),
                name: adapter.config().name.clone(),
                state: adapter.state(),
            })
            .collect();
        status.sort_by(|a, b| a.id.cmp(&b.id));
        status
    }

    /// Register an adapter and wire its signals onto the hub stream.
    ///
    /// Fails if the id is taken; the existing registration is kept. If the
    /// hub is running the adapter is connected right away, and a connect
    /// failure is reported on the signal stream rather than returned.
    ///
    /// Holds the lifecycle lock throughout, so a concurrent `stop` either
    /// sees the new adapter or runs before it is connected.
    pub async fn register_adapter(
        &self,
        adapter: Arc<dyn ChannelAdapter>,
    ) -> Result<(), SwitchboardError> {
        let _guard = self.lifecycle.lock().await;
        let id = adapter.id().to_string();

        match self.adapters.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(SwitchboardError::AdapterAlreadyRegistered { id });
            }
            Entry::Vacant(slot) => {
                let (stop, forwarder) = spawn_forwarder(&adapter, self.signals.clone());
                slot.insert(RegisteredAdapter {
                    adapter: Arc::clone(&adapter),
                    stop,
                    forwarder,
                });
            }
        }

        info!(adapter = %id, platform = %adapter.platform(), "adapter registered");

        if self.is_running()
            && let Err(e) = adapter.connect().await
        {
            self.report_error(adapter.as_ref(), &e, "connect");
        }

        Ok(())
    }

    /// Disconnect, detach, and remove an adapter. No-op for unknown ids.
    ///
    /// Signals the adapter emits while disconnecting are still forwarded.
    pub async fn unregister_adapter(&self, id: &str) {
        let Some(adapter) = self.adapter(id) else {
            debug!(adapter = %id, "unregister of unknown adapter ignored");
            return;
        };

        if adapter.state() != ConnectionState::Disconnected
            && let Err(e) = adapter.disconnect().await
        {
            self.report_error(adapter.as_ref(), &e, "disconnect");
        }

        if let Some((_, registered)) = self.adapters.remove(id) {
            registered.detach().await;
        }

        info!(adapter = %id, "adapter unregistered");
    }

    /// Connect every registered adapter concurrently. Idempotent.
    ///
    /// Waits for every attempt to settle; each failure is reported on the
    /// signal stream and does not affect the other adapters.
    pub async fn start(&self) {
        let _guard = self.lifecycle.lock().await;
        if self.is_running() {
            debug!("hub already running");
            return;
        }

        let adapters = self.snapshot();
        info!(adapters = adapters.len(), "starting channel hub");

        let results = join_all(adapters.iter().map(|adapter| adapter.connect())).await;
        let mut connected = 0;
        for (adapter, result) in adapters.iter().zip(results) {
            match result {
                Ok(()) => connected += 1,
                Err(e) => self.report_error(adapter.as_ref(), &e, "connect"),
            }
        }

        self.running.store(true, Ordering::SeqCst);
        info!(
            connected,
            failed = adapters.len() - connected,
            "channel hub started"
        );
        self.emit(HubSignal::Started);
    }

    /// Disconnect every registered adapter concurrently. Idempotent.
    pub async fn stop(&self) {
        let _guard = self.lifecycle.lock().await;
        if !self.is_running() {
            debug!("hub not running");
            return;
        }

        let adapters = self.snapshot();
        info!(adapters = adapters.len(), "stopping channel hub");

        let results = join_all(adapters.iter().map(|adapter| adapter.disconnect())).await;
        for (adapter, result) in adapters.iter().zip(results) {
            if let Err(e) = result {
                self.report_error(adapter.as_ref(), &e, "disconnect");
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("channel hub stopped");
        self.emit(HubSignal::Stopped);
    }

    /// Route `content` to the adapter named in a composite conversation id.
    ///
    /// Malformed ids, unknown adapters, and adapters that are not connected
    /// fail immediately without touching the network.
    pub async fn send(
        &self,
        conversation_id: &str,
        content: MessageContent,
        options: SendOptions,
    ) -> SendResult {
        match self.route(conversation_id) {
            Ok((adapter, target)) => {
                adapter
                    .send_message(target.native_id(), content, options)
                    .await
            }
            Err(e) => {
                debug!(conversation = %conversation_id, error = %e, "send not routed");
                SendResult::failed(e)
            }
        }
    }

    /// Send the same content to many conversations concurrently.
    ///
    /// Duplicate ids are sent once. One failing destination never prevents
    /// the others.
    pub async fn broadcast<I, S>(
        &self,
        content: MessageContent,
        conversation_ids: I,
        options: SendOptions,
    ) -> BroadcastResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let targets: Vec<String> = conversation_ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let sends = targets
            .iter()
            .map(|id| self.send(id, content.clone(), options.clone()));
        let outcomes = join_all(sends).await;

        let mut result = BroadcastResult::default();
        for (conversation_id, outcome) in targets.into_iter().zip(outcomes) {
            if outcome.success {
                result.total_sent += 1;
            } else {
                result.failures.push(BroadcastFailure {
                    conversation_id: conversation_id.clone(),
                    adapter_id: ids::adapter_id_of(&conversation_id).ok(),
                    error: outcome
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string()),
                });
            }
            result.results.insert(conversation_id, outcome);
        }

        info!(
            sent = result.total_sent,
            failed = result.failures.len(),
            "broadcast finished"
        );
        result
    }

    /// Reply in the conversation of `original`, quoting it.
    ///
    /// Fills `reply_to` with the original's platform message id and keeps
    /// the original thread unless `options` names another.
    pub async fn reply(
        &self,
        original: &UnifiedMessage,
        content: MessageContent,
        mut options: SendOptions,
    ) -> SendResult {
        options.reply_to = Some(original.platform_message_id.clone());
        if options.thread_id.is_none() {
            options.thread_id = original.thread_id.clone();
        }
        self.send(&original.conversation_id, content, options).await
    }

    /// Edit a message in the conversation's adapter.
    pub async fn edit(
        &self,
        conversation_id: &str,
        message_id: &str,
        content: MessageContent,
    ) -> SendResult {
        match self.route(conversation_id) {
            Ok((adapter, _)) => adapter.edit_message(message_id, content).await,
            Err(e) => SendResult::failed(e),
        }
    }

    pub async fn delete(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<(), SwitchboardError> {
        let (adapter, _) = self.route(conversation_id)?;
        adapter.delete_message(message_id).await
    }

    /// Add a reaction, checking the adapter's capabilities first.
    pub async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), SwitchboardError> {
        let (adapter, _) = self.route(conversation_id)?;
        if !adapter.capabilities().supports_reactions {
            return Err(SwitchboardError::unsupported(adapter.platform(), "add_reaction"));
        }
        adapter.add_reaction(message_id, emoji).await
    }

    pub async fn unreact(
        &self,
        conversation_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), SwitchboardError> {
        let (adapter, _) = self.route(conversation_id)?;
        if !adapter.capabilities().supports_reactions {
            return Err(SwitchboardError::unsupported(adapter.platform(), "remove_reaction"));
        }
        adapter.remove_reaction(message_id, emoji).await
    }

    /// Show a typing indicator. Adapters without typing support do nothing.
    pub async fn typing(&self, conversation_id: &str) -> Result<(), SwitchboardError> {
        let (adapter, target) = self.route(conversation_id)?;
        adapter.send_typing_indicator(target.native_id()).await
    }

    /// Conversation metadata, if the adapter can look it up.
    pub async fn conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Conversation>, SwitchboardError> {
        let (adapter, target) = self.route(conversation_id)?;
        adapter.get_conversation(target.native_id()).await
    }

    pub async fn list_conversations(
        &self,
        adapter_id: &str,
        limit: usize,
    ) -> Result<Vec<Conversation>, SwitchboardError> {
        let adapter = self.connected_adapter(adapter_id)?;
        adapter.list_conversations(limit).await
    }

    /// Resolve a composite conversation id to a connected adapter.
    fn route(
        &self,
        conversation_id: &str,
    ) -> Result<(Arc<dyn ChannelAdapter>, ConversationId), SwitchboardError> {
        let target = ConversationId::parse(conversation_id)?;
        let adapter = self.connected_adapter(target.adapter_id())?;
        Ok((adapter, target))
    }

    fn connected_adapter(&self, id: &str) -> Result<Arc<dyn ChannelAdapter>, SwitchboardError> {
        let adapter = self
            .adapter(id)
            .ok_or_else(|| SwitchboardError::AdapterNotFound { id: id.to_string() })?;
        let state = adapter.state();
        if !state.is_connected() {
            return Err(SwitchboardError::AdapterNotConnected {
                id: id.to_string(),
                state,
            });
        }
        Ok(adapter)
    }

    /// Clone out every adapter so no map guard is held across an await.
    fn snapshot(&self) -> Vec<Arc<dyn ChannelAdapter>> {
        self.adapters
            .iter()
            .map(|entry| Arc::clone(&entry.adapter))
            .collect()
    }

    /// Log a failed adapter operation and publish it as `AdapterError`.
    ///
    /// An adapter that moved itself to `Error` has already published the
    /// failure through its own stream, so only the log line is written.
    fn report_error(&self, adapter: &dyn ChannelAdapter, error: &SwitchboardError, context: &str) {
        warn!(
            adapter = %adapter.id(),
            platform = %adapter.platform(),
            error = %error,
            context,
            "adapter operation failed"
        );
        if adapter.state() == ConnectionState::Error {
            return;
        }
        self.emit(HubSignal::AdapterError {
            adapter_id: adapter.id().to_string(),
            platform: adapter.platform(),
            error: error.to_string(),
            context: Some(context.to_string()),
        });
    }

    fn emit(&self, signal: HubSignal) {
        // Having no subscriber is not an error.
        let _ = self.signals.send(signal);
    }
}

/// Forward one adapter's signals onto the hub stream until told to stop.
fn spawn_forwarder(
    adapter: &Arc<dyn ChannelAdapter>,
    signals: broadcast::Sender<HubSignal>,
) -> (oneshot::Sender<()>, JoinHandle<()>) {
    // Subscribe before spawning so nothing emitted after registration is missed.
    let mut rx = adapter.subscribe();
    let adapter_id = adapter.id().to_string();
    let platform = adapter.platform();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let forward = {
        let adapter_id = adapter_id.clone();
        move |signal: AdapterSignal| {
            let _ = signals.send(HubSignal::from_adapter(&adapter_id, platform, signal));
        }
    };

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Ok(signal) => forward(signal),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            adapter = %adapter_id,
                            skipped,
                            "hub lagging behind adapter, signals dropped"
                        );
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut stop_rx => {
                    while let Ok(signal) = rx.try_recv() {
                        forward(signal);
                    }
                    break;
                }
            }
        }
    });

    (stop_tx, handle)
}
