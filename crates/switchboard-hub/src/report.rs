// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate results returned by hub operations.

use std::collections::BTreeMap;

use serde::Serialize;
use switchboard_core::{ConnectionState, PlatformType, SendResult};

/// Outcome of a fan-out send.
///
/// `results` always has one entry per distinct destination, whether or not
/// the send succeeded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BroadcastResult {
    pub total_sent: usize,
    pub results: BTreeMap<String, SendResult>,
    pub failures: Vec<BroadcastFailure>,
}

/// One failed destination of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastFailure {
    pub conversation_id: String,
    /// `None` when the conversation id itself was malformed.
    pub adapter_id: Option<String>,
    pub error: String,
}

impl BroadcastResult {
    pub fn total_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Snapshot of one registered adapter, as served by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterStatus {
    pub id: String,
    pub platform: PlatformType,
    pub name: String,
    pub state: ConnectionState,
}

/// What [`ChannelHub::sync_channels`](crate::ChannelHub::sync_channels) changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Adapter ids newly registered (including replaced ones).
    pub registered: Vec<String>,
    /// Adapter ids unregistered (removed, disabled, or replaced).
    pub removed: Vec<String>,
    /// Channel ids that could not be registered, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.registered.is_empty() && self.removed.is_empty() && self.skipped.is_empty()
    }
}
