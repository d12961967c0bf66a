// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection state machine shared by every channel adapter.
//!
//! `disconnected -> connecting -> connected`, `connected -> disconnected`,
//! any state `-> error`. `reconnecting` is reserved for adapters that retry
//! on their own.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// States in the adapter connection FSM.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Error,
}

impl ConnectionState {
    /// Whether the FSM permits moving from `self` to `next`.
    ///
    /// Staying in the same state is always permitted and is a no-op.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        if self == next || next == Error {
            return true;
        }

        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
                | (Connected, Reconnecting)
                | (Reconnecting, Connecting)
                | (Reconnecting, Connected)
                | (Reconnecting, Disconnected)
                | (Error, Connecting)
                | (Error, Reconnecting)
                | (Error, Disconnected)
        )
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}
