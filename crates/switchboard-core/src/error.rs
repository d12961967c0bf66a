// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by adapters, the hub, and the configuration layer.

use thiserror::Error;

use crate::state::ConnectionState;
use crate::types::PlatformType;

/// The primary error type used across the adapter contract and hub operations.
#[derive(Debug, Error)]
pub enum SwitchboardError {
    /// Configuration errors (missing credentials, invalid channel settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Platform connection errors (invalid token, network unreachable).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An adapter with the same id is already in the registry.
    #[error("adapter already registered: {id}")]
    AdapterAlreadyRegistered { id: String },

    /// No adapter with this id is registered.
    #[error("adapter not found: {id}")]
    AdapterNotFound { id: String },

    /// The adapter exists but is not in the `connected` state.
    #[error("adapter not connected: {id} (state: {state})")]
    AdapterNotConnected { id: String, state: ConnectionState },

    /// A composite conversation id could not be built or parsed.
    #[error("invalid conversation id `{id}`: {reason}")]
    InvalidConversationId { id: String, reason: String },

    /// The connection state machine refused a transition.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// An optional capability the platform does not provide.
    #[error("{operation} is not supported by {platform}")]
    Unsupported {
        platform: PlatformType,
        operation: &'static str,
    },

    /// A send, edit, or delete was rejected by the platform.
    #[error("send failed: {0}")]
    Send(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwitchboardError {
    /// Shorthand for a [`SwitchboardError::Channel`] without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        SwitchboardError::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`SwitchboardError::Unsupported`] error.
    pub fn unsupported(platform: PlatformType, operation: &'static str) -> Self {
        SwitchboardError::Unsupported {
            platform,
            operation,
        }
    }

    /// Returns true for routing failures that never reached an adapter.
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            SwitchboardError::AdapterNotFound { .. }
                | SwitchboardError::AdapterNotConnected { .. }
                | SwitchboardError::InvalidConversationId { .. }
        )
    }
}
