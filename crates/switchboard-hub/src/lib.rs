// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel hub for the Switchboard chat gateway.
//!
//! The [`ChannelHub`] is the central coordinator that:
//! - Keeps a registry of channel adapters keyed by adapter id
//! - Fans every adapter's messages, events, and lifecycle changes into one stream
//! - Routes outbound sends by composite conversation id
//! - Broadcasts one message to many conversations concurrently
//! - Reconciles the registry against configuration via [`AdapterFactories`]
//! - Handles graceful shutdown

pub mod factory;
pub mod hub;
pub mod report;
pub mod shutdown;
pub mod signal;

pub use factory::{AdapterFactories, AdapterFactory};
pub use hub::ChannelHub;
pub use report::{AdapterStatus, BroadcastFailure, BroadcastResult, SyncReport};
pub use shutdown::{install_signal_handler, shutdown_hub};
pub use signal::HubSignal;
