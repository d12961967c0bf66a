// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Adapters use `#[async_trait]` so the hub can hold them as
//! `Arc<dyn ChannelAdapter>`.

pub mod channel;

pub use channel::ChannelAdapter;
