// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Switchboard integration tests.
//!
//! Provides a scriptable in-memory adapter for fast, deterministic,
//! CI-runnable tests without any chat platform.
//!
//! # Components
//!
//! - [`MockAdapter`] - Channel adapter with message injection, call capture,
//!   and scripted connect/send failures

pub mod mock_adapter;

pub use mock_adapter::{MOCK_MESSAGE_SEPARATOR, MockAdapter, SentCall};
