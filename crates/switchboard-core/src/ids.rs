// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier formats shared by adapters, the hub, and consumers.
//!
//! - Composite conversation id: `<platform>:<adapter_id>:<native_conversation_id>`,
//!   the only addressing scheme consumers use for sends.
//! - Composite message id: `<native_conversation_id><sep><native_message_id>`,
//!   for platforms that need both halves to edit or delete a message.
//! - Internal message id: `<platform>-<epoch_millis>-<base36>`, advisory only.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::SwitchboardError;
use crate::types::PlatformType;

/// Segment delimiter of composite conversation ids.
pub const CONVERSATION_ID_DELIMITER: char = ':';

/// Length of the random suffix on internal message ids.
const MESSAGE_ID_SUFFIX_LEN: usize = 9;

/// A parsed composite conversation id.
///
/// The platform segment is informational; routing uses only the adapter id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId {
    platform: String,
    adapter_id: String,
    native_id: String,
}

impl ConversationId {
    /// Builds a conversation id, rejecting segments that would not parse back.
    pub fn new(
        platform: PlatformType,
        adapter_id: &str,
        native_id: &str,
    ) -> Result<Self, SwitchboardError> {
        let platform = platform.to_string();
        for (name, segment) in [("adapter id", adapter_id), ("native id", native_id)] {
            check_segment(&platform, adapter_id, native_id, name, segment)?;
        }
        Ok(Self {
            platform,
            adapter_id: adapter_id.to_string(),
            native_id: native_id.to_string(),
        })
    }

    /// Parses `<platform>:<adapter_id>:<native_id>`.
    ///
    /// Exactly three non-empty segments are required; anything else is an
    /// error rather than a guess.
    pub fn parse(id: &str) -> Result<Self, SwitchboardError> {
        let segments: Vec<&str> = id.split(CONVERSATION_ID_DELIMITER).collect();
        let [platform, adapter_id, native_id] = segments.as_slice() else {
            return Err(SwitchboardError::InvalidConversationId {
                id: id.to_string(),
                reason: format!(
                    "expected 3 `{CONVERSATION_ID_DELIMITER}`-separated segments, found {}",
                    segments.len()
                ),
            });
        };

        for (name, segment) in [
            ("platform", platform),
            ("adapter id", adapter_id),
            ("native id", native_id),
        ] {
            if segment.is_empty() {
                return Err(SwitchboardError::InvalidConversationId {
                    id: id.to_string(),
                    reason: format!("{name} segment is empty"),
                });
            }
        }

        Ok(Self {
            platform: platform.to_string(),
            adapter_id: adapter_id.to_string(),
            native_id: native_id.to_string(),
        })
    }

    /// Platform segment as written in the id.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Platform segment interpreted as a known platform, if it is one.
    pub fn platform_type(&self) -> Option<PlatformType> {
        PlatformType::from_str(&self.platform).ok()
    }

    pub fn adapter_id(&self) -> &str {
        &self.adapter_id
    }

    pub fn native_id(&self) -> &str {
        &self.native_id
    }
}

fn check_segment(
    platform: &str,
    adapter_id: &str,
    native_id: &str,
    name: &str,
    segment: &str,
) -> Result<(), SwitchboardError> {
    let reason = if segment.is_empty() {
        format!("{name} is empty")
    } else if segment.contains(CONVERSATION_ID_DELIMITER) {
        format!("{name} `{segment}` contains `{CONVERSATION_ID_DELIMITER}`")
    } else {
        return Ok(());
    };
    Err(SwitchboardError::InvalidConversationId {
        id: format!("{platform}{CONVERSATION_ID_DELIMITER}{adapter_id}{CONVERSATION_ID_DELIMITER}{native_id}"),
        reason,
    })
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}",
            self.platform,
            self.adapter_id,
            self.native_id,
            d = CONVERSATION_ID_DELIMITER
        )
    }
}

impl FromStr for ConversationId {
    type Err = SwitchboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Extracts the routing key from a composite conversation id.
pub fn adapter_id_of(conversation_id: &str) -> Result<String, SwitchboardError> {
    ConversationId::parse(conversation_id).map(|id| id.adapter_id)
}

/// Generates an advisory internal message id: `<platform>-<epoch_millis>-<base36>`.
///
/// Not collision-free. Never use it as a primary key of record.
pub fn generate_message_id(platform: PlatformType) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..MESSAGE_ID_SUFFIX_LEN)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{platform}-{millis}-{suffix}")
}

/// A platform message addressed by conversation and message halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub conversation: String,
    pub message: String,
}

impl MessageRef {
    pub fn new(conversation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation: conversation.into(),
            message: message.into(),
        }
    }

    /// Joins both halves with the adapter's separator.
    pub fn compose(&self, separator: &str) -> String {
        format!("{}{separator}{}", self.conversation, self.message)
    }

    /// Splits a composite message id at the last separator.
    ///
    /// The last occurrence is used because native conversation ids are more
    /// likely than message ids to contain punctuation.
    pub fn split(id: &str, separator: &str) -> Result<Self, SwitchboardError> {
        match id.rsplit_once(separator) {
            Some((conversation, message)) if !conversation.is_empty() && !message.is_empty() => {
                Ok(Self::new(conversation, message))
            }
            _ => Err(SwitchboardError::Send(format!(
                "message id `{id}` is not of the form <conversation>{separator}<message>"
            ))),
        }
    }
}
