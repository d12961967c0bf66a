// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified protocol: the platform-agnostic message, event, sender, and
//! conversation schema that every adapter produces and every consumer reads.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SwitchboardError;

/// Chat platforms a channel adapter can connect to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Telegram,
    Discord,
    Whatsapp,
    /// iMessage through a BlueBubbles-style bridge.
    Imessage,
}

/// One configured platform connection.
///
/// An adapter owns exactly one `ChannelConfig` for its whole lifetime.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Unique adapter id, also the middle segment of conversation ids.
    pub id: String,

    /// Platform this channel talks to.
    pub platform: PlatformType,

    /// Human-readable display name.
    pub name: String,

    /// Disabled channels are skipped when building adapters.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Opaque, platform-specific credentials (bot tokens, bridge passwords).
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

impl ChannelConfig {
    /// Creates an enabled channel config without credentials.
    pub fn new(id: impl Into<String>, platform: PlatformType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform,
            name: name.into(),
            enabled: true,
            credentials: BTreeMap::new(),
        }
    }

    /// Adds a credential entry, builder style.
    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    /// Looks up a credential by key.
    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials.get(key).map(String::as_str)
    }

    /// Looks up a credential that the adapter cannot work without.
    pub fn require_credential(&self, key: &str) -> Result<&str, SwitchboardError> {
        match self.credential(key) {
            Some(value) if !value.is_empty() => Ok(value),
            Some(_) => Err(SwitchboardError::Config(format!(
                "channel `{}`: credential `{key}` cannot be empty",
                self.id
            ))),
            None => Err(SwitchboardError::Config(format!(
                "channel `{}`: credential `{key}` is required for {}",
                self.id, self.platform
            ))),
        }
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Credential values never reach logs.
        let keys: Vec<&str> = self.credentials.keys().map(String::as_str).collect();
        f.debug_struct("ChannelConfig")
            .field("id", &self.id)
            .field("platform", &self.platform)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("credentials", &keys)
            .finish()
    }
}

/// Optional features a channel adapter implements.
///
/// Callers check these instead of inspecting the concrete adapter type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCapabilities {
    pub supports_edit: bool,
    pub supports_delete: bool,
    pub supports_reactions: bool,
    pub supports_typing: bool,
    pub supports_conversation_lookup: bool,
    /// Longest text the platform accepts in one message, if limited.
    pub max_message_length: Option<usize>,
}

/// The human or bot that produced a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedSender {
    /// Internal id derived from platform and platform-native id.
    pub id: String,
    pub platform_user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl UnifiedSender {
    /// Creates a sender whose internal id is `<platform>-<platform_user_id>`.
    pub fn new(
        platform: PlatformType,
        platform_user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let platform_user_id = platform_user_id.into();
        Self {
            id: Self::derive_id(platform, &platform_user_id),
            platform_user_id,
            display_name: display_name.into(),
            username: None,
            avatar_url: None,
            is_bot: false,
        }
    }

    /// The deterministic internal id for a platform user.
    pub fn derive_id(platform: PlatformType, platform_user_id: &str) -> String {
        format!("{platform}-{platform_user_id}")
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}

/// Formatting span inside a text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntity {
    pub kind: TextEntityKind,
    /// Offset in UTF-16 code units, which is what most platforms report.
    pub offset: usize,
    pub length: usize,
    /// Target for `link` entities, user id for `mention` entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TextEntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Pre,
    Link,
    Mention,
    Hashtag,
    Spoiler,
}

/// The payload of a message. Exactly one variant per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        entities: Vec<TextEntity>,
    },
    Image {
        url: String,
        caption: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        mime_type: Option<String>,
    },
    Video {
        url: String,
        caption: Option<String>,
        duration_secs: Option<u32>,
        width: Option<u32>,
        height: Option<u32>,
        mime_type: Option<String>,
    },
    Audio {
        url: String,
        duration_secs: Option<u32>,
        mime_type: Option<String>,
        /// Push-to-talk voice note rather than a music/audio file.
        #[serde(default)]
        voice: bool,
    },
    File {
        url: String,
        file_name: String,
        mime_type: Option<String>,
        size_bytes: Option<u64>,
        caption: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
        title: Option<String>,
        address: Option<String>,
    },
    Sticker {
        sticker_id: String,
        url: Option<String>,
        emoji: Option<String>,
    },
    Reaction {
        emoji: String,
        target_message_id: String,
    },
    Contact {
        name: String,
        phone: Option<String>,
        platform_user_id: Option<String>,
    },
}

impl MessageContent {
    /// Plain text content without entities.
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// Degrades a payload the adapter cannot map into a text placeholder.
    ///
    /// `fallback` is any human-readable text the platform supplied alongside
    /// the payload (a caption, a notification preview).
    pub fn unsupported(kind: &str, fallback: Option<String>) -> Self {
        match fallback {
            Some(text) if !text.trim().is_empty() => Self::text(text),
            _ => Self::text(format!("[unsupported {kind} message]")),
        }
    }

    /// Decodes a JSON payload, degrading unknown or malformed shapes to text.
    pub fn from_value(value: serde_json::Value) -> Self {
        if let serde_json::Value::String(text) = value {
            return Self::text(text);
        }

        let kind = value
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let fallback = ["text", "caption", "body"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);

        serde_json::from_value(value).unwrap_or_else(|_| Self::unsupported(&kind, fallback))
    }

    /// The variant tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageContent::Text { .. } => "text",
            MessageContent::Image { .. } => "image",
            MessageContent::Video { .. } => "video",
            MessageContent::Audio { .. } => "audio",
            MessageContent::File { .. } => "file",
            MessageContent::Location { .. } => "location",
            MessageContent::Sticker { .. } => "sticker",
            MessageContent::Reaction { .. } => "reaction",
            MessageContent::Contact { .. } => "contact",
        }
    }

    /// Text body or caption, when the variant has one.
    pub fn text_body(&self) -> Option<&str> {
        match self {
            MessageContent::Text { text, .. } => Some(text),
            MessageContent::Image { caption, .. }
            | MessageContent::Video { caption, .. }
            | MessageContent::File { caption, .. } => caption.as_deref(),
            _ => None,
        }
    }
}

/// One normalized inbound or outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedMessage {
    /// Advisory internal id, see [`crate::ids::generate_message_id`].
    pub id: String,
    pub platform: PlatformType,
    pub adapter_id: String,
    pub platform_message_id: String,
    /// Composite `<platform>:<adapter>:<native>` conversation id.
    pub conversation_id: String,
    pub platform_conversation_id: String,
    pub sender: UnifiedSender,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    /// Platform-native id of the message this one replies to.
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    /// True when the message was sent by this system.
    #[serde(default)]
    pub is_outgoing: bool,
    /// Untouched platform payload for consumers that need platform detail.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Discriminant of [`EventPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MessageEdited,
    MessageDeleted,
    ReactionAdded,
    ReactionRemoved,
    TypingStarted,
    TypingStopped,
    UserJoined,
    UserLeft,
    ChannelConnected,
    ChannelDisconnected,
    ChannelError,
}

/// Type-specific event data; the tag alone determines the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    MessageEdited {
        conversation_id: String,
        message_id: String,
        content: MessageContent,
        edited_at: DateTime<Utc>,
    },
    MessageDeleted {
        conversation_id: String,
        message_id: String,
    },
    ReactionAdded {
        conversation_id: String,
        message_id: String,
        emoji: String,
        user: UnifiedSender,
    },
    ReactionRemoved {
        conversation_id: String,
        message_id: String,
        emoji: String,
        user: UnifiedSender,
    },
    TypingStarted {
        conversation_id: String,
        user: UnifiedSender,
    },
    TypingStopped {
        conversation_id: String,
        user: UnifiedSender,
    },
    UserJoined {
        conversation_id: String,
        user: UnifiedSender,
    },
    UserLeft {
        conversation_id: String,
        user: UnifiedSender,
    },
    ChannelConnected,
    ChannelDisconnected {
        reason: Option<String>,
    },
    ChannelError {
        error: String,
        context: Option<String>,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::MessageEdited { .. } => EventType::MessageEdited,
            EventPayload::MessageDeleted { .. } => EventType::MessageDeleted,
            EventPayload::ReactionAdded { .. } => EventType::ReactionAdded,
            EventPayload::ReactionRemoved { .. } => EventType::ReactionRemoved,
            EventPayload::TypingStarted { .. } => EventType::TypingStarted,
            EventPayload::TypingStopped { .. } => EventType::TypingStopped,
            EventPayload::UserJoined { .. } => EventType::UserJoined,
            EventPayload::UserLeft { .. } => EventType::UserLeft,
            EventPayload::ChannelConnected => EventType::ChannelConnected,
            EventPayload::ChannelDisconnected { .. } => EventType::ChannelDisconnected,
            EventPayload::ChannelError { .. } => EventType::ChannelError,
        }
    }
}

/// A non-message lifecycle signal from one adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedEvent {
    pub platform: PlatformType,
    pub adapter_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl UnifiedEvent {
    pub fn new(platform: PlatformType, adapter_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            platform,
            adapter_id: adapter_id.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

/// Cached metadata about a chat. Never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Composite conversation id.
    pub id: String,
    pub platform: PlatformType,
    pub adapter_id: String,
    pub platform_conversation_id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    pub participant_count: Option<u32>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// How the platform should interpret text formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Plain,
    Markdown,
    Html,
}

/// Per-send options understood by every adapter (each may ignore some).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendOptions {
    /// Platform-native id of the message to reply to.
    pub reply_to: Option<String>,
    pub thread_id: Option<String>,
    pub parse_mode: Option<ParseMode>,
    /// Deliver without a notification, where the platform supports it.
    pub silent: bool,
}

impl SendOptions {
    pub fn reply_to(mut self, platform_message_id: impl Into<String>) -> Self {
        self.reply_to = Some(platform_message_id.into());
        self
    }

    pub fn in_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Outcome of a send or edit. Failure is a value, never a panic or `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<UnifiedMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    /// Success with the normalized outgoing message.
    pub fn delivered(message: UnifiedMessage) -> Self {
        Self {
            success: true,
            message: Some(message),
            error: None,
        }
    }

    /// Success where the platform returned nothing worth normalizing.
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }

    /// Collapses any adapter-side `Result` into a `SendResult`.
    pub fn from_result(result: Result<UnifiedMessage, SwitchboardError>) -> Self {
        match result {
            Ok(message) => Self::delivered(message),
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platform_type_string_forms() {
        use std::str::FromStr;

        for platform in [
            PlatformType::Telegram,
            PlatformType::Discord,
            PlatformType::Whatsapp,
            PlatformType::Imessage,
        ] {
            let s = platform.to_string();
            assert_eq!(PlatformType::from_str(&s).unwrap(), platform);
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{s}\""));
        }
        assert_eq!(PlatformType::Imessage.to_string(), "imessage");
    }

    #[test]
    fn sender_id_is_derived() {
        let a = UnifiedSender::new(PlatformType::Discord, "8812", "ana");
        let b = UnifiedSender::new(PlatformType::Discord, "8812", "Ana B.");
        assert_eq!(a.id, "discord-8812");
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn content_uses_type_tag() {
        let content = MessageContent::Image {
            url: "https://cdn.example/p.png".into(),
            caption: Some("look".into()),
            width: Some(640),
            height: Some(480),
            mime_type: None,
        };
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["width"], 640);
        assert_eq!(content.kind(), "image");
        assert_eq!(content.text_body(), Some("look"));
    }

    #[test]
    fn text_without_entities_omits_them() {
        let value = serde_json::to_value(MessageContent::text("hi")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn from_value_decodes_known_variants() {
        let content = MessageContent::from_value(json!({
            "type": "location",
            "latitude": 52.52,
            "longitude": 13.405
        }));
        match content {
            MessageContent::Location {
                latitude, title, ..
            } => {
                assert!((latitude - 52.52).abs() < f64::EPSILON);
                assert!(title.is_none());
            }
            other => panic!("expected location, got {other:?}"),
        }
    }

    #[test]
    fn from_value_degrades_unknown_variant_to_text() {
        let content = MessageContent::from_value(json!({"type": "poll", "question": "lunch?"}));
        assert_eq!(content, MessageContent::text("[unsupported poll message]"));

        let content = MessageContent::from_value(json!({"type": "story", "caption": "sunset"}));
        assert_eq!(content, MessageContent::text("sunset"));

        let content = MessageContent::from_value(json!("plain string"));
        assert_eq!(content, MessageContent::text("plain string"));
    }

    #[test]
    fn event_payload_shape_follows_tag() {
        let event = UnifiedEvent::new(
            PlatformType::Telegram,
            "telegram-main",
            EventPayload::MessageDeleted {
                conversation_id: "telegram:telegram-main:1".into(),
                message_id: "1:99".into(),
            },
        );
        assert_eq!(event.event_type(), EventType::MessageDeleted);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "message_deleted");
        assert_eq!(value["adapter_id"], "telegram-main");
        assert_eq!(value["message_id"], "1:99");

        let back: UnifiedEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn unit_event_payload_serializes() {
        let event = UnifiedEvent::new(PlatformType::Discord, "dc", EventPayload::ChannelConnected);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "channel_connected");
        assert_eq!(EventType::ChannelConnected.to_string(), "channel_connected");
    }

    #[test]
    fn channel_config_debug_redacts_credentials() {
        let config = ChannelConfig::new("tg", PlatformType::Telegram, "Bot")
            .with_credential("bot_token", "123:SECRET");
        let debug = format!("{config:?}");
        assert!(debug.contains("bot_token"));
        assert!(!debug.contains("SECRET"));
    }

    #[test]
    fn require_credential_reports_missing_and_empty() {
        let config = ChannelConfig::new("wa", PlatformType::Whatsapp, "Phone")
            .with_credential("session", "");
        let missing = config.require_credential("api_key").unwrap_err();
        assert!(missing.to_string().contains("is required for whatsapp"));
        let empty = config.require_credential("session").unwrap_err();
        assert!(empty.to_string().contains("cannot be empty"));
    }

    #[test]
    fn channel_config_enabled_defaults_true() {
        let config: ChannelConfig = serde_json::from_value(json!({
            "id": "im",
            "platform": "imessage",
            "name": "Bridge"
        }))
        .unwrap();
        assert!(config.enabled);
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn send_result_failure_is_a_value() {
        let result = SendResult::from_result(Err(SwitchboardError::Send("rate limited".into())));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("send failed: rate limited"));
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("message").is_none());
    }
}
