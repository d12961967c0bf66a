// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hub-level signal stream.
//!
//! Every adapter's [`AdapterSignal`] is re-emitted here tagged with the
//! adapter identity, alongside the hub's own `started`/`stopped` signals.

use switchboard_core::{AdapterSignal, EventPayload, PlatformType, UnifiedEvent, UnifiedMessage};

/// One entry on the hub's shared signal stream.
#[derive(Debug, Clone)]
pub enum HubSignal {
    Message(UnifiedMessage),
    Event(UnifiedEvent),
    AdapterConnected {
        adapter_id: String,
        platform: PlatformType,
    },
    AdapterDisconnected {
        adapter_id: String,
        platform: PlatformType,
        reason: Option<String>,
    },
    AdapterError {
        adapter_id: String,
        platform: PlatformType,
        error: String,
        context: Option<String>,
    },
    Started,
    Stopped,
}

impl HubSignal {
    /// Tags an adapter signal with the adapter it came from.
    pub fn from_adapter(adapter_id: &str, platform: PlatformType, signal: AdapterSignal) -> Self {
        match signal {
            AdapterSignal::Message(message) => HubSignal::Message(message),
            AdapterSignal::Event(event) => HubSignal::Event(event),
            AdapterSignal::Connected => HubSignal::AdapterConnected {
                adapter_id: adapter_id.to_string(),
                platform,
            },
            AdapterSignal::Disconnected { reason } => HubSignal::AdapterDisconnected {
                adapter_id: adapter_id.to_string(),
                platform,
                reason,
            },
            AdapterSignal::Error { error, context } => HubSignal::AdapterError {
                adapter_id: adapter_id.to_string(),
                platform,
                error,
                context,
            },
        }
    }

    /// Signal name as consumers know it (`message`, `adapter:connected`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            HubSignal::Message(_) => "message",
            HubSignal::Event(_) => "event",
            HubSignal::AdapterConnected { .. } => "adapter:connected",
            HubSignal::AdapterDisconnected { .. } => "adapter:disconnected",
            HubSignal::AdapterError { .. } => "adapter:error",
            HubSignal::Started => "started",
            HubSignal::Stopped => "stopped",
        }
    }

    /// Adapter the signal concerns, if any.
    pub fn adapter_id(&self) -> Option<&str> {
        match self {
            HubSignal::Message(message) => Some(&message.adapter_id),
            HubSignal::Event(event) => Some(&event.adapter_id),
            HubSignal::AdapterConnected { adapter_id, .. }
            | HubSignal::AdapterDisconnected { adapter_id, .. }
            | HubSignal::AdapterError { adapter_id, .. } => Some(adapter_id),
            HubSignal::Started | HubSignal::Stopped => None,
        }
    }

    /// Lifecycle signals as [`UnifiedEvent`]s, for event-log consumers.
    ///
    /// `Event` signals are returned as-is; messages and hub start/stop
    /// have no event form.
    pub fn to_event(&self) -> Option<UnifiedEvent> {
        match self {
            HubSignal::Event(event) => Some(event.clone()),
            HubSignal::AdapterConnected {
                adapter_id,
                platform,
            } => Some(UnifiedEvent::new(
                *platform,
                adapter_id.as_str(),
                EventPayload::ChannelConnected,
            )),
            HubSignal::AdapterDisconnected {
                adapter_id,
                platform,
                reason,
            } => Some(UnifiedEvent::new(
                *platform,
                adapter_id.as_str(),
                EventPayload::ChannelDisconnected {
                    reason: reason.clone(),
                },
            )),
            HubSignal::AdapterError {
                adapter_id,
                platform,
                error,
                context,
            } => Some(UnifiedEvent::new(
                *platform,
                adapter_id.as_str(),
                EventPayload::ChannelError {
                    error: error.clone(),
                    context: context.clone(),
                },
            )),
            HubSignal::Message(_) | HubSignal::Started | HubSignal::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::EventType;

    #[test]
    fn adapter_signals_are_tagged() {
        let signal = HubSignal::from_adapter(
            "dc",
            PlatformType::Discord,
            AdapterSignal::Disconnected {
                reason: Some("gateway closed".into()),
            },
        );
        assert_eq!(signal.name(), "adapter:disconnected");
        assert_eq!(signal.adapter_id(), Some("dc"));
        match signal {
            HubSignal::AdapterDisconnected {
                platform, reason, ..
            } => {
                assert_eq!(platform, PlatformType::Discord);
                assert_eq!(reason.as_deref(), Some("gateway closed"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lifecycle_signals_map_to_events() {
        let error = HubSignal::AdapterError {
            adapter_id: "wa".into(),
            platform: PlatformType::Whatsapp,
            error: "qr expired".into(),
            context: Some("connect".into()),
        };
        let event = error.to_event().unwrap();
        assert_eq!(event.event_type(), EventType::ChannelError);
        assert_eq!(event.adapter_id, "wa");

        assert!(HubSignal::Started.to_event().is_none());
        assert_eq!(HubSignal::Stopped.name(), "stopped");
        assert!(HubSignal::Started.adapter_id().is_none());
    }
}
