// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal journal: logs every hub signal.
//!
//! This is where persistence glue attaches. It consumes the same stream a
//! store writer would and turns each signal into one structured log line.

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use switchboard_hub::HubSignal;

/// Log `signal` at a level matching its severity.
pub fn record(signal: &HubSignal) {
    match signal {
        HubSignal::Message(message) => debug!(
            signal = signal.name(),
            adapter = %message.adapter_id,
            conversation = %message.conversation_id,
            kind = message.content.kind(),
            outgoing = message.is_outgoing,
            "message"
        ),
        HubSignal::Event(event) => debug!(
            signal = signal.name(),
            adapter = %event.adapter_id,
            event = %event.event_type(),
            "event"
        ),
        HubSignal::AdapterConnected { adapter_id, platform } => {
            info!(signal = signal.name(), adapter = %adapter_id, platform = %platform, "adapter connected")
        }
        HubSignal::AdapterDisconnected {
            adapter_id,
            platform,
            reason,
        } => info!(
            signal = signal.name(),
            adapter = %adapter_id,
            platform = %platform,
            reason = reason.as_deref().unwrap_or("none"),
            "adapter disconnected"
        ),
        HubSignal::AdapterError {
            adapter_id,
            platform,
            error,
            context,
        } => warn!(
            signal = signal.name(),
            adapter = %adapter_id,
            platform = %platform,
            error = %error,
            context = context.as_deref().unwrap_or("none"),
            "adapter error"
        ),
        HubSignal::Started | HubSignal::Stopped => info!(signal = signal.name(), "hub lifecycle"),
    }
}

/// Consume `signals` until the stream closes or `cancel` fires.
///
/// Signals already buffered when `cancel` fires are still recorded.
/// Returns the number of signals recorded.
pub async fn run(mut signals: broadcast::Receiver<HubSignal>, cancel: CancellationToken) -> usize {
    let mut recorded = 0;
    loop {
        tokio::select! {
            biased;
            received = signals.recv() => match received {
                Ok(signal) => {
                    record(&signal);
                    recorded += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "signal journal lagging, signals dropped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = cancel.cancelled() => {
                loop {
                    match signals.try_recv() {
                        Ok(signal) => {
                            record(&signal);
                            recorded += 1;
                        }
                        Err(TryRecvError::Lagged(skipped)) => {
                            warn!(skipped, "signal journal lagging, signals dropped");
                        }
                        Err(_) => break,
                    }
                }
                break;
            }
        }
    }
    debug!(recorded, "signal journal stopped");
    recorded
}
