use std::fmt;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, trace, warn};

use super::buffer::{LogBuffer, LogEntry};
use crate::config::{LogsConfig, ServerConfig};
use crate::protocol::decode_log_frame;
use crate::transport::{Connector, Endpoint, Transport, TransportEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub service_name: String,
    pub state: ConnectionState,
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpReport {
    pub handled: usize,
    /// The stream finished its handshake during this pump.
    pub opened: bool,
    pub appended: usize,
    pub dropped_paused: usize,
    pub ignored: usize,
    pub reconnected: bool,
}

/// Streams one service's log records into a bounded buffer.
pub struct LogSubscriber {
    server: ServerConfig,
    connector: Box<dyn Connector>,
    transport: Option<Box<dyn Transport>>,
    subscription: Option<Subscription>,
    buffer: LogBuffer,
    paused: bool,
    auto_scroll: bool,
    scroll_requested: bool,
    reconnect_delay: Option<Duration>,
    reconnect_at: Option<Instant>,
}

impl LogSubscriber {
    pub fn new(server: ServerConfig, logs: &LogsConfig, connector: Box<dyn Connector>) -> Self {
        Self {
            server,
            connector,
            transport: None,
            subscription: None,
            buffer: LogBuffer::new(logs.max_entries),
            paused: false,
            auto_scroll: logs.auto_scroll,
            scroll_requested: false,
            reconnect_delay: logs.reconnect_delay(),
            reconnect_at: None,
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn selected_service(&self) -> Option<&str> {
        self.subscription
            .as_ref()
            .map(|subscription| subscription.service_name.as_str())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.subscription
            .as_ref()
            .map(|subscription| subscription.state)
            .unwrap_or_default()
    }

    pub fn endpoint_for(&self, service: &str) -> Endpoint {
        self.server.log_endpoint(service)
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.buffer.iter()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Switches the stream to `service`. The previous stream is closed and
    /// its records dropped before the new one opens.
    pub fn select(&mut self, service: &str) {
        if let Some(current) = self.subscription.as_ref() {
            if current.service_name == service && current.state != ConnectionState::Disconnected
            {
                return;
            }
        }
        self.close_transport();
        self.buffer.clear();
        self.reconnect_at = None;
        self.subscription = Some(Subscription {
            service_name: service.to_owned(),
            state: ConnectionState::Disconnected,
            paused: self.paused,
        });
        self.open_transport();
    }

    /// Drops the selection and its records.
    pub fn unselect(&mut self) {
        self.close_transport();
        self.reconnect_at = None;
        if let Some(subscription) = self.subscription.take() {
            debug!(service = %subscription.service_name, "log subscription removed");
        }
        self.buffer.clear();
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
        if !enabled {
            self.scroll_requested = false;
        }
    }

    pub fn toggle_auto_scroll(&mut self) -> bool {
        self.set_auto_scroll(!self.auto_scroll);
        self.auto_scroll
    }

    /// True once per batch of appended records while auto-scroll is on.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Reopens the selected service after the stream dropped. Returns false
    /// when there is nothing to reconnect.
    pub fn reconnect(&mut self) -> bool {
        match self.subscription.as_ref() {
            Some(subscription) if subscription.state == ConnectionState::Disconnected => {}
            _ => return false,
        }
        self.reconnect_at = None;
        self.open_transport();
        true
    }

    /// Drains up to `max_events` transport events, then fires a scheduled
    /// reconnect if one is due.
    pub fn pump(&mut self, max_events: usize, now: Instant) -> PumpReport {
        let mut report = PumpReport::default();
        while report.handled < max_events {
            let Some(event) = self.transport.as_mut().and_then(|t| t.poll_event()) else {
                break;
            };
            report.handled += 1;
            match event {
                TransportEvent::Opened => report.opened |= self.on_opened(),
                TransportEvent::Message(raw) => self.on_message(&raw, &mut report),
                TransportEvent::Closed(reason) => {
                    self.on_disconnected(reason.as_deref().unwrap_or("closed"), now);
                }
                TransportEvent::Error(reason) => self.on_disconnected(&reason, now),
            }
        }

        if let Some(due) = self.reconnect_at {
            if now >= due && self.reconnect() {
                report.reconnected = true;
            }
        }
        report
    }

    fn on_opened(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        if subscription.state != ConnectionState::Connecting {
            return false;
        }
        subscription.state = ConnectionState::Connected;
        info!(service = %subscription.service_name, "connected to log stream");
        true
    }

    fn on_message(&mut self, raw: &str, report: &mut PumpReport) {
        let message = match decode_log_frame(raw) {
            Ok(message) => message,
            Err(error) => {
                report.ignored += 1;
                trace!(%error, "ignored log frame");
                return;
            }
        };
        if self.paused {
            report.dropped_paused += 1;
            return;
        }
        self.buffer.push(message, Local::now());
        report.appended += 1;
        if self.auto_scroll {
            self.scroll_requested = true;
        }
    }

    fn on_disconnected(&mut self, reason: &str, now: Instant) {
        self.close_transport();
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        let was = subscription.state;
        subscription.state = ConnectionState::Disconnected;
        if was == ConnectionState::Connecting {
            warn!(service = %subscription.service_name, %reason, "log stream failed to open");
        } else {
            info!(service = %subscription.service_name, %reason, "disconnected from log stream");
        }
        self.reconnect_at = self.reconnect_delay.map(|delay| now + delay);
    }

    fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.paused = paused;
            debug!(service = %subscription.service_name, paused, "log stream pause toggled");
        }
    }

    fn open_transport(&mut self) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        let endpoint = self.server.log_endpoint(&subscription.service_name);
        debug!(url = %endpoint, "opening log stream");
        subscription.state = ConnectionState::Connecting;
        self.transport = Some(self.connector.open(&endpoint));
    }

    fn close_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.state = ConnectionState::Disconnected;
        }
    }
}

impl Drop for LogSubscriber {
    fn drop(&mut self) {
        self.close_transport();
    }
}

#[cfg(test)]
#[path = "../tests/subscriber_tests.rs"]
mod tests;
