use std::time::Instant;

use tracing::{debug, info, warn};

use super::bridge::{mount_effects, reduce, BridgeEvent, Effect, SessionMode, SessionState};
use super::fit::{ContainerSize, FontMetrics, ResizeDebouncer};
use super::surface::{Dimensions, SurfaceView, TerminalSurface};
use crate::config::TerminalConfig;
use crate::transport::{Connector, Endpoint, Transport, TransportEvent};

/// One mounted terminal view: state machine, surface and live transport.
pub struct TerminalSession {
    state: SessionState,
    surface: TerminalSurface,
    connector: Box<dyn Connector>,
    endpoint: Endpoint,
    transport: Option<Box<dyn Transport>>,
    metrics: FontMetrics,
    debouncer: ResizeDebouncer,
    mounted: bool,
}

impl TerminalSession {
    pub fn new(config: &TerminalConfig, endpoint: Endpoint, connector: Box<dyn Connector>) -> Self {
        Self {
            state: SessionState::new(),
            surface: TerminalSurface::new(config.dimensions(), config.scrollback),
            connector,
            endpoint,
            transport: None,
            metrics: config.font_metrics(),
            debouncer: ResizeDebouncer::new(config.settle_delay()),
            mounted: false,
        }
    }

    /// Opens the surface and prints the welcome banner. The first fit runs
    /// once `container` has settled.
    pub fn mount(&mut self, container: ContainerSize, now: Instant) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.surface.open();
        self.apply(mount_effects());
        self.debouncer.request(container, now);
        debug!(endpoint = %self.endpoint, "terminal session mounted");
    }

    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn input_line(&self) -> &str {
        self.state.editor.line()
    }

    pub fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    pub fn dimensions(&self) -> Dimensions {
        self.surface.dimensions()
    }

    pub fn view(&mut self, offset: usize, follow: bool) -> SurfaceView {
        self.surface.view(offset, follow)
    }

    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        self.surface.cursor_position()
    }

    pub fn handle_keys(&mut self, keys: &str) {
        self.dispatch(BridgeEvent::Keys(keys.to_owned()));
    }

    pub fn request_clear(&mut self) {
        self.dispatch(BridgeEvent::ClearRequested);
    }

    pub fn connect(&mut self) {
        self.dispatch(BridgeEvent::ConnectRequested);
    }

    pub fn disconnect(&mut self) {
        self.dispatch(BridgeEvent::DisconnectRequested);
    }

    /// Drains up to `max_events` transport events. Returns how many were handled.
    pub fn pump(&mut self, max_events: usize) -> usize {
        let mut handled = 0usize;
        while handled < max_events {
            let Some(event) = self.transport.as_mut().and_then(|t| t.poll_event()) else {
                break;
            };
            handled += 1;
            let event = match event {
                TransportEvent::Opened => BridgeEvent::TransportOpened,
                TransportEvent::Message(raw) => BridgeEvent::TransportFrame(raw),
                TransportEvent::Closed(reason) => BridgeEvent::TransportClosed(reason),
                TransportEvent::Error(reason) => BridgeEvent::TransportFailed(reason),
            };
            self.dispatch(event);
        }
        handled
    }

    /// Container changed size; applied after the settle delay by `tick`.
    pub fn resize(&mut self, container: ContainerSize, now: Instant) {
        if self.mounted {
            self.debouncer.request(container, now);
        }
    }

    /// Applies a settled resize. Returns true when the grid changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let Some(container) = self.debouncer.poll(now) else {
            return false;
        };
        match self.surface.fit(container, self.metrics) {
            Some(dimensions) => {
                debug!(rows = dimensions.rows, cols = dimensions.cols, "terminal fitted");
                true
            }
            None => false,
        }
    }

    /// Closes the transport and releases the surface. Safe to call twice.
    pub fn unmount(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.surface.dispose();
        if self.mounted {
            debug!("terminal session unmounted");
        }
        self.mounted = false;
    }

    fn dispatch(&mut self, event: BridgeEvent) {
        let before = self.state.mode;
        let state = std::mem::take(&mut self.state);
        let (state, effects) = reduce(state, event);
        self.state = state;
        if before != self.state.mode {
            debug!(from = %before, to = %self.state.mode, "terminal session transition");
        }
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Write(text) => self.surface.write(&text),
                Effect::WriteLine(text) => self.surface.write_line(&text),
                Effect::ClearSurface => self.surface.clear(),
                Effect::Send(message) => match message.encode() {
                    Ok(frame) => {
                        if let Some(transport) = self.transport.as_mut() {
                            transport.send(frame);
                        }
                    }
                    Err(error) => warn!(%error, "failed to encode terminal input"),
                },
                Effect::OpenTransport => {
                    if let Some(mut stale) = self.transport.take() {
                        stale.close();
                    }
                    info!(url = %self.endpoint, "connecting live terminal session");
                    self.transport = Some(self.connector.open(&self.endpoint));
                }
                Effect::CloseTransport => {
                    if let Some(mut transport) = self.transport.take() {
                        transport.close();
                        info!(url = %self.endpoint, "live terminal session closed");
                    }
                }
                Effect::Diagnostic(message) => warn!(mode = %self.state.mode, "{message}"),
                Effect::Ignored(message) => debug!(mode = %self.state.mode, "{message}"),
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.unmount();
    }
}
