use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use crate::api::{fetch_services, ApiError, ServiceCatalog};
use crate::config::ServerConfig;
use crate::tui::core::{next_index, prev_index, ScrollState, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PickerStatus {
    Idle,
    Loading,
    Failed(String),
}

/// Service names offered on the logs tab, refreshed from the REST API on a
/// worker thread.
pub(super) struct ServicePicker {
    names: Vec<String>,
    index: usize,
    status: PickerStatus,
    pending: Option<Receiver<Result<ServiceCatalog, ApiError>>>,
}

impl ServicePicker {
    pub(super) fn new(names: Vec<String>) -> Self {
        Self {
            names,
            index: 0,
            status: PickerStatus::Idle,
            pending: None,
        }
    }

    pub(super) fn names(&self) -> &[String] {
        &self.names
    }

    pub(super) fn index(&self) -> usize {
        self.index
    }

    pub(super) fn status(&self) -> &PickerStatus {
        &self.status
    }

    pub(super) fn highlighted(&self) -> Option<&str> {
        self.names.get(self.index).map(String::as_str)
    }

    pub(super) fn next(&mut self) {
        self.index = next_index(self.index, self.names.len());
    }

    pub(super) fn prev(&mut self) {
        self.index = prev_index(self.index, self.names.len());
    }

    /// Points the highlight at `name`, adding it when the catalogue does not
    /// list it.
    pub(super) fn focus(&mut self, name: &str) {
        match self.names.iter().position(|known| known == name) {
            Some(index) => self.index = index,
            None => {
                self.names.push(name.to_owned());
                self.index = self.names.len() - 1;
            }
        }
    }

    pub(super) fn refresh(&mut self, server: &ServerConfig) {
        if self.pending.is_some() {
            return;
        }
        let server = server.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(fetch_services(&server));
        });
        self.pending = Some(rx);
        self.status = PickerStatus::Loading;
    }

    /// Picks up a finished refresh. Returns true when the list changed.
    pub(super) fn poll(&mut self) -> bool {
        let Some(rx) = self.pending.as_ref() else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.status = PickerStatus::Failed("service lookup ended unexpectedly".to_owned());
                return false;
            }
        };
        self.pending = None;
        match result {
            Ok(catalog) => {
                for error in catalog.errors() {
                    warn!(%error, "service category unavailable");
                }
                self.apply(catalog.names());
                debug!(count = self.names.len(), "service list refreshed");
                true
            }
            Err(error) => {
                warn!(%error, "service list refresh failed");
                self.status = PickerStatus::Failed(error.to_string());
                false
            }
        }
    }

    pub(super) fn apply(&mut self, names: Vec<String>) {
        let highlighted = self.highlighted().map(str::to_owned);
        self.names = names;
        self.status = PickerStatus::Idle;
        self.index = highlighted
            .and_then(|name| self.names.iter().position(|known| *known == name))
            .unwrap_or(0);
    }
}

pub(super) struct ConsoleState {
    pub(super) tab: Tab,
    pub(super) capture: bool,
    pub(super) show_help: bool,
    pub(super) terminal_scroll: ScrollState,
    pub(super) log_scroll: ScrollState,
    pub(super) picker: ServicePicker,
    pub(super) spinner_tick: usize,
}

impl ConsoleState {
    pub(super) fn new(services: Vec<String>) -> Self {
        Self {
            tab: Tab::Terminal,
            capture: true,
            show_help: false,
            terminal_scroll: ScrollState::default(),
            log_scroll: ScrollState::default(),
            picker: ServicePicker::new(services),
            spinner_tick: 0,
        }
    }

    pub(super) fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.show_help = false;
        self.capture = tab == Tab::Terminal && self.capture;
    }
}
