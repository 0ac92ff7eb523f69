//! Full-screen console: the terminal bridge on one tab, the log viewer on the
//! other.

use std::io;
use std::io::IsTerminal;
use std::time::Instant;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::info;

use crate::config::{Config, ServerConfig};
use crate::logs::LogSubscriber;
use crate::terminal::{ContainerSize, SessionMode, TerminalSession};
use crate::transport::{WsConnector, WsOptions};
use crate::tui::core::Tab;
use crate::ui::UiError;

mod config;
mod diagnostics;
mod events;
mod lifecycle;
mod render;
mod state;
mod terminal_text;
mod view_model;

use config::{INPUT_POLL_WAIT, MAX_EVENTS_PER_TICK};
use diagnostics::RuntimeDiagnostics;
use events::{handle_key_event, KeyContext, LoopControl};
use lifecycle::{init_terminal, restore_terminal, shutdown_and_render_summary};
use render::{log_rows, render_ui, terminal_container};
use state::ConsoleState;
use view_model::{build_logs_view, build_status, build_terminal_view, ActiveView};

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ui(#[from] UiError),
    #[error("the console needs an interactive terminal")]
    NotInteractive,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsoleOptions {
    /// Open the live terminal session straight away.
    pub connect: bool,
    /// Subscribe to this service's logs on start.
    pub service: Option<String>,
    /// Initial picker entries. Fetched from the API when empty.
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOutcome {
    pub final_mode: SessionMode,
    pub service: Option<String>,
    pub records: usize,
}

pub fn run_console(config: &Config, options: ConsoleOptions) -> Result<ConsoleOutcome, ConsoleError> {
    if !io::stdout().is_terminal() {
        return Err(ConsoleError::NotInteractive);
    }
    let connector = WsConnector::new(WsOptions::default());
    let mut session = TerminalSession::new(
        &config.terminal,
        config.server.terminal_endpoint(),
        Box::new(connector),
    );
    let mut subscriber = LogSubscriber::new(config.server.clone(), &config.logs, Box::new(connector));
    let mut state = ConsoleState::new(options.services.clone());
    let mut diagnostics = RuntimeDiagnostics::from_env();

    info!(endpoint = %session.endpoint(), "console starting");
    let mut terminal = init_terminal()?;
    let result = run_loop(
        &mut terminal,
        Console {
            session: &mut session,
            subscriber: &mut subscriber,
            server: &config.server,
            state: &mut state,
            diagnostics: &mut diagnostics,
        },
        &options,
    );
    let restored = restore_terminal(&mut terminal);
    result?;
    restored?;
    info!("console stopped");
    shutdown_and_render_summary(&mut session, &mut subscriber)
}

struct Console<'a> {
    session: &'a mut TerminalSession,
    subscriber: &'a mut LogSubscriber,
    server: &'a ServerConfig,
    state: &'a mut ConsoleState,
    diagnostics: &'a mut RuntimeDiagnostics,
}

fn container_size(area: Rect) -> ContainerSize {
    let inner = terminal_container(area);
    ContainerSize::new(u32::from(inner.width), u32::from(inner.height))
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    console: Console<'_>,
    options: &ConsoleOptions,
) -> Result<(), ConsoleError> {
    let Console {
        session,
        subscriber,
        server,
        state,
        diagnostics,
    } = console;

    let size = terminal.size()?;
    let mut last_container = container_size(Rect::new(0, 0, size.width, size.height));
    session.mount(last_container, Instant::now());
    if options.connect {
        session.connect();
    }
    if let Some(service) = options.service.as_deref() {
        state.picker.focus(service);
        subscriber.select(service);
        if !options.connect {
            state.switch_tab(Tab::Logs);
        }
    }
    if state.picker.names().is_empty() {
        state.picker.refresh(server);
    }

    loop {
        let handled = session.pump(MAX_EVENTS_PER_TICK);
        diagnostics.record_session_events(handled);
        let now = Instant::now();
        let report = subscriber.pump(MAX_EVENTS_PER_TICK, now);
        diagnostics.record_log_pump(&report);
        state.log_scroll.shift(report.appended);
        if subscriber.take_scroll_request() {
            state.log_scroll.bottom();
        }
        state.picker.poll();

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let container = container_size(area);
        if container != last_container {
            session.resize(container, now);
            last_container = container;
        }
        if session.tick(now) {
            let dimensions = session.dimensions();
            diagnostics.record_resize(dimensions.rows, dimensions.cols);
        }
        state.spinner_tick = state.spinner_tick.wrapping_add(1);

        let status = build_status(session, subscriber, state);
        let active = match state.tab {
            Tab::Terminal => ActiveView::Terminal(build_terminal_view(session, state)),
            Tab::Logs => ActiveView::Logs(build_logs_view(subscriber, state, log_rows(area))),
        };
        let max_offset = match &active {
            ActiveView::Terminal(view) => view.max_offset,
            ActiveView::Logs(view) => view.max_offset,
        };
        let diagnostic_lines = diagnostics.enabled().then(|| diagnostics.summary_lines());
        terminal.draw(|frame| {
            render_ui(
                frame,
                state.tab,
                &status,
                &active,
                state.show_help,
                diagnostic_lines.as_deref(),
                state.spinner_tick,
            )
        })?;
        diagnostics.record_frame();

        if !event::poll(INPUT_POLL_WAIT)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctx = KeyContext {
                session: &mut *session,
                subscriber: &mut *subscriber,
                server,
                max_offset,
            };
            if handle_key_event(&key, ctx, state, diagnostics) == LoopControl::Quit {
                break;
            }
        }
    }
    Ok(())
}
