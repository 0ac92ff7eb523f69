use std::io;
use std::io::IsTerminal;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::logs::LogSubscriber;
use crate::terminal::{SessionMode, TerminalSession};
use crate::ui::theme::{resolve_color_enabled, Theme};
use crate::ui::{KeyValue, OutputMode, PlainRenderer, Renderer};

use super::terminal_text::styled_text;
use super::{ConsoleError, ConsoleOutcome};

pub(super) type TuiTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub(super) fn init_terminal() -> Result<TuiTerminal, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

pub(super) fn restore_terminal(terminal: &mut TuiTerminal) -> Result<(), io::Error> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, EnableLineWrap)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Unmounts both views and prints what the session ended with.
pub(super) fn shutdown_and_render_summary(
    session: &mut TerminalSession,
    subscriber: &mut LogSubscriber,
) -> Result<ConsoleOutcome, ConsoleError> {
    let outcome = ConsoleOutcome {
        final_mode: session.mode(),
        service: subscriber.selected_service().map(str::to_owned),
        records: subscriber.buffer().len(),
    };
    session.unmount();
    subscriber.unselect();

    let mode = OutputMode::from_env();
    let mut renderer = PlainRenderer::stdout(mode);
    renderer.section("Session Summary")?;
    let color_enabled = resolve_color_enabled(mode, std::io::stdout().is_terminal());
    let theme = Theme::default();
    let terminal_state = match outcome.final_mode {
        SessionMode::Live => "live (closed on exit)",
        SessionMode::Connecting => "connecting (cancelled on exit)",
        SessionMode::Offline => "simulation",
    };
    let terminal_state = if color_enabled {
        styled_text(theme.muted, terminal_state)
    } else {
        terminal_state.to_owned()
    };
    let logs_state = match &outcome.service {
        Some(service) => format!("{service} ({} records)", outcome.records),
        None => "none".to_owned(),
    };
    renderer.key_values(&[
        KeyValue::new("terminal", terminal_state),
        KeyValue::new("logs", logs_state),
    ])?;
    renderer.text("")?;
    Ok(outcome)
}
