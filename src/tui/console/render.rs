use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::tui::core::Tab;

use super::view_model::{ActiveView, StatusModel};

mod footer;
mod header;
mod help_overlay;
mod panes;

use footer::render_footer;
use header::render_tabs;
use help_overlay::render_help_overlay;
use panes::{render_logs_pane, render_terminal_pane};

const SERVICE_LIST_WIDTH: u16 = 28;

fn main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn logs_chunks(body: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SERVICE_LIST_WIDTH), Constraint::Min(1)])
        .split(body);
    [chunks[0], chunks[1]]
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Cell area the terminal grid is fitted to.
pub(super) fn terminal_container(area: Rect) -> Rect {
    inner(main_chunks(area)[1])
}

/// Number of log records visible at once.
pub(super) fn log_rows(area: Rect) -> usize {
    let [_, records] = logs_chunks(main_chunks(area)[1]);
    usize::from(inner(records).height)
}

pub(super) fn render_ui(
    frame: &mut Frame<'_>,
    tab: Tab,
    status: &StatusModel,
    active: &ActiveView,
    show_help: bool,
    diagnostics: Option<&[String]>,
    spinner_tick: usize,
) {
    let [tabs, body, footer] = main_chunks(frame.area());

    render_tabs(frame, tabs, tab, status);

    if show_help {
        render_help_overlay(frame, body, diagnostics);
    } else {
        match active {
            ActiveView::Terminal(view) => {
                render_terminal_pane(frame, body, view, status, spinner_tick)
            }
            ActiveView::Logs(view) => {
                let [services, records] = logs_chunks(body);
                render_logs_pane(frame, services, records, view, spinner_tick);
            }
        }
    }

    render_footer(frame, footer, tab, status, show_help);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{ConnectionState, Severity};
    use crate::terminal::SessionMode;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::super::state::PickerStatus;
    use super::super::view_model::{LogLine, LogsViewModel, TerminalViewModel};

    fn status(capture: bool) -> StatusModel {
        StatusModel {
            mode: SessionMode::Offline,
            capture,
            service: Some("api".to_owned()),
            connection: ConnectionState::Connected,
            paused: true,
        }
    }

    fn draw(tab: Tab, status: &StatusModel, active: &ActiveView, show_help: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).expect("terminal");
        terminal
            .draw(|frame| render_ui(frame, tab, status, active, show_help, None, 0))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn terminal_tab_draws_surface_rows_and_mode() {
        let view = ActiveView::Terminal(TerminalViewModel {
            rows: vec!["\u{1b}[1;32mdevstack@manager\u{1b}[0m:$ help".to_owned()],
            offset: 0,
            max_offset: 0,
            cursor: Some((0, 5)),
            endpoint: "ws://localhost:8000/ws/terminal".to_owned(),
        });
        let screen = draw(Tab::Terminal, &status(false), &view, false);
        assert!(screen.contains("terminal [simulation]"));
        assert!(screen.contains("devstack@manager:$ help"));
        assert!(screen.contains("shell · ws://localhost:8000/ws/terminal"));
        assert!(screen.contains("mode:command (ctrl+g)"));
    }

    #[test]
    fn logs_tab_draws_picker_and_records() {
        let view = ActiveView::Logs(LogsViewModel {
            services: vec!["api".to_owned(), "web".to_owned()],
            picker_index: 1,
            picker_status: PickerStatus::Idle,
            service: Some("api".to_owned()),
            connection: ConnectionState::Connected,
            paused: true,
            auto_scroll: true,
            lines: vec![LogLine {
                clock: "10:30:15".to_owned(),
                severity: Severity::Error,
                message: "ERROR: boom".to_owned(),
            }],
            offset: 0,
            max_offset: 0,
        });
        let screen = draw(Tab::Logs, &status(false), &view, false);
        assert!(screen.contains("› web"));
        assert!(screen.contains("api · connected"));
        assert!(screen.contains("10:30:15 ERROR: boom"));
        assert!(screen.contains("paused · auto-scroll"));
    }

    #[test]
    fn help_replaces_the_body() {
        let view = ActiveView::Terminal(TerminalViewModel {
            rows: vec!["hidden".to_owned()],
            offset: 0,
            max_offset: 0,
            cursor: None,
            endpoint: String::new(),
        });
        let screen = draw(Tab::Terminal, &status(true), &view, true);
        assert!(screen.contains("Command Mode"));
        assert!(!screen.contains("hidden"));
    }

    #[test]
    fn terminal_container_is_the_bordered_body() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(terminal_container(area), Rect::new(1, 4, 98, 24));
    }

    #[test]
    fn log_rows_follow_the_records_panel() {
        assert_eq!(log_rows(Rect::new(0, 0, 100, 30)), 24);
        assert_eq!(log_rows(Rect::new(0, 0, 40, 10)), 4);
    }
}
