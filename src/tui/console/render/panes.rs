use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::logs::ConnectionState;

use super::super::state::PickerStatus;
use super::super::terminal_text::{ansi_line, sanitize_log_text, severity_color};
use super::super::view_model::{LogsViewModel, StatusModel, TerminalViewModel};
use super::header::{mode_color, panel_block};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn spinner(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

fn render_scrollbar(frame: &mut Frame<'_>, area: Rect, max_offset: usize, top_row: usize) {
    if max_offset == 0 {
        return;
    }
    let viewport = usize::from(area.height.saturating_sub(2)).max(1);
    let mut scrollbar_state = ScrollbarState::new(max_offset.saturating_add(viewport))
        .viewport_content_length(viewport)
        .position(top_row.min(max_offset));
    frame.render_stateful_widget(
        Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
        area,
        &mut scrollbar_state,
    );
}

pub(super) fn render_terminal_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &TerminalViewModel,
    status: &StatusModel,
    spinner_tick: usize,
) {
    let title = format!(" shell · {} ", view.endpoint);
    let panel = panel_block(Some(&title), false, mode_color(status.mode));
    let inactive_style = if status.capture {
        Style::default()
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };
    let lines = view
        .rows
        .iter()
        .map(|row| ansi_line(row, Style::default()))
        .collect::<Vec<Line>>();
    frame.render_widget(
        Paragraph::new(lines).block(panel).style(inactive_style),
        area,
    );

    let show_caret = (spinner_tick / 10).is_multiple_of(2);
    if status.capture && view.offset == 0 && show_caret {
        if let Some((row, col)) = view.cursor {
            let inner_x = area.x.saturating_add(1);
            let inner_y = area.y.saturating_add(1);
            let inner_w = area.width.saturating_sub(2);
            let inner_h = area.height.saturating_sub(2);
            if inner_w > 0 && inner_h > 0 {
                let cursor_x = inner_x.saturating_add(col.min(inner_w.saturating_sub(1)));
                let cursor_y = inner_y.saturating_add(row.min(inner_h.saturating_sub(1)));
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }

    render_scrollbar(
        frame,
        area,
        view.max_offset,
        view.max_offset.saturating_sub(view.offset),
    );
}

pub(super) fn render_logs_pane(
    frame: &mut Frame<'_>,
    services_area: Rect,
    records_area: Rect,
    view: &LogsViewModel,
    spinner_tick: usize,
) {
    render_service_list(frame, services_area, view, spinner_tick);
    render_records(frame, records_area, view, spinner_tick);
}

fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Disconnected => Color::Red,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Connected => Color::Green,
    }
}

fn render_service_list(frame: &mut Frame<'_>, area: Rect, view: &LogsViewModel, spinner_tick: usize) {
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::with_capacity(view.services.len() + 2);
    match &view.picker_status {
        PickerStatus::Idle => {}
        PickerStatus::Loading => lines.push(Line::from(vec![
            Span::styled(spinner(spinner_tick).to_owned(), Style::default().fg(Color::Yellow)),
            Span::styled(" loading services...", muted),
        ])),
        PickerStatus::Failed(reason) => lines.push(Line::from(Span::styled(
            format!("lookup failed: {reason}"),
            Style::default().fg(Color::Red),
        ))),
    }
    if view.services.is_empty() {
        lines.push(Line::from(Span::styled("no services (f to refresh)", muted)));
    }
    lines.extend(view.services.iter().enumerate().map(|(idx, name)| {
        let marker = if idx == view.picker_index { "› " } else { "  " };
        let style = if idx == view.picker_index {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut spans = vec![Span::styled(format!("{marker}{name}"), style)];
        if view.service.as_deref() == Some(name.as_str()) {
            spans.push(Span::styled(
                " ●",
                Style::default().fg(connection_color(view.connection)),
            ));
        }
        Line::from(spans)
    }));
    let list = Paragraph::new(lines).block(panel_block(Some(" Services "), false, Color::DarkGray));
    frame.render_widget(list, area);
}

fn render_records(frame: &mut Frame<'_>, area: Rect, view: &LogsViewModel, spinner_tick: usize) {
    let muted = Style::default().fg(Color::DarkGray);
    let title = match &view.service {
        Some(service) => format!(" {service} · {} ", view.connection),
        None => " Logs ".to_owned(),
    };
    let mut flags = Vec::new();
    if view.paused {
        flags.push("paused");
    }
    if view.auto_scroll {
        flags.push("auto-scroll");
    }
    let border = view
        .service
        .as_ref()
        .map(|_| connection_color(view.connection))
        .unwrap_or(Color::DarkGray);
    let mut panel = panel_block(Some(&title), false, border);
    if !flags.is_empty() {
        panel = panel.title_bottom(
            Line::from(Span::styled(format!(" {} ", flags.join(" · ")), muted)).right_aligned(),
        );
    }

    let records = if view.service.is_none() {
        Paragraph::new(Line::from(Span::styled(
            "Select a service and press enter to stream its logs.",
            muted,
        )))
    } else if view.lines.is_empty() {
        let waiting = match view.connection {
            ConnectionState::Disconnected => "disconnected (r to reconnect)".to_owned(),
            _ => format!("{} waiting for records...", spinner(spinner_tick)),
        };
        Paragraph::new(Line::from(Span::styled(waiting, muted)))
    } else {
        let lines = view
            .lines
            .iter()
            .map(|line| {
                let base = Style::default().fg(severity_color(line.severity));
                let mut spans = vec![Span::styled(format!("{} ", line.clock), muted)];
                spans.extend(ansi_line(&sanitize_log_text(&line.message), base).spans);
                Line::from(spans)
            })
            .collect::<Vec<Line>>();
        Paragraph::new(lines).scroll((view.top_row().min(u16::MAX as usize) as u16, 0))
    };
    frame.render_widget(records.block(panel), area);
    render_scrollbar(frame, area, view.max_offset, view.top_row());
}
