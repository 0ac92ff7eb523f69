use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

use crate::logs::ConnectionState;
use crate::terminal::SessionMode;
use crate::tui::core::Tab;

use super::super::view_model::StatusModel;

pub(super) fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: Tab, status: &StatusModel) {
    let titles = Tab::ALL
        .iter()
        .map(|tab| {
            let label = tab_label(*tab, status);
            let style = if *tab == Tab::Terminal && status.capture && *tab == active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if *tab == active {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(label, style))
        })
        .collect::<Vec<Line>>();

    let tabs = Tabs::new(titles)
        .select(active.index())
        .block(panel_block(Some(" DEVSTACK "), true, Color::Magenta))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn tab_label(tab: Tab, status: &StatusModel) -> String {
    match tab {
        Tab::Terminal => format!("{} [{}]", tab.title(), status.mode),
        Tab::Logs => match (&status.service, status.connection) {
            (Some(service), ConnectionState::Connected) => format!("{} [{service}]", tab.title()),
            (Some(service), state) => format!("{} [{service}: {state}]", tab.title()),
            (None, _) => tab.title().to_owned(),
        },
    }
}

pub(super) fn mode_color(mode: SessionMode) -> Color {
    match mode {
        SessionMode::Offline => Color::DarkGray,
        SessionMode::Connecting => Color::Yellow,
        SessionMode::Live => Color::Green,
    }
}

pub(super) fn panel_block<'a>(
    title: Option<&'a str>,
    show_version: bool,
    border_color: Color,
) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color));
    if let Some(title) = title {
        block = block.title_top(
            Line::from(Span::styled(
                title.to_owned(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .left_aligned(),
        );
    }
    if show_version {
        let version = format!(" v{} ", env!("CARGO_PKG_VERSION"));
        block = block.title_bottom(
            Line::from(Span::styled(
                version,
                Style::default().fg(Color::LightMagenta),
            ))
            .right_aligned(),
        );
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(service: Option<&str>, connection: ConnectionState) -> StatusModel {
        StatusModel {
            mode: SessionMode::Live,
            capture: true,
            service: service.map(str::to_owned),
            connection,
            paused: false,
        }
    }

    #[test]
    fn tab_labels_carry_session_and_subscription_state() {
        let connected = status(Some("api"), ConnectionState::Connected);
        assert_eq!(tab_label(Tab::Terminal, &connected), "terminal [live]");
        assert_eq!(tab_label(Tab::Logs, &connected), "logs [api]");
        let connecting = status(Some("api"), ConnectionState::Connecting);
        assert_eq!(tab_label(Tab::Logs, &connecting), "logs [api: connecting]");
        assert_eq!(
            tab_label(Tab::Logs, &status(None, ConnectionState::Disconnected)),
            "logs"
        );
    }
}
