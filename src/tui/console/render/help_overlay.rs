use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::header::panel_block;

fn heading(text: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text,
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )])
}

pub(super) fn render_help_overlay(frame: &mut Frame<'_>, area: Rect, diagnostics: Option<&[String]>) {
    let mut help_lines = vec![
        heading("Command Mode"),
        Line::from("tab/shift+tab    switch tabs (also left/right)"),
        Line::from("h               toggle this help"),
        Line::from("q / ctrl+c      quit"),
        Line::from(""),
        heading("Terminal Tab"),
        Line::from("ctrl+g          toggle shell capture mode"),
        Line::from("i / enter       enter shell capture mode"),
        Line::from("c               connect to the live terminal session"),
        Line::from("d               disconnect"),
        Line::from("l / ctrl+l      clear the terminal"),
        Line::from("up/down          scroll line-by-line"),
        Line::from("pgup/pgdn        scroll by page"),
        Line::from("home/end         jump to top/bottom (end re-enables follow)"),
        Line::from(""),
        heading("Logs Tab"),
        Line::from("up/down, j/k    highlight a service"),
        Line::from("enter           subscribe to the highlighted service"),
        Line::from("u               unsubscribe"),
        Line::from("p               pause/resume (paused records are dropped)"),
        Line::from("x               clear records"),
        Line::from("a               toggle auto-scroll"),
        Line::from("r               reconnect"),
        Line::from("f               refresh the service list"),
        Line::from("pgup/pgdn/home/end  scroll records"),
    ];
    if let Some(lines) = diagnostics {
        help_lines.push(Line::from(""));
        help_lines.push(heading("Diagnostics"));
        help_lines.extend(
            lines
                .iter()
                .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(Color::DarkGray)))),
        );
    }
    let help = Paragraph::new(help_lines).block(panel_block(Some("Help"), false, Color::Magenta));
    frame.render_widget(help, area);
}
