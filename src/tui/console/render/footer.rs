use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::core::Tab;

use super::super::view_model::StatusModel;

pub(super) fn render_footer(
    frame: &mut Frame<'_>,
    area: Rect,
    tab: Tab,
    status: &StatusModel,
    show_help: bool,
) {
    let muted = Style::default().fg(Color::DarkGray);
    let active = Style::default().fg(Color::Yellow);
    let separator = || Span::styled("  |  ", muted);
    let mut spans = Vec::new();
    match tab {
        Tab::Terminal => {
            spans.push(Span::styled(
                format!(
                    "mode:{} (ctrl+g)",
                    if status.capture { "shell" } else { "command" }
                ),
                if status.capture { active } else { muted },
            ));
            spans.push(separator());
            spans.push(Span::styled(format!("session:{}", status.mode), muted));
            if !status.capture {
                spans.push(separator());
                spans.push(Span::styled("connect (c)  disconnect (d)  clear (l)", muted));
            }
        }
        Tab::Logs => {
            spans.push(Span::styled(
                if status.paused { "paused (p)" } else { "pause (p)" },
                if status.paused { active } else { muted },
            ));
            spans.push(separator());
            spans.push(Span::styled(
                "subscribe (enter)  clear (x)  auto-scroll (a)  reconnect (r)  refresh (f)",
                muted,
            ));
        }
    }
    spans.push(separator());
    spans.push(Span::styled("help (h)", if show_help { active } else { muted }));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
