use anstyle::Style as AnsiStyle;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::logs::Severity;

pub(super) fn sanitize_log_text(raw: &str) -> String {
    raw.chars()
        .filter(|ch| {
            !matches!(
                ch,
                '\r'
                    | '\n'
                    | '\u{0000}'..='\u{0008}'
                    | '\u{000B}'
                    | '\u{000C}'
                    | '\u{000E}'..='\u{001A}'
                    | '\u{001C}'..='\u{001F}'
                    | '\u{007F}'
            )
        })
        .collect()
}

/// Converts SGR-coloured text into a styled line. Other CSI sequences
/// are dropped.
pub(super) fn ansi_line(raw: &str, base: Style) -> Line<'static> {
    let mut spans = Vec::new();
    let mut style = base;
    let mut run = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\u{1b}' || chars.peek() != Some(&'[') {
            run.push(ch);
            continue;
        }
        chars.next();
        if !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        let mut params = String::new();
        for next in chars.by_ref() {
            if ('@'..='~').contains(&next) {
                if next == 'm' {
                    style = apply_sgr(style, &params, base);
                }
                break;
            }
            params.push(next);
        }
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}

fn apply_sgr(current: Style, sgr: &str, base: Style) -> Style {
    let mut style = current;
    let parts: Vec<u16> = sgr
        .split(';')
        .map(|part| if part.is_empty() { 0 } else { part.parse().unwrap_or(u16::MAX) })
        .collect();
    let mut i = 0usize;
    while i < parts.len() {
        match parts[i] {
            0 => style = base,
            1 => style = style.add_modifier(Modifier::BOLD),
            2 => style = style.add_modifier(Modifier::DIM),
            3 => style = style.add_modifier(Modifier::ITALIC),
            4 => style = style.add_modifier(Modifier::UNDERLINED),
            7 => style = style.add_modifier(Modifier::REVERSED),
            22 => style = style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style = style.remove_modifier(Modifier::ITALIC),
            24 => style = style.remove_modifier(Modifier::UNDERLINED),
            27 => style = style.remove_modifier(Modifier::REVERSED),
            code @ 30..=37 => style = style.fg(basic_color(code - 30)),
            39 => style = style.fg(base.fg.unwrap_or(Color::Reset)),
            code @ 40..=47 => style = style.bg(basic_color(code - 40)),
            49 => style = style.bg(base.bg.unwrap_or(Color::Reset)),
            code @ 90..=97 => style = style.fg(bright_color(code - 90)),
            code @ 100..=107 => style = style.bg(bright_color(code - 100)),
            code @ (38 | 48) => {
                let (color, consumed) = extended_color(&parts[i + 1..]);
                if let Some(color) = color {
                    style = if code == 38 {
                        style.fg(color)
                    } else {
                        style.bg(color)
                    };
                }
                i += consumed;
            }
            _ => {}
        }
        i += 1;
    }
    style
}

fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest {
        [5, index, ..] => (u8::try_from(*index).ok().map(Color::Indexed), 2),
        [2, r, g, b, ..] => {
            let channel = |value: u16| u8::try_from(value).ok();
            let color = match (channel(*r), channel(*g), channel(*b)) {
                (Some(r), Some(g), Some(b)) => Some(Color::Rgb(r, g, b)),
                _ => None,
            };
            (color, 4)
        }
        _ => (None, rest.len()),
    }
}

fn basic_color(index: u16) -> Color {
    match index {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::Gray,
    }
}

fn bright_color(index: u16) -> Color {
    match index {
        0 => Color::DarkGray,
        1 => Color::LightRed,
        2 => Color::LightGreen,
        3 => Color::LightYellow,
        4 => Color::LightBlue,
        5 => Color::LightMagenta,
        6 => Color::LightCyan,
        _ => Color::White,
    }
}

pub(super) fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Gray,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

pub(super) fn styled_text(style: AnsiStyle, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect::<String>()
    }

    #[test]
    fn red_log_level_resets_to_the_base_style() {
        let base = Style::default().fg(Color::Gray);
        let line = ansi_line("\u{1b}[31mERROR\u{1b}[m: disk full", base);
        assert_eq!(text(&line), "ERROR: disk full");
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
        assert_eq!(line.spans[1].style.fg, Some(Color::Gray));
    }

    #[test]
    fn ansi_line_handles_bold_prompt_colours() {
        let line = ansi_line("\u{1b}[1;32mdevstack\u{1b}[0m:~$ ", Style::default());
        assert_eq!(line.spans[0].style.fg, Some(Color::Green));
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(text(&line), "devstack:~$ ");
    }

    #[test]
    fn ansi_line_understands_extended_colours() {
        let line = ansi_line(
            "\u{1b}[38;5;208morange\u{1b}[38;2;1;2;3mrgb",
            Style::default(),
        );
        assert_eq!(line.spans[0].style.fg, Some(Color::Indexed(208)));
        assert_eq!(line.spans[1].style.fg, Some(Color::Rgb(1, 2, 3)));
    }

    #[test]
    fn cursor_movement_is_dropped_from_shell_output() {
        let line = ansi_line("\u{1b}[2K\r\u{1b}[3Cstatus: \u{1b}[32mok", Style::default());
        assert_eq!(text(&line), "\rstatus: ok");
        assert!(ansi_line("", Style::default()).spans.is_empty());
    }

    #[test]
    fn log_messages_keep_colour_but_lose_control_bytes() {
        let raw = "db\u{0007} ready\r\n\u{1b}[33mWARN\u{1b}[0m";
        assert_eq!(sanitize_log_text(raw), "db ready\u{1b}[33mWARN\u{1b}[0m");
    }
}
