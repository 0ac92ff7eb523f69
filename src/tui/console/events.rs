use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::ServerConfig;
use crate::logs::LogSubscriber;
use crate::terminal::{SessionMode, TerminalSession};
use crate::tui::core::Tab;

use super::config::PAGE_LINES;
use super::diagnostics::RuntimeDiagnostics;
use super::state::ConsoleState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoopControl {
    Continue,
    Quit,
}

pub(super) struct KeyContext<'a> {
    pub(super) session: &'a mut TerminalSession,
    pub(super) subscriber: &'a mut LogSubscriber,
    pub(super) server: &'a ServerConfig,
    /// Largest scroll offset of the pane drawn last frame.
    pub(super) max_offset: usize,
}

pub(super) fn handle_key_event(
    key: &KeyEvent,
    ctx: KeyContext<'_>,
    state: &mut ConsoleState,
    diagnostics: &mut RuntimeDiagnostics,
) -> LoopControl {
    diagnostics.record_keypress(key);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if state.tab == Tab::Terminal && state.capture && !state.show_help {
        if ctrl && matches!(key.code, KeyCode::Char('g')) {
            state.capture = false;
            return LoopControl::Continue;
        }
        if ctrl && matches!(key.code, KeyCode::Char('l')) {
            ctx.session.request_clear();
            state.terminal_scroll.bottom();
            return LoopControl::Continue;
        }
        if let Some(input) = shell_key_input(key, ctx.session.mode() == SessionMode::Live) {
            ctx.session.handle_keys(&input);
            state.terminal_scroll.bottom();
        }
        return LoopControl::Continue;
    }

    if ctrl && matches!(key.code, KeyCode::Char('c')) {
        return LoopControl::Quit;
    }
    if ctrl && matches!(key.code, KeyCode::Char('g')) {
        if state.tab == Tab::Terminal {
            state.capture = true;
            state.show_help = false;
        }
        return LoopControl::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return LoopControl::Quit,
        KeyCode::Char('h') => {
            state.show_help = !state.show_help;
            return LoopControl::Continue;
        }
        KeyCode::Esc => {
            state.show_help = false;
            return LoopControl::Continue;
        }
        KeyCode::Tab | KeyCode::Right => {
            state.switch_tab(state.tab.next());
            return LoopControl::Continue;
        }
        KeyCode::BackTab | KeyCode::Left => {
            state.switch_tab(state.tab.prev());
            return LoopControl::Continue;
        }
        _ => {}
    }

    match state.tab {
        Tab::Terminal => handle_terminal_command(key, ctx, state),
        Tab::Logs => handle_logs_command(key, ctx, state),
    }
    LoopControl::Continue
}

fn handle_terminal_command(key: &KeyEvent, ctx: KeyContext<'_>, state: &mut ConsoleState) {
    let scroll = &mut state.terminal_scroll;
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            state.capture = true;
            state.show_help = false;
        }
        KeyCode::Char('c') => ctx.session.connect(),
        KeyCode::Char('d') => ctx.session.disconnect(),
        KeyCode::Char('l') => {
            ctx.session.request_clear();
            scroll.bottom();
        }
        KeyCode::Up => scroll.up(1, ctx.max_offset),
        KeyCode::Down => scroll.down(1),
        KeyCode::PageUp => scroll.up(PAGE_LINES, ctx.max_offset),
        KeyCode::PageDown => scroll.down(PAGE_LINES),
        KeyCode::Home => scroll.top(ctx.max_offset),
        KeyCode::End => scroll.bottom(),
        _ => {}
    }
}

fn handle_logs_command(key: &KeyEvent, ctx: KeyContext<'_>, state: &mut ConsoleState) {
    let subscriber = ctx.subscriber;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.picker.prev(),
        KeyCode::Down | KeyCode::Char('j') => state.picker.next(),
        KeyCode::Enter => {
            if let Some(service) = state.picker.highlighted().map(str::to_owned) {
                subscriber.select(&service);
                state.log_scroll.bottom();
            }
        }
        KeyCode::Char('u') => subscriber.unselect(),
        KeyCode::Char('p') => {
            subscriber.toggle_pause();
        }
        KeyCode::Char('x') => {
            subscriber.clear();
            state.log_scroll.bottom();
        }
        KeyCode::Char('a') => {
            if subscriber.toggle_auto_scroll() {
                state.log_scroll.bottom();
            }
        }
        KeyCode::Char('r') => {
            subscriber.reconnect();
        }
        KeyCode::Char('f') => state.picker.refresh(ctx.server),
        KeyCode::PageUp => state.log_scroll.up(PAGE_LINES, ctx.max_offset),
        KeyCode::PageDown => state.log_scroll.down(PAGE_LINES),
        KeyCode::Home => state.log_scroll.top(ctx.max_offset),
        KeyCode::End => state.log_scroll.bottom(),
        _ => {}
    }
}

/// Bytes a terminal would send for `key`. Cursor keys only mean something
/// to a live shell.
fn shell_key_input(key: &KeyEvent, live: bool) -> Option<String> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            let lower = c.to_ascii_lowercase() as u8;
            if lower.is_ascii_lowercase() {
                let value = lower - b'a' + 1;
                return Some((value as char).to_string());
            }
        }
    }

    let mapped = match key.code {
        KeyCode::Enter => "\r",
        KeyCode::Tab => "\t",
        KeyCode::Backspace => "\u{7f}",
        KeyCode::Char(c) => return Some(c.to_string()),
        _ if !live => return None,
        KeyCode::Esc => "\u{1b}",
        KeyCode::Left => "\u{1b}[D",
        KeyCode::Right => "\u{1b}[C",
        KeyCode::Up => "\u{1b}[A",
        KeyCode::Down => "\u{1b}[B",
        KeyCode::Home => "\u{1b}[H",
        KeyCode::End => "\u{1b}[F",
        KeyCode::Delete => "\u{1b}[3~",
        _ => return None,
    };
    Some(mapped.to_owned())
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::config::{LogsConfig, TerminalConfig};
    use crate::terminal::ContainerSize;
    use crate::testing::ScriptedConnector;
    use crate::transport::TransportEvent;

    struct Harness {
        session: TerminalSession,
        subscriber: LogSubscriber,
        server: ServerConfig,
        state: ConsoleState,
        diagnostics: RuntimeDiagnostics,
        terminal_connector: ScriptedConnector,
        log_connector: ScriptedConnector,
    }

    impl Harness {
        fn new() -> Self {
            let server = ServerConfig::default();
            let terminal_connector = ScriptedConnector::new();
            let log_connector = ScriptedConnector::new();
            let mut session = TerminalSession::new(
                &TerminalConfig::default(),
                server.terminal_endpoint(),
                Box::new(terminal_connector.clone()),
            );
            session.mount(ContainerSize::new(80, 24), Instant::now());
            let subscriber = LogSubscriber::new(
                server.clone(),
                &LogsConfig::default(),
                Box::new(log_connector.clone()),
            );
            Self {
                session,
                subscriber,
                server,
                state: ConsoleState::new(vec!["api".to_owned(), "web".to_owned()]),
                diagnostics: RuntimeDiagnostics::new(false),
                terminal_connector,
                log_connector,
            }
        }

        fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) -> LoopControl {
            let ctx = KeyContext {
                session: &mut self.session,
                subscriber: &mut self.subscriber,
                server: &self.server,
                max_offset: 5,
            };
            handle_key_event(
                &KeyEvent::new(code, modifiers),
                ctx,
                &mut self.state,
                &mut self.diagnostics,
            )
        }

        fn key(&mut self, code: KeyCode) -> LoopControl {
            self.press(code, KeyModifiers::NONE)
        }

        fn type_text(&mut self, text: &str) {
            for c in text.chars() {
                self.key(KeyCode::Char(c));
            }
        }
    }

    #[test]
    fn capture_mode_feeds_the_line_editor() {
        let mut harness = Harness::new();
        harness.type_text("help");
        assert_eq!(harness.session.input_line(), "help");
        harness.key(KeyCode::Enter);
        assert_eq!(harness.session.input_line(), "");
        assert!(harness.session.surface().contents().contains("Available commands:"));
    }

    #[test]
    fn q_is_typed_while_capturing_and_quits_in_command_mode() {
        let mut harness = Harness::new();
        assert_eq!(harness.key(KeyCode::Char('q')), LoopControl::Continue);
        assert_eq!(harness.session.input_line(), "q");
        harness.press(KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert!(!harness.state.capture);
        assert_eq!(harness.key(KeyCode::Char('q')), LoopControl::Quit);
    }

    #[test]
    fn ctrl_c_interrupts_the_shell_but_quits_from_command_mode() {
        let mut harness = Harness::new();
        harness.type_text("ls");
        let control = harness.press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(harness.session.input_line(), "");
        harness.press(KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert_eq!(
            harness.press(KeyCode::Char('c'), KeyModifiers::CONTROL),
            LoopControl::Quit
        );
    }

    #[test]
    fn command_keys_drive_the_session_bridge() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('g'), KeyModifiers::CONTROL);
        harness.key(KeyCode::Char('c'));
        assert_eq!(harness.session.mode(), SessionMode::Connecting);
        assert_eq!(harness.terminal_connector.open_count(), 1);
        harness.key(KeyCode::Char('d'));
        assert_eq!(harness.session.mode(), SessionMode::Offline);
        assert!(harness.terminal_connector.is_closed(0));
    }

    #[test]
    fn logs_tab_subscribes_to_the_highlighted_service() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('g'), KeyModifiers::CONTROL);
        harness.key(KeyCode::Tab);
        assert_eq!(harness.state.tab, Tab::Logs);
        harness.key(KeyCode::Char('j'));
        harness.key(KeyCode::Enter);
        assert_eq!(harness.subscriber.selected_service(), Some("web"));
        assert_eq!(
            harness.log_connector.endpoints()[0].url(),
            "ws://localhost:8000/ws/logs/web"
        );

        harness.key(KeyCode::Char('p'));
        assert!(harness.subscriber.is_paused());
        harness.log_connector.push(TransportEvent::Opened);
        harness.subscriber.pump(10, Instant::now());
        harness.key(KeyCode::Char('u'));
        assert!(harness.subscriber.subscription().is_none());
    }

    #[test]
    fn scrolling_detaches_until_end() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('g'), KeyModifiers::CONTROL);
        harness.key(KeyCode::PageUp);
        assert_eq!(harness.state.terminal_scroll.offset, 5);
        assert!(!harness.state.terminal_scroll.follow);
        harness.key(KeyCode::End);
        assert!(harness.state.terminal_scroll.follow);
    }

    #[test]
    fn cursor_keys_reach_the_shell_only_when_live() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(shell_key_input(&key, false), Some("\u{3}".to_owned()));
        let key = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(shell_key_input(&key, false), Some("\u{7f}".to_owned()));
        let key = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(shell_key_input(&key, false), None);
        assert_eq!(shell_key_input(&key, true), Some("\u{1b}[D".to_owned()));
    }
}
