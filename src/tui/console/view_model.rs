use crate::logs::{ConnectionState, LogSubscriber, Severity};
use crate::terminal::{SessionMode, TerminalSession};

use super::state::{ConsoleState, PickerStatus};

/// Always-visible state for the tab strip and footer.
pub(super) struct StatusModel {
    pub(super) mode: SessionMode,
    pub(super) capture: bool,
    pub(super) service: Option<String>,
    pub(super) connection: ConnectionState,
    pub(super) paused: bool,
}

pub(super) enum ActiveView {
    Terminal(TerminalViewModel),
    Logs(LogsViewModel),
}

pub(super) struct TerminalViewModel {
    pub(super) rows: Vec<String>,
    pub(super) offset: usize,
    pub(super) max_offset: usize,
    pub(super) cursor: Option<(u16, u16)>,
    pub(super) endpoint: String,
}

pub(super) struct LogLine {
    pub(super) clock: String,
    pub(super) severity: Severity,
    pub(super) message: String,
}

pub(super) struct LogsViewModel {
    pub(super) services: Vec<String>,
    pub(super) picker_index: usize,
    pub(super) picker_status: PickerStatus,
    pub(super) service: Option<String>,
    pub(super) connection: ConnectionState,
    pub(super) paused: bool,
    pub(super) auto_scroll: bool,
    pub(super) lines: Vec<LogLine>,
    pub(super) offset: usize,
    pub(super) max_offset: usize,
}

impl LogsViewModel {
    /// Row index of the first visible line, counted from the oldest record.
    pub(super) fn top_row(&self) -> usize {
        self.max_offset.saturating_sub(self.offset)
    }
}

pub(super) fn build_status(
    session: &TerminalSession,
    subscriber: &LogSubscriber,
    state: &ConsoleState,
) -> StatusModel {
    StatusModel {
        mode: session.mode(),
        capture: state.capture,
        service: subscriber.selected_service().map(str::to_owned),
        connection: subscriber.connection_state(),
        paused: subscriber.is_paused(),
    }
}

pub(super) fn build_terminal_view(
    session: &mut TerminalSession,
    state: &mut ConsoleState,
) -> TerminalViewModel {
    let view = session.view(state.terminal_scroll.offset, state.terminal_scroll.follow);
    state.terminal_scroll.clamp(view.max_offset);
    TerminalViewModel {
        rows: view.rows,
        offset: view.offset,
        max_offset: view.max_offset,
        cursor: session.cursor_position(),
        endpoint: session.endpoint().url(),
    }
}

pub(super) fn build_logs_view(
    subscriber: &LogSubscriber,
    state: &mut ConsoleState,
    visible_rows: usize,
) -> LogsViewModel {
    let lines = subscriber
        .entries()
        .map(|entry| LogLine {
            clock: entry.clock(),
            severity: entry.severity,
            message: entry.message.clone(),
        })
        .collect::<Vec<LogLine>>();
    let max_offset = lines.len().saturating_sub(visible_rows.max(1));
    state.log_scroll.clamp(max_offset);
    LogsViewModel {
        services: state.picker.names().to_vec(),
        picker_index: state.picker.index(),
        picker_status: state.picker.status().clone(),
        service: subscriber.selected_service().map(str::to_owned),
        connection: subscriber.connection_state(),
        paused: subscriber.is_paused(),
        auto_scroll: subscriber.auto_scroll(),
        lines,
        offset: state.log_scroll.offset,
        max_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogsConfig, ServerConfig};
    use crate::testing::ScriptedConnector;
    use crate::transport::TransportEvent;
    use std::time::Instant;

    #[test]
    fn logs_view_scrolls_from_the_newest_record() {
        let connector = ScriptedConnector::new();
        let mut subscriber = LogSubscriber::new(
            ServerConfig::default(),
            &LogsConfig::default(),
            Box::new(connector.clone()),
        );
        subscriber.select("api");
        connector.push(TransportEvent::Opened);
        for i in 0..10 {
            connector.push_message(&format!(r#"{{"type":"log","message":"line {i}"}}"#));
        }
        subscriber.pump(100, Instant::now());

        let mut state = ConsoleState::new(vec!["api".to_owned()]);
        let view = build_logs_view(&subscriber, &mut state, 4);
        assert_eq!(view.max_offset, 6);
        assert_eq!(view.top_row(), 6);
        assert_eq!(view.service.as_deref(), Some("api"));

        state.log_scroll.up(100, 6);
        let view = build_logs_view(&subscriber, &mut state, 4);
        assert_eq!(view.top_row(), 0);
        assert_eq!(view.lines[0].message, "line 0");
    }
}
