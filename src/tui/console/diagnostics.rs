use std::collections::VecDeque;
use std::time::Instant;

use crossterm::event::KeyEvent;

use crate::logs::PumpReport;

use super::config::DIAGNOSTICS_ENV;

const MAX_TRACE_LINES: usize = 48;

/// Opt-in counters and a short trace ring shown under the help overlay.
#[derive(Debug, Clone)]
pub(super) struct RuntimeDiagnostics {
    enabled: bool,
    started_at: Instant,
    frame_count: usize,
    keypress_count: usize,
    session_events: usize,
    log_events: usize,
    log_appended: usize,
    log_dropped: usize,
    resizes: usize,
    traces: VecDeque<String>,
}

impl RuntimeDiagnostics {
    pub(super) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            started_at: Instant::now(),
            frame_count: 0,
            keypress_count: 0,
            session_events: 0,
            log_events: 0,
            log_appended: 0,
            log_dropped: 0,
            resizes: 0,
            traces: VecDeque::new(),
        }
    }

    pub(super) fn from_env() -> Self {
        let enabled = std::env::var(DIAGNOSTICS_ENV)
            .ok()
            .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));
        Self::new(enabled)
    }

    pub(super) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(super) fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "uptime={}ms frames={} keys={} resizes={}",
                self.started_at.elapsed().as_millis(),
                self.frame_count,
                self.keypress_count,
                self.resizes
            ),
            format!(
                "session-events={} log-events={} appended={} dropped-paused={}",
                self.session_events, self.log_events, self.log_appended, self.log_dropped
            ),
        ];
        lines.extend(self.traces.iter().cloned());
        lines
    }

    pub(super) fn record_frame(&mut self) {
        if !self.enabled {
            return;
        }
        self.frame_count = self.frame_count.saturating_add(1);
    }

    pub(super) fn record_keypress(&mut self, key: &KeyEvent) {
        if !self.enabled {
            return;
        }
        self.keypress_count = self.keypress_count.saturating_add(1);
        self.push_trace(format!(
            "key code={:?} modifiers={:?}",
            key.code, key.modifiers
        ));
    }

    pub(super) fn record_session_events(&mut self, count: usize) {
        if !self.enabled || count == 0 {
            return;
        }
        self.session_events = self.session_events.saturating_add(count);
    }

    pub(super) fn record_log_pump(&mut self, report: &PumpReport) {
        if !self.enabled || report.handled == 0 {
            return;
        }
        self.log_events = self.log_events.saturating_add(report.handled);
        self.log_appended = self.log_appended.saturating_add(report.appended);
        self.log_dropped = self.log_dropped.saturating_add(report.dropped_paused);
        if report.reconnected {
            self.push_trace("log-reconnect".to_owned());
        }
    }

    pub(super) fn record_resize(&mut self, rows: u16, cols: u16) {
        if !self.enabled {
            return;
        }
        self.resizes = self.resizes.saturating_add(1);
        self.push_trace(format!("fit rows={rows} cols={cols}"));
    }

    fn push_trace(&mut self, line: String) {
        self.traces.push_back(line);
        while self.traces.len() > MAX_TRACE_LINES {
            self.traces.pop_front();
        }
    }
}
