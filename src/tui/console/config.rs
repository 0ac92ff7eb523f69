use std::time::Duration;

pub(super) const MAX_EVENTS_PER_TICK: usize = 200;
pub(super) const INPUT_POLL_WAIT: Duration = Duration::from_millis(50);
pub(super) const PAGE_LINES: usize = 10;
pub(super) const DIAGNOSTICS_ENV: &str = "DEVSTACK_TUI_DIAGNOSTICS";
