use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::Config;
use crate::logs::{ConnectionState, LogSubscriber};
use crate::transport::{WsConnector, WsOptions};
use crate::ui::{NoticeLevel, OutputMode, PlainRenderer, Renderer};
use crate::TailArgs;

use super::RunnerError;

const MAX_EVENTS_PER_POLL: usize = 200;
const IDLE_WAIT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    /// Print bare messages without clock or level.
    pub raw: bool,
    /// Stop after this many records.
    pub count: Option<usize>,
    /// Keep waiting through drops when the subscriber reconnects on its own.
    pub follow_reconnects: bool,
    pub idle_wait: Duration,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            raw: false,
            count: None,
            follow_reconnects: false,
            idle_wait: IDLE_WAIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TailSummary {
    pub printed: usize,
    pub dropped_paused: usize,
    pub ignored: usize,
}

pub(super) fn run_tail(args: &TailArgs, config: &Config) -> Result<String, RunnerError> {
    let connector = WsConnector::new(WsOptions::default());
    let mut subscriber =
        LogSubscriber::new(config.server.clone(), &config.logs, Box::new(connector));
    let mut renderer = PlainRenderer::stdout(OutputMode::from_env());
    let options = TailOptions {
        raw: args.raw,
        count: args.count,
        follow_reconnects: config.logs.reconnect_delay().is_some(),
        ..TailOptions::default()
    };
    let summary = tail_to(&mut subscriber, &args.service, &mut renderer, &options)?;
    debug!(service = %args.service, printed = summary.printed, "tail finished");
    subscriber.unselect();
    Ok(String::new())
}

/// Streams `service` into `renderer` until the stream closes or `count`
/// records were printed. Fails when the stream never opened.
pub fn tail_to<R: Renderer>(
    subscriber: &mut LogSubscriber,
    service: &str,
    renderer: &mut R,
    options: &TailOptions,
) -> Result<TailSummary, RunnerError> {
    subscriber.select(service);
    let mut summary = TailSummary::default();
    let mut connected = subscriber.connection_state() == ConnectionState::Connected;

    loop {
        let report = subscriber.pump(MAX_EVENTS_PER_POLL, Instant::now());
        summary.dropped_paused += report.dropped_paused;
        summary.ignored += report.ignored;

        if !connected && report.opened {
            connected = true;
            if !options.raw {
                renderer.notice(NoticeLevel::Info, &format!("streaming logs for {service}"))?;
            }
        }

        for entry in subscriber.entries() {
            if options.raw {
                renderer.text(&entry.message)?;
            } else {
                renderer.log_record(&entry.clock(), entry.severity.into(), &entry.message)?;
            }
            summary.printed += 1;
            if options.count.is_some_and(|count| summary.printed >= count) {
                return Ok(summary);
            }
        }
        subscriber.clear();

        if subscriber.connection_state() == ConnectionState::Disconnected {
            if !connected {
                return Err(RunnerError::LogStreamUnavailable {
                    service: service.to_owned(),
                    url: subscriber.endpoint_for(service).url(),
                });
            }
            if !options.follow_reconnects {
                if !options.raw {
                    renderer.notice(NoticeLevel::Warning, "log stream closed")?;
                }
                return Ok(summary);
            }
        }

        if report.handled == 0 {
            thread::sleep(options.idle_wait);
        }
    }
}
