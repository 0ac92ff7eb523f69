//! Connection state machine for the terminal view.
//!
//! `reduce` is pure: it takes the current state and one event and returns the
//! next state plus the effects the runtime must apply, in order. Nothing here
//! touches the surface or the socket directly.

use std::fmt;

use super::interpreter::{interpret, Outcome, BANNER, PROMPT, WELCOME_HINTS};
use super::line_editor::{EditorAction, LineEditor};
use crate::protocol::{decode_session_frame, ClientFrame, ServerFrame};

pub const CONNECTED_BANNER: &str = "\x1b[1;32mConnected to live terminal session...\x1b[0m";
pub const CLOSED_BANNER: &str =
    "\x1b[1;31mWebSocket connection closed. Switched to simulation mode.\x1b[0m";
pub const CANCELLED_LINE: &str = "\x1b[1;33mConnection attempt cancelled.\x1b[0m";
const ERASE_COLUMN: &str = "\x08 \x08";
const CLEAR_COMMAND: &str = "clear\r";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Offline,
    Connecting,
    Live,
}

impl SessionMode {
    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Offline => "simulation",
            SessionMode::Connecting => "connecting",
            SessionMode::Live => "live",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Raw keystroke data, possibly several characters.
    Keys(String),
    ClearRequested,
    ConnectRequested,
    DisconnectRequested,
    TransportOpened,
    TransportFrame(String),
    TransportClosed(Option<String>),
    TransportFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Write(String),
    WriteLine(String),
    ClearSurface,
    Send(ClientFrame),
    OpenTransport,
    CloseTransport,
    /// Developer-facing note; never shown on the surface.
    Diagnostic(String),
    /// A well-formed frame of a shape the session has no use for.
    Ignored(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub mode: SessionMode,
    pub editor: LineEditor,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        self.mode == SessionMode::Live
    }
}

/// Output for a freshly mounted view: banner, hints, prompt.
pub fn mount_effects() -> Vec<Effect> {
    let mut effects = banner_effects();
    effects.extend(
        WELCOME_HINTS
            .iter()
            .map(|line| Effect::WriteLine((*line).to_owned())),
    );
    effects.push(prompt());
    effects
}

pub fn reduce(mut state: SessionState, event: BridgeEvent) -> (SessionState, Vec<Effect>) {
    let mut effects = Vec::new();
    match (state.mode, event) {
        (SessionMode::Live, BridgeEvent::Keys(keys)) => {
            if !keys.is_empty() {
                effects.push(Effect::Send(ClientFrame::input(keys)));
            }
        }
        (_, BridgeEvent::Keys(keys)) => {
            let actions = state.editor.feed_str(&keys);
            apply_editor_actions(actions, &mut effects);
        }

        (SessionMode::Live, BridgeEvent::ClearRequested) => {
            effects.push(Effect::Send(ClientFrame::input(CLEAR_COMMAND)));
        }
        (_, BridgeEvent::ClearRequested) => {
            state.editor.reset();
            effects.push(Effect::ClearSurface);
            effects.extend(banner_effects());
            effects.push(prompt());
        }

        (SessionMode::Offline, BridgeEvent::ConnectRequested) => {
            state.mode = SessionMode::Connecting;
            effects.push(Effect::OpenTransport);
        }
        (mode, BridgeEvent::ConnectRequested) => {
            effects.push(Effect::Diagnostic(format!(
                "connect ignored while {mode}"
            )));
        }

        (SessionMode::Connecting, BridgeEvent::TransportOpened) => {
            state.mode = SessionMode::Live;
            state.editor.reset();
            effects.push(Effect::ClearSurface);
            effects.push(Effect::WriteLine(CONNECTED_BANNER.to_owned()));
        }
        (mode, BridgeEvent::TransportOpened) => {
            effects.push(Effect::Diagnostic(format!(
                "stale open notification ignored while {mode}"
            )));
        }

        (SessionMode::Live, BridgeEvent::TransportFrame(raw)) => match decode_session_frame(&raw)
        {
            Ok(ServerFrame::Output(data)) => effects.push(Effect::Write(data)),
            Ok(ServerFrame::Error(data)) => {
                effects.push(Effect::WriteLine(format!("\x1b[1;31mError: {data}\x1b[0m")));
            }
            Err(error) if error.is_parse_failure() => {
                effects.push(Effect::Diagnostic(format!("dropped frame: {error}")));
            }
            Err(error) => effects.push(Effect::Ignored(format!("ignored frame: {error}"))),
        },
        (mode, BridgeEvent::TransportFrame(_)) => {
            effects.push(Effect::Diagnostic(format!("dropped frame while {mode}")));
        }

        (
            SessionMode::Live,
            BridgeEvent::TransportClosed(_)
            | BridgeEvent::TransportFailed(_)
            | BridgeEvent::DisconnectRequested,
        ) => {
            state.mode = SessionMode::Offline;
            state.editor.reset();
            effects.push(Effect::CloseTransport);
            effects.push(Effect::WriteLine(CLOSED_BANNER.to_owned()));
            effects.push(prompt());
        }
        (SessionMode::Connecting, event) => {
            // Remaining Connecting events: close, failure, disconnect.
            state.mode = SessionMode::Offline;
            state.editor.reset();
            effects.push(Effect::CloseTransport);
            effects.push(Effect::WriteLine(String::new()));
            effects.push(Effect::WriteLine(connect_failure_line(&event)));
            effects.push(prompt());
        }
        (SessionMode::Offline, BridgeEvent::DisconnectRequested) => {}
        (SessionMode::Offline, event) => {
            effects.push(Effect::Diagnostic(format!(
                "transport event ignored while offline: {event:?}"
            )));
        }
    }
    (state, effects)
}

fn connect_failure_line(event: &BridgeEvent) -> String {
    match event {
        BridgeEvent::TransportFailed(reason) => {
            format!("\x1b[1;31mCould not connect to live terminal session: {reason}\x1b[0m")
        }
        BridgeEvent::TransportClosed(Some(reason)) => format!(
            "\x1b[1;31mCould not connect to live terminal session: closed ({reason})\x1b[0m"
        ),
        BridgeEvent::TransportClosed(None) => {
            "\x1b[1;31mCould not connect to live terminal session: connection closed\x1b[0m"
                .to_owned()
        }
        _ => CANCELLED_LINE.to_owned(),
    }
}

fn apply_editor_actions(actions: Vec<EditorAction>, effects: &mut Vec<Effect>) {
    let mut echo = String::new();
    for action in actions {
        if let EditorAction::Echo(key) = action {
            echo.push(key);
            continue;
        }
        if !echo.is_empty() {
            effects.push(Effect::Write(std::mem::take(&mut echo)));
        }
        match action {
            EditorAction::Echo(_) => {}
            EditorAction::EraseColumn => effects.push(Effect::Write(ERASE_COLUMN.to_owned())),
            EditorAction::Interrupted => {
                effects.push(Effect::WriteLine("^C".to_owned()));
                effects.push(prompt());
            }
            EditorAction::Submit(command) => {
                effects.push(Effect::WriteLine(String::new()));
                match interpret(&command) {
                    Outcome::Lines(lines) => {
                        effects.extend(lines.into_iter().map(Effect::WriteLine));
                    }
                    Outcome::Clear => {
                        effects.push(Effect::ClearSurface);
                        effects.extend(banner_effects());
                    }
                    Outcome::Silent => {}
                }
                effects.push(prompt());
            }
        }
    }
    if !echo.is_empty() {
        effects.push(Effect::Write(echo));
    }
}

fn banner_effects() -> Vec<Effect> {
    BANNER
        .iter()
        .map(|line| Effect::WriteLine((*line).to_owned()))
        .collect()
}

fn prompt() -> Effect {
    Effect::Write(PROMPT.to_owned())
}

#[cfg(test)]
#[path = "../tests/bridge_tests.rs"]
mod tests;
