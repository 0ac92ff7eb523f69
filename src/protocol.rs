//! Wire frames exchanged with the DevStack backend.
//!
//! Both transports carry one JSON object per text frame. The terminal session
//! is bidirectional ([`ClientFrame`] upstream, [`ServerFrame`] downstream);
//! the log stream is downstream only and carries `log` records.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClientFrame {
    Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    Output(String),
    Error(String),
}

impl ClientFrame {
    pub fn input(data: impl Into<String>) -> Self {
        Self::Input(data.into())
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        serde_json::to_string(self).map_err(FrameError::Encode)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("frame has no `type` field")]
    MissingType,
    #[error("unrecognized `{kind}` frame")]
    Unrecognized { kind: String },
    #[error("`{kind}` frame has an empty or missing payload")]
    EmptyPayload { kind: String },
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

impl FrameError {
    /// Bad JSON, as opposed to a well-formed frame of a shape we don't use.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, FrameError::Malformed(_))
    }
}

/// Decodes a server-to-client terminal frame. Only `output` and `error` are
/// accepted; an `input` frame coming downstream is treated as unrecognized.
pub fn decode_session_frame(raw: &str) -> Result<ServerFrame, FrameError> {
    let value: Value = serde_json::from_str(raw).map_err(FrameError::Malformed)?;
    let kind = frame_kind(&value)?;
    let data = value.get("data").and_then(Value::as_str);
    match (kind, data) {
        ("output", Some(data)) => Ok(ServerFrame::Output(data.to_owned())),
        ("error", Some(data)) => Ok(ServerFrame::Error(data.to_owned())),
        ("output" | "error", None) => Err(FrameError::EmptyPayload {
            kind: kind.to_owned(),
        }),
        (other, _) => Err(FrameError::Unrecognized {
            kind: other.to_owned(),
        }),
    }
}

/// Decodes a log stream frame into its message text.
///
/// Accepts `{"type":"log","message":"..."}` with a non-empty message; extra
/// fields (`container`, `timestamp`) are ignored.
pub fn decode_log_frame(raw: &str) -> Result<String, FrameError> {
    let value: Value = serde_json::from_str(raw).map_err(FrameError::Malformed)?;
    let kind = frame_kind(&value)?;
    if kind != "log" {
        return Err(FrameError::Unrecognized {
            kind: kind.to_owned(),
        });
    }
    match value.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => Ok(message.to_owned()),
        _ => Err(FrameError::EmptyPayload {
            kind: kind.to_owned(),
        }),
    }
}

fn frame_kind(value: &Value) -> Result<&str, FrameError> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(FrameError::MissingType)
}
