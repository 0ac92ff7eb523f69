use crate::logs::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl From<Severity> for NoticeLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => NoticeLevel::Info,
            Severity::Warning => NoticeLevel::Warning,
            Severity::Error => NoticeLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub title: String,
    pub body: String,
    pub hint: Option<String>,
}

impl MessageBlock {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Service states bucketed for the `services` summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceCounts {
    pub running: usize,
    pub stopped: usize,
    pub other: usize,
}

impl ServiceCounts {
    /// Counts one service by its reported status, case-insensitively.
    pub fn record(&mut self, status: &str) {
        match status.trim().to_ascii_lowercase().as_str() {
            "running" | "up" | "healthy" => self.running += 1,
            "stopped" | "exited" | "created" => self.stopped += 1,
            _ => self.other += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.running + self.stopped + self.other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSpec {
    pub fn new(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|header| (*header).to_owned()).collect(),
            rows,
        }
    }
}
