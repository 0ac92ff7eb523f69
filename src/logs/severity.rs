use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

const ERROR_MARKERS: [&str; 3] = ["error", "failed", "exception"];
const WARNING_MARKERS: [&str; 1] = ["warn"];

impl Severity {
    /// Case-insensitive keyword match on the raw message. Error markers win.
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if ERROR_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            Severity::Error
        } else if WARNING_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
