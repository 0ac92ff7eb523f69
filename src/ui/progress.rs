use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::renderer::Activity;

const TICK_INTERVAL: Duration = Duration::from_millis(80);
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";

/// Activity for non-interactive output: the start line was already written,
/// so updates and results are dropped.
#[derive(Debug, Default)]
pub struct SilentActivity;

impl Activity for SilentActivity {
    fn update(&self, _message: &str) {}

    fn succeed(&self, _message: &str) {}

    fn fail(&self, _message: &str) {}
}

#[derive(Debug, Clone)]
pub struct SpinnerActivity {
    bar: Arc<ProgressBar>,
}

impl SpinnerActivity {
    /// Spinner on stderr that ticks until the request resolves.
    pub fn start(label: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        Self::with_bar(bar, label, true)
    }

    fn with_bar(bar: ProgressBar, label: &str, ticking: bool) -> Self {
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style.tick_chars(TICK_CHARS));
        }
        bar.set_message(label.to_owned());
        if ticking {
            bar.enable_steady_tick(TICK_INTERVAL);
        }
        Self { bar: Arc::new(bar) }
    }
}

impl Activity for SpinnerActivity {
    fn update(&self, message: &str) {
        self.bar.set_message(message.to_owned());
    }

    fn succeed(&self, message: &str) {
        self.bar.finish_with_message(format!("✓ {message}"));
    }

    fn fail(&self, message: &str) {
        self.bar.abandon_with_message(format!("✕ {message}"));
    }
}
