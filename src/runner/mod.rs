use std::io::IsTerminal;

use crate::api::ApiError;
use crate::config::Config;
use crate::tui::ConsoleError;
use crate::ui::theme::resolve_color_enabled;
use crate::ui::{OutputMode, PlainRenderer};
use crate::Command;

mod catalog;
mod console;
mod exec;
mod settings;
mod tail;

pub use tail::{tail_to, TailOptions, TailSummary};

#[derive(Debug)]
pub enum RunnerError {
    Ui(String),
    Api(ApiError),
    Console(ConsoleError),
    LogStreamUnavailable { service: String, url: String },
    Encoding(std::string::FromUtf8Error),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerError::Ui(msg) => write!(f, "ui render failed: {msg}"),
            RunnerError::Api(err) => write!(f, "{err}"),
            RunnerError::Console(err) => write!(f, "{err}"),
            RunnerError::LogStreamUnavailable { service, url } => write!(
                f,
                "log stream for `{service}` could not be opened at {url}"
            ),
            RunnerError::Encoding(err) => write!(f, "rendered output was not UTF-8: {err}"),
        }
    }
}

impl std::error::Error for RunnerError {}

impl From<crate::ui::UiError> for RunnerError {
    fn from(value: crate::ui::UiError) -> Self {
        RunnerError::Ui(value.to_string())
    }
}

impl From<ApiError> for RunnerError {
    fn from(value: ApiError) -> Self {
        RunnerError::Api(value)
    }
}

impl From<ConsoleError> for RunnerError {
    fn from(value: ConsoleError) -> Self {
        RunnerError::Console(value)
    }
}

impl From<std::string::FromUtf8Error> for RunnerError {
    fn from(value: std::string::FromUtf8Error) -> Self {
        RunnerError::Encoding(value)
    }
}

/// Runs `cmd` and returns whatever it rendered for stdout. Streaming
/// commands (`console`, `tail`) write directly and return an empty string.
pub fn run_command(cmd: Command, config: &Config) -> Result<String, RunnerError> {
    match cmd {
        Command::Console(args) => console::run_console_command(args, config),
        Command::Exec(args) => exec::run_exec(&args),
        Command::Tail(args) => tail::run_tail(&args, config),
        Command::Services => catalog::run_services(config),
        Command::Profiles => catalog::run_profiles(config),
        Command::Config => settings::run_config(config),
        Command::Help => Ok(String::new()),
    }
}

fn buffered_renderer() -> PlainRenderer<Vec<u8>> {
    let color_enabled =
        resolve_color_enabled(OutputMode::from_env(), std::io::stdout().is_terminal());
    PlainRenderer::new(Vec::<u8>::new(), color_enabled)
}

fn into_output(renderer: PlainRenderer<Vec<u8>>) -> Result<String, RunnerError> {
    let rendered = String::from_utf8(renderer.into_inner())?;
    Ok(rendered.trim_end().to_owned())
}

#[cfg(test)]
#[path = "../tests/runner_tests.rs"]
mod tests;
