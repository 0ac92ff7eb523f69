use crate::config::Config;
use crate::ui::{KeyValue, Renderer};

use super::{buffered_renderer, into_output, RunnerError};

pub(super) fn run_config(config: &Config) -> Result<String, RunnerError> {
    let mut renderer = buffered_renderer();
    render_config(config, &mut renderer)?;
    into_output(renderer)
}

pub(super) fn render_config<R: Renderer>(config: &Config, renderer: &mut R) -> Result<(), RunnerError> {
    let server = &config.server;
    renderer.section("Server")?;
    renderer.key_values(&[
        KeyValue::new("terminal", server.terminal_endpoint().url()),
        KeyValue::new("logs", format!("{}<service>", server.log_endpoint("").url())),
        KeyValue::new("api", server.api_url("/api")),
    ])?;
    renderer.text("")?;

    let terminal = &config.terminal;
    renderer.section("Terminal")?;
    renderer.key_values(&[
        KeyValue::new("size", format!("{}x{}", terminal.cols, terminal.rows)),
        KeyValue::new("scrollback", terminal.scrollback.to_string()),
        KeyValue::new("settle-delay", format!("{}ms", terminal.settle_delay_ms)),
        KeyValue::new(
            "cell",
            format!("{}x{}", terminal.cell_width, terminal.cell_height),
        ),
    ])?;
    renderer.text("")?;

    let logs = &config.logs;
    renderer.section("Logs")?;
    renderer.key_values(&[
        KeyValue::new("max-entries", logs.max_entries.to_string()),
        KeyValue::new("auto-scroll", logs.auto_scroll.to_string()),
        KeyValue::new(
            "reconnect",
            logs.reconnect_delay()
                .map(|delay| format!("after {}ms", delay.as_millis()))
                .unwrap_or_else(|| "manual".to_owned()),
        ),
    ])?;
    renderer.text("")?;

    renderer.section("Logging")?;
    renderer.key_values(&[
        KeyValue::new("level", config.logging.level.clone()),
        KeyValue::new(
            "file",
            config
                .logging
                .file
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "disabled".to_owned()),
        ),
    ])?;
    Ok(())
}
