use tracing::{info, warn};

use crate::api::fetch_services;
use crate::config::Config;
use crate::tui::{run_console, ConsoleOptions};
use crate::ConsoleArgs;

use super::RunnerError;

pub(super) fn run_console_command(args: ConsoleArgs, config: &Config) -> Result<String, RunnerError> {
    let services = match fetch_services(&config.server) {
        Ok(catalog) => catalog.names(),
        Err(err) => {
            warn!(%err, "service list unavailable; the picker will retry");
            Vec::new()
        }
    };
    let outcome = run_console(
        config,
        ConsoleOptions {
            connect: args.connect,
            service: args.service,
            services,
        },
    )?;
    info!(mode = ?outcome.final_mode, records = outcome.records, "console finished");
    Ok(String::new())
}
