pub mod api;
pub mod config;
pub mod logging;
pub mod logs;
pub mod protocol;
pub mod runner;
pub mod terminal;
pub mod testing;
pub mod transport;
pub mod tui;
pub mod ui;

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Console(ConsoleArgs),
    Exec(ExecArgs),
    Tail(TailArgs),
    Services,
    Profiles,
    Config,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsoleArgs {
    pub connect: bool,
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecArgs {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailArgs {
    pub service: String,
    pub raw: bool,
    pub count: Option<usize>,
}

/// Parsed command line: global options plus the command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliParseError {
    MissingConfigValue,
    MissingServiceValue,
    MissingCountValue,
    InvalidCount(String),
    MissingExecCommand,
    MissingTailService,
    UnknownCommand(String),
    UnknownArgument(String),
}

impl std::fmt::Display for CliParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliParseError::MissingConfigValue => write!(f, "--config requires a value"),
            CliParseError::MissingServiceValue => write!(f, "--service requires a value"),
            CliParseError::MissingCountValue => write!(f, "--count requires a value"),
            CliParseError::InvalidCount(value) => {
                write!(f, "--count expects a positive number, got `{value}`")
            }
            CliParseError::MissingExecCommand => write!(f, "exec requires a command to run"),
            CliParseError::MissingTailService => write!(f, "tail requires a service name"),
            CliParseError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            CliParseError::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliParseError {}

/// Removes every `--config <PATH>` pair, wherever it appears. The last one wins.
pub fn strip_global_config_flag<I>(args: I) -> Result<(Option<PathBuf>, Vec<String>), CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut rest = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let Some(path) = args.next() else {
                return Err(CliParseError::MissingConfigValue);
            };
            config_path = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(path));
        } else {
            rest.push(arg);
        }
    }
    Ok((config_path, rest))
}

pub fn parse_invocation<I>(args: I) -> Result<Invocation, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let (config_path, rest) = strip_global_config_flag(args)?;
    Ok(Invocation {
        config_path,
        command: parse_command(rest)?,
    })
}

pub fn parse_command<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(Command::Console(ConsoleArgs::default()));
    };

    match cmd.as_str() {
        "--help" | "-h" | "help" => Ok(Command::Help),
        "console" => parse_console(args),
        "exec" => parse_exec(args),
        "tail" => parse_tail(args),
        "services" => parse_no_args(args, Command::Services),
        "profiles" => parse_no_args(args, Command::Profiles),
        "config" => parse_no_args(args, Command::Config),
        other if other.starts_with('-') => parse_console(std::iter::once(cmd.clone()).chain(args)),
        other => Err(CliParseError::UnknownCommand(other.to_owned())),
    }
}

fn parse_console<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut console = ConsoleArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--connect" => {
                console.connect = true;
            }
            "--service" => {
                let Some(service) = args.next() else {
                    return Err(CliParseError::MissingServiceValue);
                };
                console.service = Some(service);
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(CliParseError::UnknownArgument(other.to_owned())),
        }
    }

    Ok(Command::Console(console))
}

fn parse_exec<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let command = args.into_iter().collect::<Vec<String>>().join(" ");
    if command.trim().is_empty() {
        return Err(CliParseError::MissingExecCommand);
    }
    Ok(Command::Exec(ExecArgs { command }))
}

fn parse_tail<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut service: Option<String> = None;
    let mut raw = false;
    let mut count: Option<usize> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--raw" => {
                raw = true;
            }
            "--count" => {
                let Some(value) = args.next() else {
                    return Err(CliParseError::MissingCountValue);
                };
                let parsed = value
                    .parse::<usize>()
                    .ok()
                    .filter(|count| *count > 0)
                    .ok_or_else(|| CliParseError::InvalidCount(value.clone()))?;
                count = Some(parsed);
            }
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownArgument(other.to_owned()))
            }
            other => {
                if service.is_some() {
                    return Err(CliParseError::UnknownArgument(other.to_owned()));
                }
                service = Some(other.to_owned());
            }
        }
    }

    let Some(service) = service else {
        return Err(CliParseError::MissingTailService);
    };
    Ok(Command::Tail(TailArgs {
        service,
        raw,
        count,
    }))
}

fn parse_no_args<I>(args: I, command: Command) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    match args.into_iter().next() {
        None => Ok(command),
        Some(arg) if arg == "--help" || arg == "-h" => Ok(Command::Help),
        Some(arg) => Err(CliParseError::UnknownArgument(arg)),
    }
}

pub fn print_usage() {
    eprintln!(
        "devstack\n\nUSAGE:\n  devstack [--config <PATH>] [console] [--connect] [--service <NAME>]\n  devstack [--config <PATH>] exec <command...>\n  devstack [--config <PATH>] tail <service> [--raw] [--count <N>]\n  devstack [--config <PATH>] services\n  devstack [--config <PATH>] profiles\n  devstack [--config <PATH>] config\n\nCOMMANDS:\n  console           Full-screen terminal and log viewer (default)\n  exec              Run one command through the simulated shell\n  tail              Stream a service's logs to stdout\n  services          List services known to the DevStack API\n  profiles          List profiles known to the DevStack API\n  config            Print the effective configuration\n\nOPTIONS (console):\n  --connect         Open the live terminal session on start\n  --service <NAME>  Subscribe to a service's logs on start\n\nOPTIONS (tail):\n  --raw             Print messages only, without time and level\n  --count <N>       Stop after N records\n\nGENERAL:\n  --config <PATH>   Read settings from PATH instead of ./devstack.toml\n  -h, --help        Print help\n\nENVIRONMENT:\n  DEVSTACK_CONFIG, DEVSTACK_HOST, DEVSTACK_PORT, DEVSTACK_SECURE,\n  DEVSTACK_LOG, DEVSTACK_COLOR, DEVSTACK_TUI_DIAGNOSTICS\n"
    );
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
