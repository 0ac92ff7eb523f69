use devstack::config::Config;
use devstack::logging::{init_logging, LogTarget, LOG_FILTER_ENV};
use devstack::ui::{MessageBlock, OutputMode, PlainRenderer, Renderer};
use devstack::{parse_invocation, print_usage, Command};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output_mode = OutputMode::from_env();
    let invocation = match parse_invocation(args) {
        Ok(invocation) => invocation,
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(
                &MessageBlock::new("Invalid command arguments", err.to_string())
                    .with_hint("Run `devstack --help` to see supported command forms"),
            );
            print_usage();
            std::process::exit(2);
        }
    };

    if invocation.command == Command::Help {
        print_usage();
        return;
    }

    let config = match Config::load(invocation.config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(
                &MessageBlock::new("Configuration error", err.to_string())
                    .with_hint("Run `devstack config` with defaults to compare settings"),
            );
            std::process::exit(1);
        }
    };

    let target = match invocation.command {
        Command::Console(_) => LogTarget::for_console(&config.logging),
        _ => LogTarget::for_command(
            &config.logging,
            std::env::var_os(LOG_FILTER_ENV).is_some(),
        ),
    };
    if let Err(err) = init_logging(&config.logging, target) {
        let mut renderer = PlainRenderer::stderr(output_mode);
        let _ = renderer.warning_block(&MessageBlock::new("Logging disabled", err.to_string()));
    }

    match devstack::runner::run_command(invocation.command, &config) {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
        }
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(&MessageBlock::new("Command failed", err.to_string()));
            std::process::exit(1);
        }
    }
}
