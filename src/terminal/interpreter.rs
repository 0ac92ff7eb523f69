//! The simulated shell used while no live session is attached.

pub const PROMPT: &str = "\x1b[1;32mdevstack@manager\x1b[0m:\x1b[1;34m/workspace\x1b[0m$ ";

pub const BANNER: [&str; 4] = [
    "\x1b[1;32m╭─────────────────────────────────────────────╮\x1b[0m",
    "\x1b[1;32m│     Welcome to DevStack Manager Terminal    │\x1b[0m",
    "\x1b[1;32m╰─────────────────────────────────────────────╯\x1b[0m",
    "",
];

pub const WELCOME_HINTS: [&str; 3] = [
    "\x1b[1;36mThis is a simulated terminal for demonstration purposes.\x1b[0m",
    "\x1b[1;33mType \"help\" to see available commands.\x1b[0m",
    "",
];

const DOCKER_LOGS_PREFIX: &str = "docker logs ";
const CD_PREFIX: &str = "cd ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Lines(Vec<String>),
    /// Reset the surface and reprint the banner.
    Clear,
    Silent,
}

impl Outcome {
    pub fn lines(&self) -> &[String] {
        match self {
            Outcome::Lines(lines) => lines,
            Outcome::Clear | Outcome::Silent => &[],
        }
    }
}

pub fn interpret(command: &str) -> Outcome {
    let command = command.trim();
    // ASCII folding keeps byte offsets shared with `command`.
    let lowered = command.to_ascii_lowercase();
    match lowered.as_str() {
        "" => Outcome::Silent,
        "clear" => Outcome::Clear,
        "help" => lines(&[
            "\x1b[1;36mAvailable commands:\x1b[0m",
            "  \x1b[1;33mhelp\x1b[0m          - Show this help message",
            "  \x1b[1;33mclear\x1b[0m         - Clear the terminal",
            "  \x1b[1;33mdocker ps\x1b[0m     - List Docker containers",
            "  \x1b[1;33mdocker logs\x1b[0m   - Show container logs",
            "  \x1b[1;33mls\x1b[0m            - List files (simulated)",
            "  \x1b[1;33mpwd\x1b[0m           - Show current directory",
            "  \x1b[1;33mwhoami\x1b[0m        - Show current user",
            "  \x1b[1;33mstatus\x1b[0m        - Show DevStack Manager status",
            "  \x1b[1;33mprofiles\x1b[0m      - List available profiles",
        ]),
        "docker ps" => lines(&[
            "\x1b[1;37mCONTAINER ID   IMAGE          COMMAND                  CREATED         STATUS         PORTS                    NAMES\x1b[0m",
            "\x1b[32mabc123def456\x1b[0m   nginx:latest   \"/docker-entrypoint.…\"   2 hours ago     \x1b[1;32mUp 2 hours\x1b[0m     0.0.0.0:8080->80/tcp     web-server",
            "\x1b[32mdef456ghi789\x1b[0m   postgres:13    \"docker-entrypoint.s…\"   2 hours ago     \x1b[1;32mUp 2 hours\x1b[0m     0.0.0.0:5432->5432/tcp   database",
            "\x1b[32mghi789jkl012\x1b[0m   redis:7-alpine \"docker-entrypoint.s…\"   2 hours ago     \x1b[1;32mUp 2 hours\x1b[0m     0.0.0.0:6379->6379/tcp   cache",
        ]),
        "docker logs" => lines(&DOCKER_LOGS_USAGE),
        "ls" => lines(&[
            "\x1b[1;34mdevstack-manager/\x1b[0m",
            "├── \x1b[1;34mbackend/\x1b[0m",
            "├── \x1b[1;34mfrontend/\x1b[0m",
            "├── \x1b[1;34mcommon/\x1b[0m",
            "├── \x1b[1;36mdocker-compose.yml\x1b[0m",
            "└── \x1b[1;36mpackage.json\x1b[0m",
        ]),
        "pwd" => lines(&["\x1b[1;34m/workspace/devstack-manager\x1b[0m"]),
        "whoami" => lines(&["\x1b[1;32mdeveloper\x1b[0m"]),
        "status" => lines(&[
            "\x1b[1;36mDevStack Manager Status:\x1b[0m",
            "  Backend:  \x1b[1;32m●\x1b[0m Running on port 8000",
            "  Frontend: \x1b[1;32m●\x1b[0m Running on port 5173",
            "  Docker:   \x1b[1;33m●\x1b[0m Limited access",
            "  Profiles: \x1b[1;32m●\x1b[0m 2 profiles loaded",
        ]),
        "profiles" => lines(&[
            "\x1b[1;36mAvailable Profiles:\x1b[0m",
            "  \x1b[1;32m●\x1b[0m my-project-dev - Development environment",
            "  \x1b[1;32m●\x1b[0m my-project-e2e - End-to-end testing environment",
        ]),
        _ if lowered.starts_with(DOCKER_LOGS_PREFIX) => {
            docker_logs(&command[DOCKER_LOGS_PREFIX.len()..])
        }
        _ if lowered.starts_with(CD_PREFIX) => lines(&[
            "\x1b[1;33mNote:\x1b[0m Directory navigation is simulated in this demo terminal",
        ]),
        _ => Outcome::Lines(vec![
            format!("\x1b[1;31mCommand not found:\x1b[0m {command}"),
            "Type \"\x1b[1;33mhelp\x1b[0m\" for available commands".to_owned(),
        ]),
    }
}

const DOCKER_LOGS_USAGE: [&str; 2] = [
    "\x1b[1;33mUsage:\x1b[0m docker logs <container_name>",
    "\x1b[1;33mExample:\x1b[0m docker logs web-server",
];

fn docker_logs(argument: &str) -> Outcome {
    let Some(container) = argument.split_whitespace().next() else {
        return lines(&[
            "\x1b[1;31mError:\x1b[0m Container name required",
            DOCKER_LOGS_USAGE[0],
        ]);
    };
    Outcome::Lines(vec![
        format!("\x1b[1;36mLogs for container: \x1b[1;33m{container}\x1b[0m"),
        "\x1b[90m2024-01-15 10:30:15\x1b[0m [\x1b[1;32mINFO\x1b[0m] Application started".to_owned(),
        "\x1b[90m2024-01-15 10:30:16\x1b[0m [\x1b[1;32mINFO\x1b[0m] Server listening on port 8080"
            .to_owned(),
        "\x1b[90m2024-01-15 10:30:17\x1b[0m [\x1b[1;32mINFO\x1b[0m] Database connection established"
            .to_owned(),
    ])
}

fn lines(raw: &[&str]) -> Outcome {
    Outcome::Lines(raw.iter().map(|line| (*line).to_owned()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECOGNIZED: [&str; 9] = [
        "help",
        "docker ps",
        "docker logs",
        "docker logs web-server",
        "ls",
        "pwd",
        "whoami",
        "status",
        "profiles",
    ];

    #[test]
    fn recognized_commands_produce_deterministic_output() {
        for command in RECOGNIZED {
            let first = interpret(command);
            assert!(!first.lines().is_empty(), "{command} printed nothing");
            assert_eq!(first, interpret(command));
            assert!(!first
                .lines()
                .iter()
                .any(|line| line.contains("Command not found")));
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(interpret("HELP"), interpret("help"));
        assert_eq!(interpret("Docker PS"), interpret("docker ps"));
    }

    #[test]
    fn help_listing_starts_with_available_commands() {
        let outcome = interpret("help");
        assert!(outcome.lines()[0].contains("Available commands:"));
    }

    #[test]
    fn docker_logs_names_the_container_then_three_fixed_lines() {
        let outcome = interpret("docker logs web-server");
        let lines = outcome.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("web-server"));
        assert_eq!(lines[1..], interpret("docker logs database").lines()[1..]);
    }

    #[test]
    fn docker_logs_without_name_prints_usage() {
        let outcome = interpret("docker logs");
        assert!(outcome.lines()[0].contains("Usage:"));
    }

    #[test]
    fn unknown_and_cd_commands() {
        let unknown = interpret("rm -rf /");
        assert!(unknown.lines()[0].contains("Command not found"));
        assert!(unknown.lines()[0].contains("rm -rf /"));
        assert!(unknown.lines()[1].contains("help"));

        let cd = interpret("cd /tmp");
        assert!(cd.lines()[0].contains("simulated"));
    }

    #[test]
    fn container_name_keeps_its_original_spelling() {
        let outcome = interpret("DOCKER LOGS Web-Server");
        assert!(outcome.lines()[0].contains("Web-Server"));

        let kelvin = interpret("doc\u{212A}er logs abc");
        assert!(kelvin.lines()[0].contains("Command not found"));
        assert!(kelvin.lines()[0].contains("doc\u{212A}er logs abc"));
    }

    #[test]
    fn clear_and_empty_produce_no_lines() {
        assert_eq!(interpret("clear"), Outcome::Clear);
        assert_eq!(interpret("CLEAR"), Outcome::Clear);
        assert_eq!(interpret(""), Outcome::Silent);
        assert_eq!(interpret("   "), Outcome::Silent);
    }
}
