pub mod console;
pub(crate) mod core;

pub use console::{run_console, ConsoleError, ConsoleOptions, ConsoleOutcome};
