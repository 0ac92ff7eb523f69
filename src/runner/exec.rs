use crate::terminal::{interpret, Outcome};
use crate::ui::{NoticeLevel, Renderer};
use crate::ExecArgs;

use super::{buffered_renderer, into_output, RunnerError};

pub(super) fn run_exec(args: &ExecArgs) -> Result<String, RunnerError> {
    let mut renderer = buffered_renderer();
    render_exec(&args.command, &mut renderer)?;
    into_output(renderer)
}

pub(super) fn render_exec<R: Renderer>(command: &str, renderer: &mut R) -> Result<(), RunnerError> {
    match interpret(command) {
        Outcome::Lines(lines) => {
            for line in &lines {
                renderer.text(line)?;
            }
        }
        Outcome::Clear => {
            renderer.notice(NoticeLevel::Info, "clear has no effect outside the console")?;
        }
        Outcome::Silent => {}
    }
    Ok(())
}
