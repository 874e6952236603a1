//! Glue between a parse and the terminal: renders help, version and errors
//! and maps each outcome to a process exit code.

use tracing::warn;

use crate::definition::CommandDefinition;
use crate::output::{Outputter, StdOutputter};
use crate::prompt::SecretPrompter;
use crate::render::{DefaultRenderer, Renderer};
use crate::result::{ParseOutcome, ParseResult};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug)]
pub struct Frontend<'c, R = DefaultRenderer, O = StdOutputter> {
    command: &'c CommandDefinition,
    renderer: R,
    outputter: O,
}

impl<'c> Frontend<'c> {
    pub fn new(command: &'c CommandDefinition) -> Self {
        Self {
            command,
            renderer: DefaultRenderer::default(),
            outputter: StdOutputter,
        }
    }
}

impl<'c, R: Renderer, O: Outputter> Frontend<'c, R, O> {
    pub fn with_renderer<R2: Renderer>(self, renderer: R2) -> Frontend<'c, R2, O> {
        Frontend {
            command: self.command,
            renderer,
            outputter: self.outputter,
        }
    }

    pub fn with_outputter<O2: Outputter>(self, outputter: O2) -> Frontend<'c, R, O2> {
        Frontend {
            command: self.command,
            renderer: self.renderer,
            outputter,
        }
    }

    pub fn outputter(&self) -> &O {
        &self.outputter
    }

    /// Parse `tokens`. Matches are returned; help, version and errors are
    /// written out and turned into the exit code the process should use.
    pub fn run<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
        prompter: &mut dyn SecretPrompter,
    ) -> Result<ParseResult, i32> {
        let root = self.command;
        match root.parse_with(tokens, prompter) {
            Ok(ParseOutcome::Matches(matches)) => Ok(matches),
            Ok(ParseOutcome::Help { path }) => {
                let (command, program) = locate(root, &path);
                let text = self.renderer.help(command, &program);
                self.emit(false, &text);
                Err(EXIT_SUCCESS)
            }
            Ok(ParseOutcome::Version { path }) => {
                let (command, program) = locate(root, &path);
                let text = self.renderer.version(command, &program);
                self.emit(false, &text);
                Err(EXIT_SUCCESS)
            }
            Err(err) => {
                let text = self.renderer.error(root, root.name(), &err);
                self.emit(true, &text);
                Err(EXIT_FAILURE)
            }
        }
    }

    fn emit(&mut self, error: bool, text: &str) {
        let written = if error {
            self.outputter.write_error(text)
        } else {
            self.outputter.write_standard(text)
        };
        if let Err(err) = written {
            warn!("failed to write output: {err}");
        }
    }
}

/// The command a sub-command path leads to, with its display name.
fn locate<'c>(root: &'c CommandDefinition, path: &[String]) -> (&'c CommandDefinition, String) {
    let command = root.find(path).unwrap_or(root);
    let program = std::iter::once(root.name())
        .chain(path.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    (command, program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::definition::OptionDefinition;
    use crate::output::MemoryOutputter;
    use crate::prompt::ScriptedPrompter;

    fn tool() -> CommandDefinition {
        let mut cmd = CommandDefinition::new("tool").version("0.3.1");
        cmd.add_option(
            OptionDefinition::new("quiet")
                .short("-q")
                .action(ActionKind::StoreTrue),
        )
        .unwrap();
        cmd.add_command(CommandDefinition::new("sync").description("Synchronise"))
            .unwrap();
        cmd
    }

    #[test]
    fn matches_pass_through_silently() {
        let cmd = tool();
        let mut frontend = Frontend::new(&cmd).with_outputter(MemoryOutputter::default());
        let m = frontend.run(&["-q"], &mut ScriptedPrompter::default()).unwrap();
        assert_eq!(m.option("quiet").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(frontend.outputter(), &MemoryOutputter::default());
    }

    #[test]
    fn help_for_sub_command_goes_to_standard_output() {
        let cmd = tool();
        let mut frontend = Frontend::new(&cmd).with_outputter(MemoryOutputter::default());
        let code = frontend
            .run(&["sync", "--help"], &mut ScriptedPrompter::default())
            .unwrap_err();
        assert_eq!(code, EXIT_SUCCESS);
        assert!(frontend.outputter().standard().starts_with("tool sync - Synchronise\n"));
        assert!(frontend.outputter().error().is_empty());
    }

    #[test]
    fn version_is_printed() {
        let cmd = tool();
        let mut frontend = Frontend::new(&cmd).with_outputter(MemoryOutputter::default());
        let code = frontend
            .run(&["--version"], &mut ScriptedPrompter::default())
            .unwrap_err();
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(frontend.outputter().standard(), "tool version 0.3.1.\n");
    }

    #[test]
    fn errors_go_to_error_stream_with_hint() {
        let cmd = tool();
        let mut frontend = Frontend::new(&cmd).with_outputter(MemoryOutputter::default());
        let code = frontend
            .run(&["--bogus"], &mut ScriptedPrompter::default())
            .unwrap_err();
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(
            frontend.outputter().error(),
            "Error: Unknown option \"--bogus\".\nType \"tool --help\" to get help.\n"
        );
    }
}
