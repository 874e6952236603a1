//! Text rendering for usage, help, version and error output.

use crate::definition::{CommandDefinition, OptionDefinition, ValueArity};
use crate::error::ParseError;
use crate::message::{DefaultMessageProvider, MessageParams, MessageProvider, PROG_HELP_LINE, PROG_VERSION_LINE};
use crate::registry::OptionRegistry;

/// Turns definitions and errors into text. `program` is the invocation name,
/// including any sub-command path (`"tool install"`).
pub trait Renderer {
    fn usage(&self, command: &CommandDefinition, program: &str) -> String;
    fn help(&self, command: &CommandDefinition, program: &str) -> String;
    fn version(&self, command: &CommandDefinition, program: &str) -> String;
    fn error(&self, command: &CommandDefinition, program: &str, error: &ParseError) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultRenderer<M = DefaultMessageProvider> {
    messages: M,
}

impl<M: MessageProvider> DefaultRenderer<M> {
    pub fn with_messages(messages: M) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &M {
        &self.messages
    }
}

impl<M: MessageProvider> Renderer for DefaultRenderer<M> {
    fn usage(&self, command: &CommandDefinition, program: &str) -> String {
        let mut line = program.to_string();
        if OptionRegistry::new(command).len() > 0 {
            line.push_str(" [OPTIONS]");
        }
        for arg in command.arguments() {
            line.push_str(&format!(" <{}>", arg.help_placeholder()));
            if arg.is_multiple() {
                line.push_str("...");
            }
        }

        let mut out = format!("Usage: {line}\n");
        if command.commands().next().is_some() {
            out.push_str(&format!("       {program} [OPTIONS] <COMMAND> [ARGS]...\n"));
        }
        out
    }

    fn help(&self, command: &CommandDefinition, program: &str) -> String {
        let mut out = String::new();
        if command.description_text().trim().is_empty() {
            out.push_str(program);
            out.push('\n');
        } else {
            out.push_str(&format!("{program} - {}\n", command.description_text().trim()));
        }

        out.push('\n');
        out.push_str(&self.usage(command, program));

        let args: Vec<(String, String)> = command
            .arguments()
            .map(|a| {
                let mut left = format!("<{}>", a.help_placeholder());
                if a.is_multiple() {
                    left.push_str("...");
                }
                (left, a.description_text().trim().to_string())
            })
            .collect();
        push_section(&mut out, "Arguments", &args);

        let registry = OptionRegistry::new(command);
        let options: Vec<(String, String)> = registry
            .iter()
            .map(|o| (option_left(o), option_help(o)))
            .collect();
        push_section(&mut out, "Options", &options);

        let commands: Vec<(String, String)> = command
            .commands()
            .map(|c| (c.name().to_string(), c.description_text().trim().to_string()))
            .collect();
        push_section(&mut out, "Commands", &commands);

        out
    }

    fn version(&self, command: &CommandDefinition, program: &str) -> String {
        let mut params = MessageParams::new();
        params.insert("progname", program.to_string());
        params.insert("version", command.version_text().trim().to_string());
        format!("{}\n", self.messages.get(PROG_VERSION_LINE, &params))
    }

    fn error(&self, command: &CommandDefinition, program: &str, error: &ParseError) -> String {
        let mut out = format!(
            "Error: {}\n",
            self.messages.get(error.code().as_str(), &error.params())
        );
        if command.has_help_option() {
            let mut params = MessageParams::new();
            params.insert("progname", program.to_string());
            out.push_str(&self.messages.get(PROG_HELP_LINE, &params));
            out.push('\n');
        }
        out
    }
}

fn push_section(out: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

fn option_left(option: &OptionDefinition) -> String {
    let forms: Vec<&str> = option
        .short_form()
        .into_iter()
        .chain(option.long_form())
        .collect();
    let mut out = forms.join(", ");
    let placeholder = option.help_placeholder();
    match option.value_arity() {
        ValueArity::None => {}
        ValueArity::Required => out.push_str(&format!(" <{placeholder}>")),
        ValueArity::Optional => out.push_str(&format!(" [<{placeholder}>]")),
    }
    out
}

fn option_help(option: &OptionDefinition) -> String {
    let mut parts = Vec::new();
    let description = option.description_text().trim();
    if !description.is_empty() {
        parts.push(description.to_string());
    }
    if !option.allowed_choices().is_empty() {
        parts.push(format!(
            "[possible values: {}]",
            option.allowed_choices().join(", ")
        ));
    }
    if !option.default().is_null() {
        parts.push(format!("[default: {}]", option.default()));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::definition::ArgumentDefinition;

    fn tool() -> CommandDefinition {
        let mut cmd = CommandDefinition::new("tool")
            .description("Process files")
            .version("1.4.0");
        cmd.add_option(
            OptionDefinition::new("verbose")
                .short("-v")
                .long("--verbose")
                .action(ActionKind::StoreTrue)
                .description("Print more"),
        )
        .unwrap();
        cmd.add_option(
            OptionDefinition::new("format")
                .long("--format")
                .help_name("FMT")
                .choices(["plain", "json"])
                .default_value("plain"),
        )
        .unwrap();
        cmd.add_option(OptionDefinition::new("color").long("--color").argument_optional(true))
            .unwrap();
        cmd.add_argument(ArgumentDefinition::new("files").multiple(true).description("Inputs"))
            .unwrap();
        cmd.add_command(CommandDefinition::new("install").description("Install a package"))
            .unwrap();
        cmd
    }

    #[test]
    fn help_lists_sections_with_aligned_rows() {
        let text = DefaultRenderer::<DefaultMessageProvider>::default().help(&tool(), "tool");
        assert!(text.starts_with("tool - Process files\n"));
        assert!(text.contains("Usage: tool [OPTIONS] <files>...\n"));
        assert!(text.contains("       tool [OPTIONS] <COMMAND> [ARGS]...\n"));
        assert!(text.contains("\nArguments:\n  <files>...  Inputs\n"));
        assert!(text.contains("  -v, --verbose"));
        assert!(text.contains("--format <FMT>"));
        assert!(text.contains("[possible values: plain, json] [default: plain]"));
        assert!(text.contains("--color [<COLOR>]"));
        // Built-in options are listed; --version has no short form because -v is taken.
        assert!(text.contains("  -h, --help"));
        assert!(text.contains("  --version"));
        assert!(text.contains("\nCommands:\n  install  Install a package\n"));

        let verbose = text.lines().find(|l| l.contains("--verbose")).unwrap();
        let help = text.lines().find(|l| l.contains("--help")).unwrap();
        assert_eq!(verbose.find("Print more"), help.find("show this help"));
    }

    #[test]
    fn version_and_error_lines() {
        let renderer = DefaultRenderer::<DefaultMessageProvider>::default();
        assert_eq!(renderer.version(&tool(), "tool"), "tool version 1.4.0.\n");

        let err = ParseError::UnknownOption {
            name: "--nope".to_string(),
        };
        assert_eq!(
            renderer.error(&tool(), "tool", &err),
            "Error: Unknown option \"--nope\".\nType \"tool --help\" to get help.\n"
        );

        let bare = CommandDefinition::new("bare").add_help_option(false);
        assert_eq!(
            renderer.error(&bare, "bare", &err),
            "Error: Unknown option \"--nope\".\n"
        );
    }

    #[test]
    fn custom_messages_flow_through() {
        let renderer = DefaultRenderer::with_messages(
            DefaultMessageProvider::new().with_template(PROG_VERSION_LINE, "{progname} v{version}"),
        );
        assert_eq!(renderer.version(&tool(), "tool"), "tool v1.4.0\n");
    }
}
