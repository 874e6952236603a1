use argline::{CommandDefinition, OptionRegistry};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckReport {
    pub definition: String,
    pub commands: Vec<CommandSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSummary {
    pub path: String,
    /// Every option the command accepts, built-in help/version included.
    pub options: Vec<String>,
    pub arguments: Vec<String>,
    pub posix: bool,
}

pub fn check_definition(path: &Path, root: &CommandDefinition) -> CheckReport {
    let mut commands = Vec::new();
    collect(root, root.name().to_string(), &mut commands);
    CheckReport {
        definition: path.display().to_string(),
        commands,
    }
}

fn collect(command: &CommandDefinition, path: String, out: &mut Vec<CommandSummary>) {
    let options = OptionRegistry::new(command)
        .iter()
        .map(|o| o.display_name().to_string())
        .collect();
    let arguments = command
        .arguments()
        .map(|a| {
            if a.is_multiple() {
                format!("{}...", a.name())
            } else {
                a.name().to_string()
            }
        })
        .collect();
    out.push(CommandSummary {
        path: path.clone(),
        options,
        arguments,
        posix: command.is_posix(),
    });
    for sub in command.commands() {
        collect(sub, format!("{path} {}", sub.name()), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argline::{ActionKind, ArgumentDefinition, OptionDefinition};

    #[test]
    fn report_walks_command_tree() {
        let mut root = CommandDefinition::new("tool").version("1.0");
        root.add_option(
            OptionDefinition::new("quiet")
                .short("-q")
                .action(ActionKind::StoreTrue),
        )
        .unwrap();
        let sub = root
            .add_command(CommandDefinition::new("add").force_posix(true))
            .unwrap();
        sub.add_argument(ArgumentDefinition::new("items").multiple(true))
            .unwrap();

        let report = check_definition(Path::new("argline.json"), &root);
        assert_eq!(report.commands.len(), 2);
        assert_eq!(report.commands[0].options, ["-q", "--help", "--version"]);
        assert_eq!(report.commands[1].path, "tool add");
        assert_eq!(report.commands[1].arguments, ["items..."]);
        assert!(report.commands[1].posix);
    }
}
