//! Parser definitions: options, positional arguments and (nested) commands.
//!
//! Every definition is validated when it is added to a command, so a parse
//! never has to deal with malformed option forms or unknown actions.

use indexmap::IndexMap;

use crate::action::ActionKind;
use crate::engine;
use crate::error::{DefinitionError, ParseError};
use crate::prompt::{SecretPrompter, TerminalPrompter};
use crate::result::ParseOutcome;
use crate::value::Value;

/// How an option consumes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    None,
    Required,
    Optional,
}

#[derive(Debug, Clone)]
pub struct OptionDefinition {
    name: String,
    short: Option<String>,
    long: Option<String>,
    description: String,
    action: ActionKind,
    default: Value,
    argument_optional: bool,
    help_name: Option<String>,
    choices: Vec<String>,
}

impl OptionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            long: None,
            description: String::new(),
            action: ActionKind::default(),
            default: Value::Null,
            argument_optional: false,
            help_name: None,
            choices: Vec::new(),
        }
    }

    /// Short form, e.g. `-v`.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    /// Long form, e.g. `--verbose`.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn action(mut self, action: ActionKind) -> Self {
        self.action = action;
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Let the option appear without a value (`--color` as well as `--color=auto`).
    pub fn argument_optional(mut self, optional: bool) -> Self {
        self.argument_optional = optional;
        self
    }

    /// Placeholder shown in help output, e.g. `FILE`.
    pub fn help_name(mut self, help_name: impl Into<String>) -> Self {
        self.help_name = Some(help_name.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_form(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn long_form(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn action_kind(&self) -> &ActionKind {
        &self.action
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn help_placeholder(&self) -> String {
        self.help_name
            .clone()
            .unwrap_or_else(|| self.name.to_ascii_uppercase())
    }

    pub fn allowed_choices(&self) -> &[String] {
        &self.choices
    }

    pub fn value_arity(&self) -> ValueArity {
        if !self.action.takes_value() {
            ValueArity::None
        } else if self.argument_optional {
            ValueArity::Optional
        } else {
            ValueArity::Required
        }
    }

    pub fn expects_argument(&self) -> bool {
        self.value_arity() != ValueArity::None
    }

    pub fn is_argument_optional(&self) -> bool {
        self.value_arity() == ValueArity::Optional
    }

    pub fn accumulates(&self) -> bool {
        self.action.accumulates()
    }

    /// The form users type, preferring the long one.
    pub fn display_name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or(&self.name)
    }

    pub(crate) fn check_choice(&self, raw: Option<&str>) -> Result<(), ParseError> {
        // An omitted optional value is not checked against the choices.
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Ok(());
        };
        if self.choices.is_empty() || self.choices.iter().any(|c| c == raw) {
            return Ok(());
        }
        Err(ParseError::OptionValueNotValid {
            name: self.name.clone(),
            value: raw.to_string(),
            choices: self.choices.clone(),
        })
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        if !is_identifier(&self.name) {
            return Err(DefinitionError::InvalidOptionName {
                name: self.name.clone(),
            });
        }
        if self.short.is_none() && self.long.is_none() {
            return Err(DefinitionError::OptionNameCollisionOrMissingForms {
                name: self.name.clone(),
                conflict: None,
            });
        }
        if let Some(short) = &self.short {
            if !is_short_form(short) {
                return Err(DefinitionError::InvalidShortOrLongForm {
                    name: self.name.clone(),
                    form: short.clone(),
                    long: false,
                });
            }
        }
        if let Some(long) = &self.long {
            if !is_long_form(long) {
                return Err(DefinitionError::InvalidShortOrLongForm {
                    name: self.name.clone(),
                    form: long.clone(),
                    long: true,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    name: String,
    multiple: bool,
    description: String,
    help_name: Option<String>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiple: false,
            description: String::new(),
            help_name: None,
        }
    }

    /// Consume a variable number of positional tokens.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn help_name(mut self, help_name: impl Into<String>) -> Self {
        self.help_name = Some(help_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn help_placeholder(&self) -> String {
        self.help_name.clone().unwrap_or_else(|| self.name.clone())
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        if !is_identifier(&self.name) {
            return Err(DefinitionError::InvalidArgumentName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// A command: the root of a parser or any nested sub-command.
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    name: String,
    description: String,
    version: String,
    force_posix: bool,
    add_help_option: bool,
    add_version_option: bool,
    options: IndexMap<String, OptionDefinition>,
    args: IndexMap<String, ArgumentDefinition>,
    commands: IndexMap<String, CommandDefinition>,
    parent: Option<String>,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: String::new(),
            force_posix: false,
            add_help_option: true,
            add_version_option: true,
            options: IndexMap::new(),
            args: IndexMap::new(),
            commands: IndexMap::new(),
            parent: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Stop option scanning at the first positional token.
    pub fn force_posix(mut self, force_posix: bool) -> Self {
        self.force_posix = force_posix;
        self
    }

    pub fn add_help_option(mut self, enabled: bool) -> Self {
        self.add_help_option = enabled;
        self
    }

    pub fn add_version_option(mut self, enabled: bool) -> Self {
        self.add_version_option = enabled;
        self
    }

    pub fn set_force_posix(&mut self, force_posix: bool) {
        self.force_posix = force_posix;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn version_text(&self) -> &str {
        &self.version
    }

    pub fn is_posix(&self) -> bool {
        self.force_posix
    }

    pub fn has_help_option(&self) -> bool {
        self.add_help_option
    }

    /// The built-in version option is only offered when there is a version to print.
    pub fn has_version_option(&self) -> bool {
        self.add_version_option && !self.version.trim().is_empty()
    }

    /// Name of the command this one is attached to, if any.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionDefinition> {
        self.options.values()
    }

    pub fn option(&self, name: &str) -> Option<&OptionDefinition> {
        self.options.get(name)
    }

    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentDefinition> {
        self.args.values()
    }

    pub fn argument_count(&self) -> usize {
        self.args.len()
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.values()
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn command_mut(&mut self, name: &str) -> Option<&mut CommandDefinition> {
        self.commands.get_mut(name)
    }

    /// Walk down the command tree following `path` (sub-command names, root excluded).
    pub fn find(&self, path: &[String]) -> Option<&CommandDefinition> {
        let mut cmd = self;
        for name in path {
            cmd = cmd.command(name)?;
        }
        Some(cmd)
    }

    pub fn add_option(
        &mut self,
        option: OptionDefinition,
    ) -> Result<&OptionDefinition, DefinitionError> {
        option.validate()?;
        for existing in self.options.values() {
            let clash = if existing.name == option.name {
                Some(option.name.clone())
            } else if option.short.is_some() && existing.short == option.short {
                option.short.clone()
            } else if option.long.is_some() && existing.long == option.long {
                option.long.clone()
            } else {
                None
            };
            if clash.is_some() {
                return Err(DefinitionError::OptionNameCollisionOrMissingForms {
                    name: option.name.clone(),
                    conflict: clash,
                });
            }
        }
        let name = option.name.clone();
        Ok(self.options.entry(name).or_insert(option))
    }

    pub fn add_argument(
        &mut self,
        argument: ArgumentDefinition,
    ) -> Result<&ArgumentDefinition, DefinitionError> {
        argument.validate()?;
        if self.args.contains_key(&argument.name) {
            return Err(DefinitionError::DuplicateName {
                kind: "argument",
                name: argument.name,
            });
        }
        let name = argument.name.clone();
        Ok(self.args.entry(name).or_insert(argument))
    }

    /// Attach a sub-command and return it for further configuration.
    pub fn add_command(
        &mut self,
        mut command: CommandDefinition,
    ) -> Result<&mut CommandDefinition, DefinitionError> {
        if self.commands.contains_key(&command.name) {
            return Err(DefinitionError::DuplicateName {
                kind: "command",
                name: command.name,
            });
        }
        command.parent = Some(self.name.clone());
        let name = command.name.clone();
        Ok(self.commands.entry(name).or_insert(command))
    }

    /// Parse `tokens` (program name excluded), prompting on the terminal for secrets.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParseOutcome, ParseError> {
        self.parse_with(tokens, &mut TerminalPrompter)
    }

    /// Parse `tokens` with a caller-supplied prompter for deferred secret options.
    pub fn parse_with<S: AsRef<str>>(
        &self,
        tokens: &[S],
        prompter: &mut dyn SecretPrompter,
    ) -> Result<ParseOutcome, ParseError> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        engine::parse(self, &tokens, prompter)
    }

    /// Parse the current process arguments.
    pub fn parse_env(&self) -> Result<ParseOutcome, ParseError> {
        let tokens: Vec<String> = std::env::args().skip(1).collect();
        self.parse(&tokens)
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let word = |c: char| c == '_' || !c.is_ascii();
    (first.is_ascii_alphabetic() || word(first)) && chars.all(|c| c.is_ascii_alphanumeric() || word(c))
}

fn is_short_form(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-')
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.next().is_none()
}

fn is_long_form(s: &str) -> bool {
    let Some(word) = s.strip_prefix("--") else {
        return false;
    };
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("verbose"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("out-file"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn option_needs_a_form() {
        let mut cmd = CommandDefinition::new("prog");
        let err = cmd.add_option(OptionDefinition::new("quiet")).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::OptionNameCollisionOrMissingForms {
                name: "quiet".to_string(),
                conflict: None,
            }
        );
    }

    #[test]
    fn option_forms_are_checked() {
        let mut cmd = CommandDefinition::new("prog");
        assert!(matches!(
            cmd.add_option(OptionDefinition::new("a").short("-ab")),
            Err(DefinitionError::InvalidShortOrLongForm { long: false, .. })
        ));
        assert!(matches!(
            cmd.add_option(OptionDefinition::new("a").short("a")),
            Err(DefinitionError::InvalidShortOrLongForm { long: false, .. })
        ));
        assert!(matches!(
            cmd.add_option(OptionDefinition::new("a").long("-a")),
            Err(DefinitionError::InvalidShortOrLongForm { long: true, .. })
        ));
        assert!(matches!(
            cmd.add_option(OptionDefinition::new("a").long("--9lives")),
            Err(DefinitionError::InvalidShortOrLongForm { long: true, .. })
        ));
        assert!(
            cmd.add_option(OptionDefinition::new("dry_run").long("--dry-run"))
                .is_ok()
        );
    }

    #[test]
    fn option_names_are_identifiers() {
        let mut cmd = CommandDefinition::new("prog");
        assert!(matches!(
            cmd.add_option(OptionDefinition::new("dry-run").long("--dry-run")),
            Err(DefinitionError::InvalidOptionName { .. })
        ));
        assert!(matches!(
            cmd.add_argument(ArgumentDefinition::new("2nd")),
            Err(DefinitionError::InvalidArgumentName { .. })
        ));
    }

    #[test]
    fn colliding_forms_are_rejected() {
        let mut cmd = CommandDefinition::new("prog");
        cmd.add_option(OptionDefinition::new("verbose").short("-v"))
            .unwrap();
        let err = cmd
            .add_option(OptionDefinition::new("version").short("-v"))
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::OptionNameCollisionOrMissingForms {
                name: "version".to_string(),
                conflict: Some("-v".to_string()),
            }
        );
    }

    #[test]
    fn arity_follows_action() {
        let flag = OptionDefinition::new("v").short("-v").action(ActionKind::StoreTrue);
        assert_eq!(flag.value_arity(), ValueArity::None);
        let out = OptionDefinition::new("o").short("-o");
        assert_eq!(out.value_arity(), ValueArity::Required);
        let color = OptionDefinition::new("c")
            .long("--color")
            .argument_optional(true);
        assert_eq!(color.value_arity(), ValueArity::Optional);
        // Flags stay flags even if marked optional.
        let odd = OptionDefinition::new("q")
            .short("-q")
            .action(ActionKind::Counter)
            .argument_optional(true);
        assert_eq!(odd.value_arity(), ValueArity::None);
    }

    #[test]
    fn sub_commands_record_parent() {
        let mut root = CommandDefinition::new("prog");
        let sub = root.add_command(CommandDefinition::new("install")).unwrap();
        sub.add_argument(ArgumentDefinition::new("package")).unwrap();
        assert_eq!(sub.parent_name(), Some("prog"));
        assert!(root.add_command(CommandDefinition::new("install")).is_err());
        let path = vec!["install".to_string()];
        assert_eq!(root.find(&path).map(|c| c.argument_count()), Some(1));
    }

    #[test]
    fn version_option_needs_version() {
        assert!(!CommandDefinition::new("prog").has_version_option());
        assert!(CommandDefinition::new("prog").version("1.0").has_version_option());
        assert!(
            !CommandDefinition::new("prog")
                .version("1.0")
                .add_version_option(false)
                .has_version_option()
        );
    }
}
