//! Declarative parser definitions.
//!
//! A JSON document describes a command tree; [`CommandSpec::build`] turns it
//! into a validated [`argline::CommandDefinition`], resolving action names
//! through an [`ActionRegistry`] so custom actions and callbacks can be
//! referenced by name.
//!
//! ```json
//! {
//!   "name": "tool",
//!   "version": "1.0.0",
//!   "options": [
//!     { "name": "verbose", "short": "-v", "long": "--verbose", "action": "StoreTrue" }
//!   ],
//!   "args": [{ "name": "files", "multiple": true }],
//!   "commands": [{ "name": "install", "args": [{ "name": "package" }] }]
//! }
//! ```

use std::path::{Path, PathBuf};

use argline::{
    ActionKind, ActionRegistry, ArgumentDefinition, CommandDefinition, DefinitionError,
    OptionDefinition, Value,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CALLBACK_ACTION: &str = "Callback";

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid definition document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command \"{command}\": {source}")]
    Definition {
        command: String,
        #[source]
        source: DefinitionError,
    },
}

fn yes() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn default_action() -> String {
    ActionKind::default().name().to_string()
}

fn is_default_action(action: &str) -> bool {
    action == ActionKind::default().name()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default = "default_action", skip_serializing_if = "is_default_action")]
    pub action: String,
    /// Registered callback name, for `"action": "Callback"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub default: Value,
    #[serde(default)]
    pub argument_optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentSpec {
    pub name: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default)]
    pub force_posix: bool,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub add_help_option: bool,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub add_version_option: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgumentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSpec>,
}

impl CommandSpec {
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Build the command tree, validating every option, argument and sub-command.
    pub fn build(&self, registry: &ActionRegistry) -> Result<CommandDefinition, SchemaError> {
        self.build_at(registry, &self.name)
    }

    fn build_at(
        &self,
        registry: &ActionRegistry,
        path: &str,
    ) -> Result<CommandDefinition, SchemaError> {
        let at = |source: DefinitionError| SchemaError::Definition {
            command: path.to_string(),
            source,
        };

        let mut command = CommandDefinition::new(&self.name)
            .description(&self.description)
            .version(&self.version)
            .force_posix(self.force_posix)
            .add_help_option(self.add_help_option)
            .add_version_option(self.add_version_option);

        for spec in &self.options {
            let option = spec.to_definition(registry).map_err(at)?;
            command.add_option(option).map_err(at)?;
        }
        for spec in &self.args {
            command.add_argument(spec.to_definition()).map_err(at)?;
        }
        for spec in &self.commands {
            let sub = spec.build_at(registry, &format!("{path} {}", spec.name))?;
            command.add_command(sub).map_err(at)?;
        }
        Ok(command)
    }
}

impl OptionSpec {
    pub fn to_definition(&self, registry: &ActionRegistry) -> Result<OptionDefinition, DefinitionError> {
        let action = if self.action == CALLBACK_ACTION {
            registry.resolve_callback(&self.name, self.callback.as_deref().unwrap_or_default())?
        } else {
            registry.resolve(&self.name, &self.action)?
        };

        let mut option = OptionDefinition::new(&self.name)
            .description(&self.description)
            .action(action)
            .default_value(self.default.clone())
            .argument_optional(self.argument_optional)
            .choices(self.choices.iter().cloned());
        if let Some(short) = &self.short {
            option = option.short(short);
        }
        if let Some(long) = &self.long {
            option = option.long(long);
        }
        if let Some(help_name) = &self.help_name {
            option = option.help_name(help_name);
        }
        Ok(option)
    }
}

impl ArgumentSpec {
    pub fn to_definition(&self) -> ArgumentDefinition {
        let mut arg = ArgumentDefinition::new(&self.name)
            .multiple(self.multiple)
            .description(&self.description);
        if let Some(help_name) = &self.help_name {
            arg = arg.help_name(help_name);
        }
        arg
    }
}

/// Read and build a definition file in one step.
pub fn load(path: impl AsRef<Path>, registry: &ActionRegistry) -> Result<CommandDefinition, SchemaError> {
    CommandSpec::from_file(path)?.build(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOL: &str = r#"{
        "name": "tool",
        "description": "Process files",
        "version": "1.0.0",
        "options": [
            { "name": "verbose", "short": "-v", "long": "--verbose", "action": "StoreTrue", "default": false },
            { "name": "format", "long": "--format", "choices": ["plain", "json"], "default": "plain" },
            { "name": "tag", "short": "-t", "action": "StoreArray" }
        ],
        "args": [{ "name": "files", "multiple": true, "help-name": "FILE" }],
        "commands": [
            {
                "name": "install",
                "force-posix": true,
                "options": [{ "name": "force", "short": "-f", "action": "StoreTrue" }],
                "args": [{ "name": "package" }]
            }
        ]
    }"#;

    #[test]
    fn builds_command_tree() {
        let spec = CommandSpec::from_json_str(TOOL).unwrap();
        let cmd = spec.build(&ActionRegistry::new()).unwrap();

        assert_eq!(cmd.version_text(), "1.0.0");
        assert!(cmd.has_help_option());
        assert_eq!(
            cmd.option("verbose").map(|o| o.action_kind().name()),
            Some("StoreTrue")
        );
        assert_eq!(cmd.option("format").map(|o| o.allowed_choices().len()), Some(2));
        assert_eq!(
            cmd.option("format").map(|o| o.default().clone()),
            Some(Value::Str("plain".to_string()))
        );
        let install = cmd.command("install").unwrap();
        assert!(install.is_posix());
        assert_eq!(install.parent_name(), Some("tool"));

        let matches = cmd
            .parse(&["-v", "a", "install", "-f", "pkg"])
            .unwrap()
            .into_matches()
            .unwrap();
        assert_eq!(matches.option("verbose"), Some(&Value::Bool(true)));
        assert_eq!(matches.command().and_then(|c| c.arg("package")), Some(&Value::Str("pkg".to_string())));
    }

    #[test]
    fn unknown_action_names_the_command_path() {
        let json = r#"{
            "name": "tool",
            "commands": [
                { "name": "run", "options": [{ "name": "x", "short": "-x", "action": "Frobnicate" }] }
            ]
        }"#;
        let err = CommandSpec::from_json_str(json)
            .unwrap()
            .build(&ActionRegistry::new())
            .unwrap_err();
        match err {
            SchemaError::Definition { command, source } => {
                assert_eq!(command, "tool run");
                assert_eq!(
                    source,
                    DefinitionError::UnregisteredOrInvalidAction {
                        name: "x".to_string(),
                        action: "Frobnicate".to_string(),
                    }
                );
            }
            other => panic!("expected Definition error, got: {other:?}"),
        }
    }

    #[test]
    fn callbacks_resolve_through_registry() {
        let json = r#"{
            "name": "tool",
            "options": [{ "name": "level", "long": "--level", "action": "Callback", "callback": "double" }]
        }"#;
        let spec = CommandSpec::from_json_str(json).unwrap();

        let err = spec.build(&ActionRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Definition {
                source: DefinitionError::InvalidCallbackTarget { .. },
                ..
            }
        ));

        let mut registry = ActionRegistry::new();
        registry
            .register_callback("double", |_, raw, _| {
                let n: i64 = raw.unwrap_or_default().parse().unwrap_or(0);
                Ok(Value::Int(n * 2))
            })
            .unwrap();
        let cmd = spec.build(&registry).unwrap();
        let matches = cmd.parse(&["--level=21"]).unwrap().into_matches().unwrap();
        assert_eq!(matches.option("level"), Some(&Value::Int(42)));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(
            CommandSpec::from_json_str("{\"description\": \"no name\"}"),
            Err(SchemaError::Json(_))
        ));
        assert!(matches!(
            CommandSpec::from_file("/definitely/not/here.json"),
            Err(SchemaError::Io { .. })
        ));
    }

    #[test]
    fn serializes_without_defaults() {
        let spec = CommandSpec::from_json_str(r#"{ "name": "tool", "options": [{ "name": "o", "short": "-o" }] }"#)
            .unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "tool", "force-posix": false, "options": [
                { "name": "o", "short": "-o", "argument-optional": false }
            ] })
        );
    }
}
