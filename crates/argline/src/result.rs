use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// Option and argument values produced by one command level of a parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParseResult {
    options: IndexMap<String, Value>,
    args: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rest: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<Box<ParseResult>>,
}

impl ParseResult {
    /// Value for an option (its default when the option was not given).
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    /// Value bound to a positional argument: `Str` for singular arguments, `List` for multiple ones.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    pub fn args(&self) -> &IndexMap<String, Value> {
        &self.args
    }

    /// Positional tokens left over after every declared argument was bound.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Name of the sub-command that was invoked, if any.
    pub fn command_name(&self) -> Option<&str> {
        self.command_name.as_deref()
    }

    /// Result of the invoked sub-command.
    pub fn command(&self) -> Option<&ParseResult> {
        self.command.as_deref()
    }
}

impl ParseResult {
    pub(crate) fn set_option(&mut self, name: &str, value: Value) {
        self.options.insert(name.to_string(), value);
    }

    pub(crate) fn set_arg(&mut self, name: &str, value: Value) {
        self.args.insert(name.to_string(), value);
    }

    pub(crate) fn push_rest(&mut self, token: String) {
        self.rest.push(token);
    }

    pub(crate) fn set_command(&mut self, name: &str, result: ParseResult) {
        self.command_name = Some(name.to_string());
        self.command = Some(Box::new(result));
    }

    /// The result `depth` sub-command levels below this one.
    pub(crate) fn nested_mut(&mut self, depth: usize) -> Option<&mut ParseResult> {
        let mut current = self;
        for _ in 0..depth {
            current = current.command.as_deref_mut()?;
        }
        Some(current)
    }
}

/// What a parse produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Matches(ParseResult),
    /// `--help` was given; `path` names the sub-commands leading to the command it was given for.
    Help { path: Vec<String> },
    /// `--version` was given.
    Version { path: Vec<String> },
}

impl ParseOutcome {
    pub fn into_matches(self) -> Option<ParseResult> {
        match self {
            Self::Matches(m) => Some(m),
            Self::Help { .. } | Self::Version { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_declaration_order_with_nested_command() {
        let mut sub = ParseResult::default();
        sub.set_option("force", Value::Bool(true));
        sub.set_arg("package", Value::Str("pkg".to_string()));

        let mut root = ParseResult::default();
        root.set_option("verbose", Value::Bool(false));
        root.set_option("tag", Value::List(vec!["a".to_string()]));
        root.push_rest("extra".to_string());
        root.set_command("install", sub);

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "options": { "verbose": false, "tag": ["a"] },
                "args": {},
                "rest": ["extra"],
                "command-name": "install",
                "command": {
                    "options": { "force": true },
                    "args": { "package": "pkg" }
                }
            })
        );
    }

    #[test]
    fn nested_mut_walks_command_levels() {
        let mut root = ParseResult::default();
        root.set_command("a", ParseResult::default());
        root.nested_mut(1).unwrap().set_option("x", Value::Int(1));
        assert_eq!(root.command().unwrap().option("x"), Some(&Value::Int(1)));
        assert!(root.nested_mut(2).is_none());
        assert_eq!(root.command_name(), Some("a"));
    }
}
