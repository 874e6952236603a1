//! Reading secret values for `Password` options.

use dialoguer::Password;
use std::collections::VecDeque;
use std::io;

use crate::definition::OptionDefinition;

pub const DEFAULT_PASSWORD_PROMPT: &str = "Password";

/// Source of secret values for options whose value was not given on the line.
pub trait SecretPrompter {
    fn prompt(&mut self, option: &OptionDefinition) -> io::Result<String>;
}

/// Prompts on the controlling terminal without echoing input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl SecretPrompter for TerminalPrompter {
    fn prompt(&mut self, option: &OptionDefinition) -> io::Result<String> {
        let label = if option.description_text().trim().is_empty() {
            DEFAULT_PASSWORD_PROMPT
        } else {
            option.description_text().trim()
        };
        Password::new()
            .with_prompt(label)
            .interact()
            .map_err(io::Error::from)
    }
}

/// Answers prompts from a fixed list, in order. Useful for tests and non-interactive callers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Names of the options prompted for, in prompt order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl SecretPrompter for ScriptedPrompter {
    fn prompt(&mut self, option: &OptionDefinition) -> io::Result<String> {
        self.asked.push(option.name().to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left")
        })
    }
}
