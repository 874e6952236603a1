//! The token-scanning state machine.
//!
//! One [`Scanner`] runs per command level with its own runtime state (pending
//! option, stop flag, positional buffer). A token naming a sub-command hands
//! the remaining tokens to a fresh scanner for that sub-command. Deferred
//! actions from every level share one queue owned by the top-level call and
//! only run after the whole line has been accepted.

use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::action::ActionKind;
use crate::definition::{CommandDefinition, OptionDefinition};
use crate::error::ParseError;
use crate::prompt::SecretPrompter;
use crate::registry::{IndexLookup, OptionRegistry};
use crate::result::{ParseOutcome, ParseResult};
use crate::value::Value;

/// Why scanning ended early.
enum Halt {
    Failed(ParseError),
    Help,
    Version,
}

impl From<ParseError> for Halt {
    fn from(err: ParseError) -> Self {
        Self::Failed(err)
    }
}

/// An action held back until the line is known to be valid.
struct Deferred {
    depth: usize,
    option: OptionDefinition,
    raw: Option<String>,
}

#[derive(Debug, Default)]
struct RuntimeState {
    /// Registry index of the option waiting for its value.
    pending: Option<usize>,
    /// Once set, every remaining token of this command is positional.
    stopped: bool,
}

pub(crate) fn parse(
    root: &CommandDefinition,
    tokens: &[&str],
    prompter: &mut dyn SecretPrompter,
) -> Result<ParseOutcome, ParseError> {
    debug!(command = root.name(), tokens = tokens.len(), "parsing command line");

    let mut deferred = Vec::new();
    let mut path = Vec::new();
    let mut result = match parse_command(root, tokens, 0, &mut path, &mut deferred) {
        Ok(result) => result,
        Err(Halt::Failed(err)) => return Err(err),
        Err(Halt::Help) => return Ok(ParseOutcome::Help { path }),
        Err(Halt::Version) => return Ok(ParseOutcome::Version { path }),
    };

    flush_deferred(&mut result, deferred, prompter)?;
    Ok(ParseOutcome::Matches(result))
}

fn parse_command(
    command: &CommandDefinition,
    tokens: &[&str],
    depth: usize,
    path: &mut Vec<String>,
    deferred: &mut Vec<Deferred>,
) -> Result<ParseResult, Halt> {
    let mut scanner = Scanner {
        command,
        registry: OptionRegistry::new(command),
        state: RuntimeState::default(),
        positionals: Vec::new(),
        result: ParseResult::default(),
        depth,
        deferred,
    };
    scanner.seed_defaults();

    if tokens.is_empty() {
        return Ok(scanner.result);
    }

    for (idx, &token) in tokens.iter().enumerate() {
        let remaining = tokens.len() - idx - 1;
        if let Some(sub) = command.command(token) {
            debug!(
                command = command.name(),
                sub_command = token,
                remaining,
                "delegating to sub-command"
            );
            path.push(token.to_string());
            let child = parse_command(sub, &tokens[idx + 1..], depth + 1, path, scanner.deferred)?;
            scanner.result.set_command(token, child);
            break;
        }
        scanner.token(token, remaining)?;
    }

    scanner.finish()
}

struct Scanner<'d, 'q> {
    command: &'d CommandDefinition,
    registry: OptionRegistry<'d>,
    state: RuntimeState,
    positionals: Vec<String>,
    result: ParseResult,
    depth: usize,
    deferred: &'q mut Vec<Deferred>,
}

impl Scanner<'_, '_> {
    fn seed_defaults(&mut self) {
        for option in self.command.options() {
            self.result
                .set_option(option.name(), option.default().clone());
        }
    }

    fn current(&self, name: &str) -> Value {
        self.result.option(name).cloned().unwrap_or_default()
    }

    fn token(&mut self, token: &str, remaining: usize) -> Result<(), Halt> {
        trace!(token, remaining, stopped = self.state.stopped, "scanning token");

        if !self.state.stopped {
            if let Some(idx) = self.state.pending {
                if !self.awaited_value(idx, token, remaining)? {
                    return Ok(());
                }
            }
        }

        if !self.state.stopped && token == "--" {
            self.state.stopped = true;
            return Ok(());
        }

        if !self.state.stopped && token.starts_with("--") {
            return self.long_option(token, remaining);
        }

        if !self.state.stopped && token.starts_with('-') {
            if token == "-" {
                self.positionals.push(token.to_string());
                return Ok(());
            }
            return self.short_option(token, remaining);
        }

        if !self.state.stopped && self.command.is_posix() {
            self.state.stopped = true;
        }
        self.positionals.push(token.to_string());
        Ok(())
    }

    /// Offer `token` to the pending option. Returns whether the token still needs classifying.
    fn awaited_value(&mut self, idx: usize, token: &str, remaining: usize) -> Result<bool, Halt> {
        let option = self.registry.get(idx);
        let accumulates = option.accumulates();
        let has_items = self.current(option.name()).has_items();

        if token.starts_with('-') {
            if option.is_argument_optional() {
                self.dispatch(idx, Some(""))?;
                if !accumulates {
                    self.state.pending = None;
                }
            } else if accumulates && has_items {
                self.state.pending = None;
            } else {
                return Err(ParseError::MissingOptionValue {
                    name: option.name().to_string(),
                }
                .into());
            }
            return Ok(true);
        }

        // An accumulating option gives the token up when declared arguments still need it.
        if accumulates
            && has_items
            && self.command.argument_count() > remaining + self.positionals.len()
        {
            self.positionals.push(token.to_string());
            return Ok(false);
        }

        self.dispatch(idx, Some(token))?;
        if !accumulates {
            self.state.pending = None;
        }
        Ok(false)
    }

    fn long_option(&mut self, token: &str, remaining: usize) -> Result<(), Halt> {
        let (name, value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        if name == "--" {
            return Err(ParseError::UnknownOption {
                name: name.to_string(),
            }
            .into());
        }

        let idx = self.lookup(name)?;
        let option = self.registry.get(idx);

        if !option.expects_argument() {
            if let Some(value) = value {
                return Err(ParseError::UnexpectedOptionValue {
                    name: option.name().to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        } else if value.is_none() {
            return self.await_value(idx, remaining);
        }

        if option.accumulates() {
            self.state.pending = Some(idx);
        }
        self.dispatch(idx, value)
    }

    fn short_option(&mut self, token: &str, remaining: usize) -> Result<(), Halt> {
        let split = token[1..]
            .chars()
            .next()
            .map_or(token.len(), |c| 1 + c.len_utf8());
        let (name, rest) = token.split_at(split);

        let idx = match self.registry.resolve_index(name) {
            IndexLookup::Found(idx) => idx,
            IndexLookup::NotFound | IndexLookup::Ambiguous(_) => {
                return Err(ParseError::UnknownOption {
                    name: name.to_string(),
                }
                .into());
            }
        };
        let option = self.registry.get(idx);

        if rest.is_empty() {
            if option.expects_argument() {
                return self.await_value(idx, remaining);
            }
            return self.dispatch(idx, None);
        }

        if !option.expects_argument() {
            // Bundled flags: `-abc` is `-a -bc`, as long as `b` is a short option too.
            let next = rest.chars().next().unwrap_or_default();
            let bundled = next != '-'
                && matches!(
                    self.registry.resolve_index(&format!("-{next}")),
                    IndexLookup::Found(_)
                );
            if !bundled {
                return Err(ParseError::UnknownOption {
                    name: next.to_string(),
                }
                .into());
            }
            self.dispatch(idx, None)?;
            return self.token(&format!("-{rest}"), remaining);
        }

        if option.accumulates() {
            self.state.pending = Some(idx);
        }
        self.dispatch(idx, Some(rest))
    }

    fn await_value(&mut self, idx: usize, remaining: usize) -> Result<(), Halt> {
        let option = self.registry.get(idx);
        if remaining == 0 && !option.is_argument_optional() {
            return Err(ParseError::MissingOptionValue {
                name: option.name().to_string(),
            }
            .into());
        }
        self.state.pending = Some(idx);
        Ok(())
    }

    fn lookup(&self, probe: &str) -> Result<usize, ParseError> {
        match self.registry.resolve_index(probe) {
            IndexLookup::Found(idx) => Ok(idx),
            IndexLookup::NotFound => Err(ParseError::UnknownOption {
                name: probe.to_string(),
            }),
            IndexLookup::Ambiguous(matches) => Err(ParseError::AmbiguousOption {
                name: probe.to_string(),
                matches,
            }),
        }
    }

    fn dispatch(&mut self, idx: usize, raw: Option<&str>) -> Result<(), Halt> {
        let option = self.registry.get(idx);
        match option.action_kind() {
            ActionKind::Help => return Err(Halt::Help),
            ActionKind::Version => return Err(Halt::Version),
            _ => {}
        }
        option.check_choice(raw)?;

        if option.action_kind().is_deferred() {
            trace!(option = option.name(), "deferring action");
            self.deferred.push(Deferred {
                depth: self.depth,
                option: option.clone(),
                raw: raw.map(str::to_string),
            });
            return Ok(());
        }

        let current = self.current(option.name());
        let value = option.action_kind().execute(option, raw, &current)?;
        self.result.set_option(option.name(), value);
        Ok(())
    }

    fn finish(mut self) -> Result<ParseResult, Halt> {
        if let Some(idx) = self.state.pending.take() {
            let option = self.registry.get(idx);
            let satisfied = option.accumulates() && self.current(option.name()).has_items();
            if !satisfied {
                if option.is_argument_optional() {
                    self.dispatch(idx, Some(""))?;
                } else {
                    return Err(ParseError::MissingOptionValue {
                        name: option.name().to_string(),
                    }
                    .into());
                }
            }
        }

        self.bind_arguments()?;
        Ok(self.result)
    }

    fn bind_arguments(&mut self) -> Result<(), ParseError> {
        let expected = self.command.argument_count();
        let given = self.positionals.len();
        if given < expected {
            return Err(ParseError::MissingRequiredArguments { expected, given });
        }

        let mut buffered: VecDeque<String> = std::mem::take(&mut self.positionals).into();
        let mut after = expected;
        for arg in self.command.arguments() {
            after -= 1;
            if arg.is_multiple() {
                // Keep one token back for every argument declared after this one.
                let take = buffered.len().saturating_sub(after);
                let values: Vec<String> = buffered.drain(..take).collect();
                self.result.set_arg(arg.name(), Value::List(values));
            } else if let Some(value) = buffered.pop_front() {
                self.result.set_arg(arg.name(), Value::Str(value));
            }
        }
        for leftover in buffered {
            self.result.push_rest(leftover);
        }
        Ok(())
    }
}

fn flush_deferred(
    result: &mut ParseResult,
    deferred: Vec<Deferred>,
    prompter: &mut dyn SecretPrompter,
) -> Result<(), ParseError> {
    for entry in deferred {
        let name = entry.option.name();
        debug!(option = name, depth = entry.depth, "running deferred action");

        let raw = match entry.raw.filter(|raw| !raw.is_empty()) {
            Some(raw) => raw,
            None => prompter
                .prompt(&entry.option)
                .map_err(|e| ParseError::PromptFailed {
                    name: name.to_string(),
                    message: e.to_string(),
                })?,
        };

        let Some(target) = result.nested_mut(entry.depth) else {
            continue;
        };
        let current = target.option(name).cloned().unwrap_or_default();
        let value = entry
            .option
            .action_kind()
            .execute(&entry.option, Some(&raw), &current)?;
        target.set_option(name, value);
    }
    Ok(())
}
