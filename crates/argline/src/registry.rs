//! Option lookup for one command: exact forms first, then unambiguous long-form prefixes.

use std::borrow::Cow;

use crate::action::ActionKind;
use crate::definition::{CommandDefinition, OptionDefinition};

pub(crate) const HELP_OPTION_NAME: &str = "help";
pub(crate) const VERSION_OPTION_NAME: &str = "version";

#[derive(Debug, Clone)]
pub enum Lookup<'r> {
    Found(&'r OptionDefinition),
    NotFound,
    /// Long forms of every option the probe abbreviates, in declaration order.
    Ambiguous(Vec<String>),
}

/// The options visible while parsing one command: its declared options plus
/// the built-in `--help` / `--version` options it is entitled to.
#[derive(Debug, Clone)]
pub struct OptionRegistry<'d> {
    options: Vec<Cow<'d, OptionDefinition>>,
}

impl<'d> OptionRegistry<'d> {
    pub fn new(command: &'d CommandDefinition) -> Self {
        let mut options: Vec<Cow<'d, OptionDefinition>> =
            command.options().map(Cow::Borrowed).collect();

        if command.has_help_option() && command.option(HELP_OPTION_NAME).is_none() {
            options.push(Cow::Owned(builtin_option(
                &options,
                HELP_OPTION_NAME,
                "-h",
                "--help",
                "show this help message and exit",
                ActionKind::Help,
            )));
        }
        if command.has_version_option() && command.option(VERSION_OPTION_NAME).is_none() {
            options.push(Cow::Owned(builtin_option(
                &options,
                VERSION_OPTION_NAME,
                "-v",
                "--version",
                "show the program version and exit",
                ActionKind::Version,
            )));
        }

        Self { options }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> &OptionDefinition {
        &self.options[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionDefinition> {
        self.options.iter().map(|o| o.as_ref())
    }

    pub fn resolve(&self, probe: &str) -> Lookup<'_> {
        match self.resolve_index(probe) {
            IndexLookup::Found(idx) => Lookup::Found(self.get(idx)),
            IndexLookup::NotFound => Lookup::NotFound,
            IndexLookup::Ambiguous(matches) => Lookup::Ambiguous(matches),
        }
    }

    pub(crate) fn resolve_index(&self, probe: &str) -> IndexLookup {
        let probe = probe.trim();
        if probe.is_empty() {
            return IndexLookup::NotFound;
        }

        if let Some(idx) = self.options.iter().position(|o| {
            o.name() == probe || o.short_form() == Some(probe) || o.long_form() == Some(probe)
        }) {
            return IndexLookup::Found(idx);
        }

        let candidates: Vec<usize> = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.long_form().is_some_and(|l| l.starts_with(probe)))
            .map(|(idx, _)| idx)
            .collect();

        match candidates.as_slice() {
            [] => IndexLookup::NotFound,
            [only] => IndexLookup::Found(*only),
            many => IndexLookup::Ambiguous(
                many.iter()
                    .filter_map(|&idx| self.options[idx].long_form().map(str::to_string))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IndexLookup {
    Found(usize),
    NotFound,
    Ambiguous(Vec<String>),
}

fn builtin_option(
    taken: &[Cow<'_, OptionDefinition>],
    name: &str,
    short: &str,
    long: &str,
    description: &str,
    action: ActionKind,
) -> OptionDefinition {
    let mut def = OptionDefinition::new(name)
        .long(long)
        .description(description)
        .action(action);
    // Only claim the short form when no declared option already uses it.
    if !taken.iter().any(|o| o.short_form() == Some(short)) {
        def = def.short(short);
    }
    def
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CommandDefinition {
        let mut cmd = CommandDefinition::new("prog");
        cmd.add_option(
            OptionDefinition::new("verbose")
                .short("-v")
                .long("--verbose")
                .action(ActionKind::StoreTrue),
        )
        .unwrap();
        cmd.add_option(OptionDefinition::new("verify").long("--verify"))
            .unwrap();
        cmd.add_option(OptionDefinition::new("output").short("-o").long("--output"))
            .unwrap();
        cmd.add_option(OptionDefinition::new("out").long("--out"))
            .unwrap();
        cmd
    }

    fn found_name(lookup: Lookup<'_>) -> Option<String> {
        match lookup {
            Lookup::Found(o) => Some(o.name().to_string()),
            _ => None,
        }
    }

    #[test]
    fn unique_prefix_resolves() {
        let cmd = command();
        let reg = OptionRegistry::new(&cmd);
        assert_eq!(found_name(reg.resolve("--verb")), Some("verbose".to_string()));
        assert_eq!(found_name(reg.resolve("--verif")), Some("verify".to_string()));
        assert_eq!(found_name(reg.resolve("-o")), Some("output".to_string()));
    }

    #[test]
    fn shared_prefix_is_ambiguous_in_declaration_order() {
        let cmd = command();
        let reg = OptionRegistry::new(&cmd);
        match reg.resolve("--ver") {
            Lookup::Ambiguous(matches) => assert_eq!(matches, vec!["--verbose", "--verify"]),
            other => panic!("expected Ambiguous, got: {other:?}"),
        }
    }

    #[test]
    fn exact_match_beats_earlier_prefix() {
        // "--out" abbreviates "--output", declared first, but also names "out" exactly.
        let cmd = command();
        let reg = OptionRegistry::new(&cmd);
        assert_eq!(found_name(reg.resolve("--out")), Some("out".to_string()));
        assert_eq!(found_name(reg.resolve("verify")), Some("verify".to_string()));
    }

    #[test]
    fn blank_and_unknown_probes() {
        let cmd = command();
        let reg = OptionRegistry::new(&cmd);
        assert!(matches!(reg.resolve("   "), Lookup::NotFound));
        assert!(matches!(reg.resolve(""), Lookup::NotFound));
        assert!(matches!(reg.resolve("--nope"), Lookup::NotFound));
        assert!(matches!(reg.resolve("-x"), Lookup::NotFound));
    }

    #[test]
    fn builtins_do_not_steal_declared_short_forms() {
        let cmd = command().version("1.2.3");
        let reg = OptionRegistry::new(&cmd);
        // -v belongs to --verbose; --version gets no short form.
        assert_eq!(found_name(reg.resolve("-v")), Some("verbose".to_string()));
        assert_eq!(found_name(reg.resolve("-h")), Some("help".to_string()));
        let version = reg.iter().find(|o| o.name() == "version").unwrap();
        assert_eq!(version.short_form(), None);
    }

    #[test]
    fn builtins_can_be_disabled() {
        let cmd = command().add_help_option(false);
        let reg = OptionRegistry::new(&cmd);
        assert!(matches!(reg.resolve("--help"), Lookup::NotFound));
        // No version string, so no version option either.
        assert_eq!(reg.len(), 4);
    }
}
