//! Error types raised while declaring and while parsing.
//!
//! Parse errors never format themselves for display beyond a default English
//! message: every variant exposes an [`ErrorCode`] and a parameter map so a
//! [`MessageProvider`](crate::message::MessageProvider) can render it.

use indexmap::IndexMap;
use thiserror::Error;

/// Stable identifier for a parse failure, used to look up message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    OptionUnknown,
    OptionAmbiguous,
    OptionValueRequired,
    OptionValueUnexpected,
    OptionValueTypeError,
    OptionValueNotValid,
    ArgumentRequired,
    PromptFailed,
    ActionFailed,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OptionUnknown => "OPTION_UNKNOWN",
            Self::OptionAmbiguous => "OPTION_AMBIGUOUS",
            Self::OptionValueRequired => "OPTION_VALUE_REQUIRED",
            Self::OptionValueUnexpected => "OPTION_VALUE_UNEXPECTED",
            Self::OptionValueTypeError => "OPTION_VALUE_TYPE_ERROR",
            Self::OptionValueNotValid => "OPTION_VALUE_NOT_VALID",
            Self::ArgumentRequired => "ARGUMENT_REQUIRED",
            Self::PromptFailed => "PROMPT_FAILED",
            Self::ActionFailed => "ACTION_FAILED",
        }
    }
}

/// A failure while classifying or binding tokens. Aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unknown option \"{name}\"")]
    UnknownOption { name: String },

    #[error("ambiguous option \"{name}\", can be one of: {}", .matches.join(", "))]
    AmbiguousOption { name: String, matches: Vec<String> },

    #[error("option \"{name}\" requires a value")]
    MissingOptionValue { name: String },

    #[error("option \"{name}\" does not expect a value (got \"{value}\")")]
    UnexpectedOptionValue { name: String, value: String },

    #[error("option \"{name}\" requires a value of type {expected} (got \"{value}\")")]
    OptionValueTypeError {
        name: String,
        expected: String,
        value: String,
    },

    #[error("option \"{name}\" must be one of: {} (got \"{value}\")", .choices.join(", "))]
    OptionValueNotValid {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("at least {expected} argument{} required, {given} given", plural_of(.expected))]
    MissingRequiredArguments { expected: usize, given: usize },

    #[error("failed to read a value for option \"{name}\": {message}")]
    PromptFailed { name: String, message: String },

    #[error("option \"{name}\": {message}")]
    ActionFailed { name: String, message: String },
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn plural_of(n: &usize) -> &'static str {
    plural(*n)
}

impl ParseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownOption { .. } => ErrorCode::OptionUnknown,
            Self::AmbiguousOption { .. } => ErrorCode::OptionAmbiguous,
            Self::MissingOptionValue { .. } => ErrorCode::OptionValueRequired,
            Self::UnexpectedOptionValue { .. } => ErrorCode::OptionValueUnexpected,
            Self::OptionValueTypeError { .. } => ErrorCode::OptionValueTypeError,
            Self::OptionValueNotValid { .. } => ErrorCode::OptionValueNotValid,
            Self::MissingRequiredArguments { .. } => ErrorCode::ArgumentRequired,
            Self::PromptFailed { .. } => ErrorCode::PromptFailed,
            Self::ActionFailed { .. } => ErrorCode::ActionFailed,
        }
    }

    /// Parameters for message templates, keyed the way the default templates expect.
    pub fn params(&self) -> IndexMap<&'static str, String> {
        let mut p = IndexMap::new();
        match self {
            Self::UnknownOption { name } | Self::MissingOptionValue { name } => {
                p.insert("name", name.clone());
            }
            Self::AmbiguousOption { name, matches } => {
                p.insert("name", name.clone());
                p.insert("matches", matches.join(", "));
            }
            Self::UnexpectedOptionValue { name, value } => {
                p.insert("name", name.clone());
                p.insert("value", value.clone());
            }
            Self::OptionValueTypeError {
                name,
                expected,
                value,
            } => {
                p.insert("name", name.clone());
                p.insert("type", expected.clone());
                p.insert("value", value.clone());
            }
            Self::OptionValueNotValid {
                name,
                value,
                choices,
            } => {
                p.insert("name", name.clone());
                p.insert("value", value.clone());
                p.insert("choices", choices.join(", "));
            }
            Self::MissingRequiredArguments { expected, given } => {
                p.insert("argnum", expected.to_string());
                p.insert("given", given.to_string());
                p.insert("missing", self.missing_arguments().to_string());
                p.insert("plural", plural(*expected).to_string());
            }
            Self::PromptFailed { name, message } | Self::ActionFailed { name, message } => {
                p.insert("name", name.clone());
                p.insert("message", message.clone());
            }
        }
        p
    }

    /// How many positional tokens were missing, for `MissingRequiredArguments`.
    pub fn missing_arguments(&self) -> usize {
        match self {
            Self::MissingRequiredArguments { expected, given } => expected.saturating_sub(*given),
            _ => 0,
        }
    }
}

/// A programming error in a parser definition, raised when the definition is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("option name must be a valid identifier (got: {name})")]
    InvalidOptionName { name: String },

    #[error("argument name must be a valid identifier (got: {name})")]
    InvalidArgumentName { name: String },

    #[error("{}", describe_forms(.name, .conflict))]
    OptionNameCollisionOrMissingForms {
        name: String,
        conflict: Option<String>,
    },

    #[error("option \"{name}\" {} (got: \"{form}\")", form_rule(.long))]
    InvalidShortOrLongForm {
        name: String,
        form: String,
        long: bool,
    },

    #[error("unregistered action \"{action}\" for option \"{name}\"")]
    UnregisteredOrInvalidAction { name: String, action: String },

    #[error("you must provide a valid callback for option \"{name}\" (got: \"{callback}\")")]
    InvalidCallbackTarget { name: String, callback: String },

    #[error("cannot register action \"{action}\": {reason}")]
    InvalidCustomAction { action: String, reason: String },

    #[error("{kind} \"{name}\" is declared more than once")]
    DuplicateName { kind: &'static str, name: String },
}

fn describe_forms(name: &str, conflict: &Option<String>) -> String {
    match conflict {
        Some(form) => format!("option \"{name}\" reuses \"{form}\", already taken by another option"),
        None => format!("you must provide at least a short or a long form for option \"{name}\""),
    }
}

fn form_rule(long: &bool) -> &'static str {
    if *long {
        "long form must be two dashes followed by a word"
    } else {
        "short form must be a dash followed by a letter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_arguments_counts_shortfall() {
        let err = ParseError::MissingRequiredArguments {
            expected: 3,
            given: 1,
        };
        assert_eq!(err.missing_arguments(), 2);
        assert_eq!(err.code(), ErrorCode::ArgumentRequired);
        assert_eq!(err.params().get("plural").map(String::as_str), Some("s"));
        assert!(err.to_string().contains("at least 3 arguments"));
    }

    #[test]
    fn ambiguous_lists_matches() {
        let err = ParseError::AmbiguousOption {
            name: "--ver".to_string(),
            matches: vec!["--verbose".to_string(), "--version".to_string()],
        };
        assert_eq!(
            err.params().get("matches").map(String::as_str),
            Some("--verbose, --version")
        );
        assert!(err.to_string().contains("--verbose, --version"));
    }

    #[test]
    fn forms_error_mentions_conflict() {
        let missing = DefinitionError::OptionNameCollisionOrMissingForms {
            name: "quiet".to_string(),
            conflict: None,
        };
        assert!(missing.to_string().contains("at least a short or a long form"));

        let clash = DefinitionError::OptionNameCollisionOrMissingForms {
            name: "quiet".to_string(),
            conflict: Some("-q".to_string()),
        };
        assert!(clash.to_string().contains("\"-q\""));
    }
}
