//! User-facing message templates.
//!
//! Templates are looked up by code (an [`ErrorCode`](crate::ErrorCode) string
//! or one of the `PROG_*` keys below) and filled from a parameter map by
//! replacing `{key}` placeholders.

use indexmap::IndexMap;

pub const PROG_HELP_LINE: &str = "PROG_HELP_LINE";
pub const PROG_VERSION_LINE: &str = "PROG_VERSION_LINE";

pub type MessageParams = IndexMap<&'static str, String>;

pub trait MessageProvider {
    /// Render the message for `code`. Unknown codes render as the code itself.
    fn get(&self, code: &str, params: &MessageParams) -> String;
}

/// English templates; individual entries can be overridden.
#[derive(Debug, Clone)]
pub struct DefaultMessageProvider {
    templates: IndexMap<String, String>,
}

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("OPTION_UNKNOWN", "Unknown option \"{name}\"."),
    (
        "OPTION_AMBIGUOUS",
        "Ambiguous option \"{name}\", can be one of the following: {matches}.",
    ),
    ("OPTION_VALUE_REQUIRED", "Option \"{name}\" requires a value."),
    (
        "OPTION_VALUE_UNEXPECTED",
        "Option \"{name}\" does not expect a value (got \"{value}\").",
    ),
    (
        "OPTION_VALUE_TYPE_ERROR",
        "Option \"{name}\" requires a value of type {type} (got \"{value}\").",
    ),
    (
        "OPTION_VALUE_NOT_VALID",
        "Option \"{name}\" must be one of the following: {choices} (got \"{value}\").",
    ),
    (
        "ARGUMENT_REQUIRED",
        "You must provide at least {argnum} argument{plural}.",
    ),
    (
        "PROMPT_FAILED",
        "Could not read a value for option \"{name}\": {message}.",
    ),
    ("ACTION_FAILED", "Option \"{name}\": {message}."),
    (PROG_HELP_LINE, "Type \"{progname} --help\" to get help."),
    (PROG_VERSION_LINE, "{progname} version {version}."),
];

impl Default for DefaultMessageProvider {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(code, template)| (code.to_string(), template.to_string()))
                .collect(),
        }
    }
}

impl DefaultMessageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(code.into(), template.into());
        self
    }
}

impl MessageProvider for DefaultMessageProvider {
    fn get(&self, code: &str, params: &MessageParams) -> String {
        match self.templates.get(code) {
            Some(template) => fill(template, params),
            None => code.to_string(),
        }
    }
}

/// Replace every `{key}` present in `params`; unknown placeholders are left alone.
pub fn fill(template: &str, params: &MessageParams) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    #[test]
    fn renders_error_from_code_and_params() {
        let err = ParseError::AmbiguousOption {
            name: "--ver".to_string(),
            matches: vec!["--verbose".to_string(), "--verify".to_string()],
        };
        let text = DefaultMessageProvider::new().get(err.code().as_str(), &err.params());
        assert_eq!(
            text,
            "Ambiguous option \"--ver\", can be one of the following: --verbose, --verify."
        );
    }

    #[test]
    fn argument_count_is_pluralised() {
        let provider = DefaultMessageProvider::new();
        let one = ParseError::MissingRequiredArguments {
            expected: 1,
            given: 0,
        };
        let two = ParseError::MissingRequiredArguments {
            expected: 2,
            given: 1,
        };
        assert_eq!(
            provider.get(one.code().as_str(), &one.params()),
            "You must provide at least 1 argument."
        );
        assert_eq!(
            provider.get(two.code().as_str(), &two.params()),
            "You must provide at least 2 arguments."
        );
    }

    #[test]
    fn overrides_and_unknown_codes() {
        let provider = DefaultMessageProvider::new().with_template("OPTION_UNKNOWN", "nope: {name} {other}");
        let mut params = MessageParams::new();
        params.insert("name", "-x".to_string());
        assert_eq!(provider.get("OPTION_UNKNOWN", &params), "nope: -x {other}");
        assert_eq!(provider.get("NO_SUCH_CODE", &params), "NO_SUCH_CODE");
    }
}
