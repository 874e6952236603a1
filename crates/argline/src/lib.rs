//! Command-line option and argument parsing.
//!
//! A parser is a tree of [`CommandDefinition`]s. Each command declares
//! options (short `-x` and/or long `--xyz` forms, each bound to an
//! [`ActionKind`]), positional [`ArgumentDefinition`]s and nested
//! sub-commands. Parsing a token list yields a [`ParseOutcome`]:
//!
//! - `Matches` with a [`ParseResult`] per command level,
//! - `Help` / `Version` when the built-in options were given,
//!
//! or a typed [`ParseError`]. The library never prints or exits; use a
//! [`Frontend`] for the usual terminal behavior.
//!
//! ```
//! use argline::{ActionKind, ArgumentDefinition, CommandDefinition, OptionDefinition};
//!
//! let mut cmd = CommandDefinition::new("tool");
//! cmd.add_option(
//!     OptionDefinition::new("verbose")
//!         .short("-v")
//!         .long("--verbose")
//!         .action(ActionKind::StoreTrue),
//! )
//! .unwrap();
//! cmd.add_argument(ArgumentDefinition::new("files").multiple(true)).unwrap();
//!
//! let matches = cmd.parse(&["-v", "a.txt", "b.txt"]).unwrap().into_matches().unwrap();
//! assert_eq!(matches.option("verbose").and_then(|v| v.as_bool()), Some(true));
//! assert_eq!(matches.arg("files").and_then(|v| v.as_list()).map(|l| l.len()), Some(2));
//! ```

pub mod action;
pub mod definition;
mod engine;
pub mod error;
pub mod frontend;
pub mod message;
pub mod output;
pub mod prompt;
pub mod registry;
pub mod render;
pub mod result;
pub mod value;

pub use action::{Action, ActionHandle, ActionKind, ActionRegistry, Callback};
pub use definition::{ArgumentDefinition, CommandDefinition, OptionDefinition, ValueArity};
pub use error::{DefinitionError, ErrorCode, ParseError};
pub use frontend::Frontend;
pub use message::{DefaultMessageProvider, MessageProvider};
pub use output::{MemoryOutputter, Outputter, StdOutputter};
pub use prompt::{ScriptedPrompter, SecretPrompter, TerminalPrompter};
pub use registry::{Lookup, OptionRegistry};
pub use render::{DefaultRenderer, Renderer};
pub use result::{ParseOutcome, ParseResult};
pub use value::Value;
