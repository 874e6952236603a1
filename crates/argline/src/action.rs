//! Option actions: how a raw token becomes (or accumulates into) an option value.
//!
//! Built-in kinds live in the closed [`ActionKind`] enum. User code extends the
//! set either with a [`Callback`] closure or by registering an [`Action`]
//! implementation in an [`ActionRegistry`], which hands back an
//! [`ActionHandle`] to attach to options.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::{OptionDefinition, is_identifier};
use crate::error::{DefinitionError, ParseError};
use crate::value::Value;

/// A user-defined action.
///
/// `execute` receives the raw value (absent for options that take none) and
/// the value currently stored for the option, and returns the new value.
pub trait Action: Send + Sync {
    fn execute(
        &self,
        option: &OptionDefinition,
        raw: Option<&str>,
        current: &Value,
    ) -> Result<Value, ParseError>;

    /// Whether the option consumes a value.
    fn takes_value(&self) -> bool {
        true
    }

    /// Whether repeated occurrences build a sequence (keeps the option pending after a value).
    fn accumulates(&self) -> bool {
        false
    }
}

type CallbackFn =
    dyn Fn(&OptionDefinition, Option<&str>, &Value) -> Result<Value, ParseError> + Send + Sync;

/// A named closure used by the `Callback` action.
#[derive(Clone)]
pub struct Callback {
    name: String,
    func: Arc<CallbackFn>,
}

impl Callback {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&OptionDefinition, Option<&str>, &Value) -> Result<Value, ParseError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish()
    }
}

/// Token returned by [`ActionRegistry::register`]; attach it with `ActionKind::Custom`.
#[derive(Clone)]
pub struct ActionHandle {
    name: String,
    handler: Arc<dyn Action>,
}

impl ActionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub enum ActionKind {
    #[default]
    StoreString,
    StoreTrue,
    StoreFalse,
    StoreInt,
    StoreFloat,
    StoreArray,
    Counter,
    Callback(Callback),
    /// Secret value, read from a prompt when no value is given. Runs after the whole line validated.
    Password,
    Help,
    Version,
    Custom(ActionHandle),
}

const BUILTIN_NAMES: &[&str] = &[
    "StoreString",
    "StoreTrue",
    "StoreFalse",
    "StoreInt",
    "StoreFloat",
    "StoreArray",
    "Counter",
    "Callback",
    "Password",
    "Help",
    "Version",
];

impl ActionKind {
    /// Look up a built-in kind by its registered name. `Callback` needs a target, so it is not
    /// returned here; see [`ActionRegistry::resolve_callback`].
    pub fn builtin(name: &str) -> Option<Self> {
        Some(match name {
            "StoreString" => Self::StoreString,
            "StoreTrue" => Self::StoreTrue,
            "StoreFalse" => Self::StoreFalse,
            "StoreInt" => Self::StoreInt,
            "StoreFloat" => Self::StoreFloat,
            "StoreArray" => Self::StoreArray,
            "Counter" => Self::Counter,
            "Password" => Self::Password,
            "Help" => Self::Help,
            "Version" => Self::Version,
            _ => return None,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::StoreString => "StoreString",
            Self::StoreTrue => "StoreTrue",
            Self::StoreFalse => "StoreFalse",
            Self::StoreInt => "StoreInt",
            Self::StoreFloat => "StoreFloat",
            Self::StoreArray => "StoreArray",
            Self::Counter => "Counter",
            Self::Callback(_) => "Callback",
            Self::Password => "Password",
            Self::Help => "Help",
            Self::Version => "Version",
            Self::Custom(handle) => handle.name(),
        }
    }

    pub fn takes_value(&self) -> bool {
        match self {
            Self::StoreTrue | Self::StoreFalse | Self::Counter | Self::Help | Self::Version => {
                false
            }
            Self::Custom(handle) => handle.handler.takes_value(),
            _ => true,
        }
    }

    pub fn accumulates(&self) -> bool {
        match self {
            Self::StoreArray => true,
            Self::Custom(handle) => handle.handler.accumulates(),
            _ => false,
        }
    }

    /// Deferred kinds are queued during scanning and executed once the line is accepted.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Password)
    }

    pub(crate) fn execute(
        &self,
        option: &OptionDefinition,
        raw: Option<&str>,
        current: &Value,
    ) -> Result<Value, ParseError> {
        match self {
            Self::StoreTrue | Self::Help | Self::Version => Ok(Value::Bool(true)),
            Self::StoreFalse => Ok(Value::Bool(false)),
            Self::Counter => Ok(Value::Int(current.as_int().unwrap_or(0) + 1)),
            Self::StoreString | Self::Password => Ok(Value::Str(raw.unwrap_or_default().to_string())),
            Self::StoreInt => {
                let raw = raw.unwrap_or_default();
                raw.parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| type_error(option, "int", raw))
            }
            Self::StoreFloat => {
                let raw = raw.unwrap_or_default();
                match raw.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Value::Float(n)),
                    _ => Err(type_error(option, "float", raw)),
                }
            }
            Self::StoreArray => {
                let mut items = match current {
                    Value::List(items) => items.clone(),
                    _ => Vec::new(),
                };
                items.push(raw.unwrap_or_default().to_string());
                Ok(Value::List(items))
            }
            Self::Callback(cb) => (cb.func)(option, raw, current),
            Self::Custom(handle) => handle.handler.execute(option, raw, current),
        }
    }
}

fn type_error(option: &OptionDefinition, expected: &str, raw: &str) -> ParseError {
    ParseError::OptionValueTypeError {
        name: option.name().to_string(),
        expected: expected.to_string(),
        value: raw.to_string(),
    }
}

/// Name → handler table for custom actions and callbacks.
///
/// Registration happens up front; definitions then resolve action names
/// through the registry, so a misspelt action fails when the option is built.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: IndexMap<String, ActionHandle>,
    callbacks: IndexMap<String, Callback>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom action under `name`.
    pub fn register<A>(
        &mut self,
        name: impl Into<String>,
        action: A,
    ) -> Result<ActionHandle, DefinitionError>
    where
        A: Action + 'static,
    {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(DefinitionError::InvalidCustomAction {
                action: name,
                reason: "action names must be identifiers".to_string(),
            });
        }
        if BUILTIN_NAMES.contains(&name.as_str()) {
            return Err(DefinitionError::InvalidCustomAction {
                action: name,
                reason: "name is taken by a built-in action".to_string(),
            });
        }
        if self.actions.contains_key(&name) {
            return Err(DefinitionError::InvalidCustomAction {
                action: name,
                reason: "already registered".to_string(),
            });
        }
        let handle = ActionHandle {
            name: name.clone(),
            handler: Arc::new(action),
        };
        self.actions.insert(name, handle.clone());
        Ok(handle)
    }

    /// Register a named callback, so declarative definitions can refer to it.
    pub fn register_callback<F>(
        &mut self,
        name: impl Into<String>,
        func: F,
    ) -> Result<Callback, DefinitionError>
    where
        F: Fn(&OptionDefinition, Option<&str>, &Value) -> Result<Value, ParseError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.callbacks.contains_key(&name) {
            return Err(DefinitionError::InvalidCustomAction {
                action: name,
                reason: "a callback with this name is already registered".to_string(),
            });
        }
        let callback = Callback::new(name.clone(), func);
        self.callbacks.insert(name, callback.clone());
        Ok(callback)
    }

    pub fn action(&self, name: &str) -> Option<&ActionHandle> {
        self.actions.get(name)
    }

    /// Resolve an action name for option `option`: built-ins first, then registered actions.
    pub fn resolve(&self, option: &str, action: &str) -> Result<ActionKind, DefinitionError> {
        if let Some(kind) = ActionKind::builtin(action) {
            return Ok(kind);
        }
        if let Some(handle) = self.actions.get(action) {
            return Ok(ActionKind::Custom(handle.clone()));
        }
        Err(DefinitionError::UnregisteredOrInvalidAction {
            name: option.to_string(),
            action: action.to_string(),
        })
    }

    /// Resolve the target of a `Callback` action.
    pub fn resolve_callback(
        &self,
        option: &str,
        callback: &str,
    ) -> Result<ActionKind, DefinitionError> {
        self.callbacks
            .get(callback)
            .cloned()
            .map(ActionKind::Callback)
            .ok_or_else(|| DefinitionError::InvalidCallbackTarget {
                name: option.to_string(),
                callback: callback.to_string(),
            })
    }
}
