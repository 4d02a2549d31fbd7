//! engine::errors
//!
//! Error types for registration and command execution.
//!
//! # Design
//!
//! Registration problems ([`RegistryError`]) are reported when the registry
//! is being populated at startup. Everything that can go wrong while running
//! a command line is a [`ScriptError`]; conversion failures keep their
//! [`ConvertError`] as the source.
//!
//! Nothing is rolled back. A `run` that fails on a named argument has
//! already applied the positional values before it.
//!
//! # Example
//!
//! ```
//! use seedline::engine::{ArityBound, ScriptError};
//!
//! let err = ScriptError::Arity {
//!     command: "update-language".to_string(),
//!     bound: ArityBound::AtLeast,
//!     count: 2,
//!     given: 1,
//! };
//! assert!(err.to_string().contains("at least 2 parameter(s)"));
//! ```

use std::fmt;

use thiserror::Error;

use crate::core::types::ConvertError;

/// Boxed error returned by custom command handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from populating a registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("record registration '{0}' has no acquisition strategy (collection, find/create or combined accessor)")]
    MissingAcquisition(String),

    #[error("record registration '{0}' has no identity field")]
    MissingIdentity(String),

    #[error("name '{0}' is already registered")]
    DuplicateName(String),

    #[error("field name '{name}' on '{record}' is claimed by both {first} and {second}")]
    FieldNameCollision {
        record: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("'{0}' is reserved and cannot be used as a command name")]
    ReservedCommandName(String),

    #[error("command '{command}' has no parameter named '{param}'")]
    UnknownParameter { command: String, param: String },

    #[error("invalid default for parameter '{param}' of command '{command}': {reason}")]
    InvalidDefault {
        command: String,
        param: String,
        reason: String,
    },

    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),
}

/// Which side of a custom command's arity was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityBound {
    AtLeast,
    AtMost,
    Exactly,
}

impl fmt::Display for ArityBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ArityBound::AtLeast => "at least",
            ArityBound::AtMost => "at most",
            ArityBound::Exactly => "exactly",
        };
        write!(f, "{text}")
    }
}

/// Errors from running command lines.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Empty input, too few tokens for `add`, or malformed named arguments.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// The leading token is neither `add` nor a registered custom command.
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),

    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),

    #[error("unknown field '{field}' on {record}")]
    UnknownField { record: String, field: String },

    #[error("{record} has no member named '{member}'")]
    UnknownMember { record: String, member: String },

    /// Method candidates exist but none takes two arguments.
    #[error("member '{member}' on {record} cannot be called with 2 arguments (takes {takes})")]
    MethodArity {
        record: String,
        member: String,
        takes: usize,
    },

    #[error("command '{command}' requires {bound} {count} parameter(s), got {given}")]
    Arity {
        command: String,
        bound: ArityBound,
        count: usize,
        given: usize,
    },

    #[error("invalid value for {target}: {source}")]
    Convert {
        target: String,
        #[source]
        source: ConvertError,
    },

    /// A named `--Key=` would give a record the identity of another one.
    #[error("{record} '{key}' already exists")]
    DuplicateKey { record: String, key: String },

    /// A record could not be found right after it was resolved or created.
    #[error("{record} '{key}' could not be acquired")]
    MissingRecord { record: String, key: String },

    /// A custom command handler returned an error.
    #[error("command '{name}' failed: {source}")]
    Command {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A line of a multi-line script failed.
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<ScriptError>,
    },

    /// A value holds a line break, which no single command line can carry.
    #[error("{record}.{field} contains a line break and cannot be written as a command")]
    MultilineValue { record: String, field: String },

    /// The generator was given a record whose type has no registration.
    #[error("record type {0} is not registered")]
    UnregisteredType(String),
}

impl ScriptError {
    /// The underlying error, looking through [`ScriptError::Line`].
    pub fn root(&self) -> &ScriptError {
        match self {
            ScriptError::Line { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error came from converting a token.
    pub fn is_conversion(&self) -> bool {
        matches!(self.root(), ScriptError::Convert { .. })
    }

    /// Check if this error is a registry miss (type, field or member).
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self.root(),
            ScriptError::UnknownRecordType(_)
                | ScriptError::UnknownField { .. }
                | ScriptError::UnknownMember { .. }
                | ScriptError::UnsupportedAction(_)
        )
    }

    /// The conversion error, if this is one.
    pub fn conversion(&self) -> Option<&ConvertError> {
        match self.root() {
            ScriptError::Convert { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_wrapping_keeps_root() {
        let err = ScriptError::Line {
            line: 3,
            source: Box::new(ScriptError::UnsupportedAction("frobnicate".into())),
        };
        assert_eq!(err.to_string(), "line 3: unsupported action 'frobnicate'");
        assert!(err.is_lookup_miss());
        assert!(matches!(err.root(), ScriptError::UnsupportedAction(_)));
    }

    #[test]
    fn conversion_accessor() {
        let err = ScriptError::Convert {
            target: "book.Year".into(),
            source: ConvertError::failed("abc", "i32"),
        };
        assert!(err.is_conversion());
        assert_eq!(
            err.conversion(),
            Some(&ConvertError::failed("abc", "i32"))
        );
        assert!(!err.is_lookup_miss());
    }

    #[test]
    fn arity_bounds_display() {
        assert_eq!(ArityBound::AtMost.to_string(), "at most");
        assert_eq!(ArityBound::Exactly.to_string(), "exactly");
    }
}
