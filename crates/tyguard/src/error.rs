//! Type checking errors
//!
//! Construction errors (unknown or malformed expressions, bad aliases) are
//! raised as soon as an expression is compiled or a type is defined. A value
//! that merely fails a check is never an error, except through `assert`.

use thiserror::Error;

use crate::result::TestResult;

/// Errors raised by compiling, defining or asserting types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Expression is malformed or names an unregistered type
    #[error("Type definition for \"{expression}\" was unknown.")]
    UnknownType {
        /// The offending (sub-)expression
        expression: String,
    },

    /// Alias target is not registered yet
    #[error("Could not find a type \"{target}\" to define alias \"{alias}\"")]
    UnknownAliasTarget {
        /// Alias being defined
        alias: String,
        /// Missing target type
        target: String,
    },

    /// A definition was rejected before compiling
    #[error("Invalid definition for type \"{name}\": {reason}")]
    InvalidDefinition {
        /// Type name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// `assert` found a value that does not match
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Most specific failure description
        message: String,
        /// Full result of the failed check
        result: TestResult,
    },
}

impl TypeError {
    pub(crate) fn unknown(expression: impl Into<String>) -> Self {
        TypeError::UnknownType {
            expression: expression.into(),
        }
    }

    /// Whether this error comes from a failed check rather than a bad definition
    pub fn is_assertion(&self) -> bool {
        matches!(self, TypeError::Assertion { .. })
    }

    /// The failed check behind an assertion error
    pub fn result(&self) -> Option<&TestResult> {
        match self {
            TypeError::Assertion { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Result type for type checking operations
pub type TypeResult<T> = Result<T, TypeError>;
