//! Runtime Error Types
//!
//! Every fallible runtime operation returns `Result<T, RuntimeError>`.
//! Errors carry the source position handed in by generated code so the
//! payload seen at a checkpoint points at the user's call site, never at
//! runtime internals.
//!
//! # Usage
//!
//! Container operations build their own errors:
//! ```ignore
//! if index_out_of_range {
//!     return Err(RuntimeError::OutOfBounds { position, index });
//! }
//! ```
//!
//! Callbacks signal failure with a message, which is propagated verbatim:
//! ```ignore
//! return Err(RuntimeError::failure(position, "value must be positive"));
//! ```

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which end of a collection an empty access was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyAccess {
    First,
    Last,
    Pop,
}

/// The single current error record: where it happened and what went wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(flatten)]
    pub position: Position,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        ErrorPayload {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.position)
    }
}

/// Errors raised by the runtime or signalled by user callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Index outside `[-len, len)` for the container's current length
    OutOfBounds { position: Position, index: i32 },
    /// first/last/pop on a zero-length container
    EmptyCollection {
        position: Position,
        access: EmptyAccess,
    },
    /// A predicate, iterator or comparator signalled failure
    Failure(ErrorPayload),
}

impl RuntimeError {
    /// Build a user-level failure
    pub fn failure(position: Position, message: impl Into<String>) -> Self {
        RuntimeError::Failure(ErrorPayload::new(position, message))
    }

    pub fn position(&self) -> Position {
        match self {
            RuntimeError::OutOfBounds { position, .. } => *position,
            RuntimeError::EmptyCollection { position, .. } => *position,
            RuntimeError::Failure(payload) => payload.position,
        }
    }

    /// Convert into the payload recorded by the error context
    pub fn payload(&self) -> ErrorPayload {
        match self {
            RuntimeError::Failure(payload) => payload.clone(),
            other => ErrorPayload::new(other.position(), other.to_string()),
        }
    }

    pub fn into_payload(self) -> ErrorPayload {
        match self {
            RuntimeError::Failure(payload) => payload,
            other => other.payload(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::OutOfBounds { index, .. } => {
                write!(f, "index {} out of array bounds", index)
            }
            RuntimeError::EmptyCollection { access, .. } => match access {
                EmptyAccess::First => write!(f, "tried getting first element of empty array"),
                EmptyAccess::Last => write!(f, "tried getting last element of empty array"),
                EmptyAccess::Pop => write!(f, "tried popping from empty array"),
            },
            RuntimeError::Failure(payload) => write!(f, "{}", payload.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ErrorPayload> for RuntimeError {
    fn from(payload: ErrorPayload) -> Self {
        RuntimeError::Failure(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = RuntimeError::OutOfBounds {
            position: Position::new(2, 5),
            index: -4,
        };
        assert_eq!(err.to_string(), "index -4 out of array bounds");
        assert_eq!(
            err.payload(),
            ErrorPayload::new(Position::new(2, 5), "index -4 out of array bounds")
        );
    }

    #[test]
    fn test_empty_collection_messages() {
        let pos = Position::new(1, 1);
        let first = RuntimeError::EmptyCollection {
            position: pos,
            access: EmptyAccess::First,
        };
        let last = RuntimeError::EmptyCollection {
            position: pos,
            access: EmptyAccess::Last,
        };
        assert_eq!(first.to_string(), "tried getting first element of empty array");
        assert_eq!(last.to_string(), "tried getting last element of empty array");
    }

    #[test]
    fn test_failure_is_not_wrapped() {
        let payload = ErrorPayload::new(Position::new(7, 3), "boom");
        let err = RuntimeError::from(payload.clone());
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.into_payload(), payload);
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = ErrorPayload::new(Position::new(4, 2), "bad");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"line":4,"col":2,"message":"bad"}"#);
    }
}
