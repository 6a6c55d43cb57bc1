//! Source positions attached to fallible runtime calls
//!
//! Generated code passes the (line, column) of the call site into every
//! operation that can fail. The position never affects control flow; it is
//! only echoed back in the error payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (line, column) pair in the generated program's source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub const fn new(line: u32, col: u32) -> Self {
        Position { line, col }
    }

    /// Position used when the caller has none (runtime-internal calls)
    pub const fn unknown() -> Self {
        Position { line: 0, col: 0 }
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.col == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl From<(u32, u32)> for Position {
    fn from((line, col): (u32, u32)) -> Self {
        Position { line, col }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Position::new(12, 4).to_string(), "12:4");
    }

    #[test]
    fn test_unknown() {
        assert!(Position::unknown().is_unknown());
        assert!(!Position::new(1, 0).is_unknown());
        assert_eq!(Position::default(), Position::unknown());
    }

    #[test]
    fn test_from_tuple() {
        let pos: Position = (3, 9).into();
        assert_eq!(pos, Position::new(3, 9));
    }
}
