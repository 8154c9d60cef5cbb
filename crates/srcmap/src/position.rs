//! Line/column positions in generated and original text

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line and column in a text file
///
/// The first line of a file is 1 (not enforced). The first column on a line
/// is 1; column 0 marks the position invalid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// An invalid position
    pub const fn invalid() -> Self {
        Position { line: 0, column: 0 }
    }

    pub const fn is_valid(&self) -> bool {
        self.column != 0
    }
}

impl From<(u32, u32)> for Position {
    fn from((line, column): (u32, u32)) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A position inside a named file
///
/// An empty name marks the position invalid (no source is known).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilePosition {
    pub name: String,
    pub position: Position,
}

impl FilePosition {
    pub fn new(name: impl Into<String>, position: impl Into<Position>) -> Self {
        FilePosition {
            name: name.into(),
            position: position.into(),
        }
    }

    /// An invalid file position
    pub fn invalid() -> Self {
        FilePosition::default()
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.position.is_valid()
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }
}

impl PartialOrd for FilePosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilePosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for FilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_validity() {
        assert!(!Position::default().is_valid());
        assert!(!Position::invalid().is_valid());
        assert!(!Position::new(3, 0).is_valid());
        assert!(Position::new(0, 1).is_valid());
        assert!(Position::new(3, 4).is_valid());
    }

    #[test]
    fn test_position_ordering() {
        let a = Position::new(1, 10);
        let b = Position::new(1, 15);
        let c = Position::new(2, 1);

        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
        assert_eq!(Position::from((1, 10)), a);
    }

    #[test]
    fn test_file_position_validity() {
        assert!(!FilePosition::invalid().is_valid());
        assert!(!FilePosition::new("", (1, 1)).is_valid());
        assert!(!FilePosition::new("main.qmd", (1, 0)).is_valid());
        assert!(FilePosition::new("main.qmd", (1, 1)).is_valid());
    }

    #[test]
    fn test_file_position_equality() {
        let a = FilePosition::new("one", (3, 4));
        let b = FilePosition::new("one", (3, 4));
        let c = FilePosition::new("two", (3, 4));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.line(), 3);
        assert_eq!(a.column(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(2, 13).to_string(), "2:13");
        assert_eq!(
            FilePosition::new("sourceTwo", (40, 10)).to_string(),
            "sourceTwo:40:10"
        );
    }

    #[test]
    fn test_serialization_file_position() {
        let pos = FilePosition::new("main.qmd", (5, 10));
        let json = serde_json::to_string(&pos).unwrap();
        let deserialized: FilePosition = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, deserialized);
    }
}
