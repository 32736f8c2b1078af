//! Source location tracking.
//!
//! A `TokenLocation` pins a token or AST node to a point in a source
//! file. Lines are 1-based; columns start at 0 and count the characters
//! the lexer has consumed on the current line, so the column of the
//! first character on a line is 1 once it has been read.

use std::fmt;

/// A point in a source file: file name, line, and column.
///
/// Locations are attached to tokens when they are produced and copied
/// into AST nodes from the first consumed token. `Display` renders the
/// diagnostic prefix form `file:line:col:`.
///
/// # Example
///
/// ```
/// use tinyc_util::TokenLocation;
///
/// let loc = TokenLocation::new("fact.tiny", 3, 7);
/// assert_eq!(loc.to_string(), "fact.tiny:3:7:");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenLocation {
    file_name: String,
    line: u32,
    column: u32,
}

impl Default for TokenLocation {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            line: 1,
            column: 0,
        }
    }
}

impl TokenLocation {
    /// Creates a location for the given file, line, and column.
    pub fn new(file_name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_name: file_name.into(),
            line,
            column,
        }
    }

    /// The name of the file this location points into.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Line number, 1-based.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Column number; 0 before anything on the line has been consumed.
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for TokenLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:", self.file_name, self.line, self.column)
    }
}
