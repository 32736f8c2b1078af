//! The TINY token model.

use tinyc_util::TokenLocation;

/// Coarse token category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Number,
    Delimiter,
    EndOfFile,
    Unknown,
}

impl TokenKind {
    /// The category name used in "Expected X, but find Y" diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Number => "number",
            TokenKind::Delimiter => "delimiter",
            TokenKind::EndOfFile => "eof",
            TokenKind::Unknown => "unknown",
        }
    }
}

/// The exact lexeme a token stands for.
///
/// Identifiers and numbers are not distinguished lexemes and share the
/// `Unreserved` sentinel; their identity lives in the token's name and
/// integer payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenValue {
    // keywords
    If,
    Then,
    Else,
    End,
    Repeat,
    Until,
    Read,
    Write,

    // operators
    Plus,     // +
    Minus,    // -
    Multiply, // *
    Divide,   // /
    Equal,    // =
    Less,     // <
    Assign,   // :=

    // delimiters
    LeftParenthesis,  // (
    RightParenthesis, // )
    Semicolon,        // ;

    Unreserved,
}

/// A lexed token: category, lexeme identity, location, lexeme text,
/// optional payloads, and the lexicon's operator precedence (-1 when not
/// applicable).
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    kind: TokenKind,
    value: TokenValue,
    location: TokenLocation,
    name: String,
    precedence: i32,
    int_value: Option<i64>,
    string_value: Option<String>,
}

impl Token {
    /// Creates a token with no payload.
    pub fn new(
        kind: TokenKind,
        value: TokenValue,
        location: TokenLocation,
        precedence: i32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            value,
            location,
            name: name.into(),
            precedence,
            int_value: None,
            string_value: None,
        }
    }

    /// Creates a token carrying an integer payload (numbers).
    pub fn with_int(
        kind: TokenKind,
        value: TokenValue,
        location: TokenLocation,
        precedence: i32,
        name: impl Into<String>,
        int_value: i64,
    ) -> Self {
        Self {
            int_value: Some(int_value),
            ..Self::new(kind, value, location, precedence, name)
        }
    }

    /// Creates a token carrying a string payload (reserved for future
    /// literal forms).
    pub fn with_string(
        kind: TokenKind,
        value: TokenValue,
        location: TokenLocation,
        precedence: i32,
        name: impl Into<String>,
        string_value: impl Into<String>,
    ) -> Self {
        Self {
            string_value: Some(string_value.into()),
            ..Self::new(kind, value, location, precedence, name)
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> TokenValue {
        self.value
    }

    pub fn location(&self) -> &TokenLocation {
        &self.location
    }

    /// The lexeme text as it appeared in the source.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn int_value(&self) -> Option<i64> {
        self.int_value
    }

    pub fn string_value(&self) -> Option<&str> {
        self.string_value.as_deref()
    }
}

impl Default for Token {
    /// A placeholder token, used before the first `next_token` call.
    fn default() -> Self {
        Self::new(
            TokenKind::Unknown,
            TokenValue::Unreserved,
            TokenLocation::default(),
            -1,
            "",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_descriptions() {
        assert_eq!(TokenKind::Identifier.description(), "identifier");
        assert_eq!(TokenKind::Keyword.description(), "keyword");
        assert_eq!(TokenKind::Operator.description(), "operator");
        assert_eq!(TokenKind::Number.description(), "number");
        assert_eq!(TokenKind::Delimiter.description(), "delimiter");
        assert_eq!(TokenKind::EndOfFile.description(), "eof");
        assert_eq!(TokenKind::Unknown.description(), "unknown");
    }

    #[test]
    fn test_token_with_int_payload() {
        let token = Token::with_int(
            TokenKind::Number,
            TokenValue::Unreserved,
            TokenLocation::new("t.tiny", 1, 3),
            -1,
            "42",
            42,
        );
        assert_eq!(token.kind(), TokenKind::Number);
        assert_eq!(token.int_value(), Some(42));
        assert_eq!(token.string_value(), None);
        assert_eq!(token.name(), "42");
    }

    #[test]
    fn test_token_with_string_payload() {
        let token = Token::with_string(
            TokenKind::Unknown,
            TokenValue::Unreserved,
            TokenLocation::default(),
            -1,
            "lit",
            "payload",
        );
        assert_eq!(token.string_value(), Some("payload"));
        assert_eq!(token.int_value(), None);
    }

    #[test]
    fn test_default_token_is_unknown() {
        let token = Token::default();
        assert_eq!(token.kind(), TokenKind::Unknown);
        assert_eq!(token.value(), TokenValue::Unreserved);
        assert_eq!(token.precedence(), -1);
    }
}
