//! The reserved-lexeme table.
//!
//! Maps each reserved lexeme to its token classification and operator
//! precedence. The parser never consults the precedences (its grammar
//! positions encode them); they are recorded so the token model is
//! complete.

use rustc_hash::FxHashMap;

use crate::token::{TokenKind, TokenValue};

/// Classification of one reserved lexeme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub precedence: i32,
}

impl TokenRecord {
    fn new(kind: TokenKind, value: TokenValue, precedence: i32) -> Self {
        Self {
            kind,
            value,
            precedence,
        }
    }
}

/// The preloaded lexeme table: 8 keywords, 7 operators, 3 delimiters.
///
/// # Example
///
/// ```
/// use tinyc_lex::{Lexicon, TokenKind, TokenValue};
///
/// let lexicon = Lexicon::new();
/// let record = lexicon.get("repeat").unwrap();
/// assert_eq!(record.kind, TokenKind::Keyword);
/// assert_eq!(record.value, TokenValue::Repeat);
/// assert!(lexicon.get("foo").is_none());
/// ```
pub struct Lexicon {
    map: FxHashMap<&'static str, TokenRecord>,
}

impl Lexicon {
    pub fn new() -> Self {
        use TokenKind::{Delimiter, Keyword, Operator};
        use TokenValue::*;

        let mut map = FxHashMap::default();
        map.insert("if", TokenRecord::new(Keyword, If, -1));
        map.insert("then", TokenRecord::new(Keyword, Then, -1));
        map.insert("else", TokenRecord::new(Keyword, Else, -1));
        map.insert("end", TokenRecord::new(Keyword, End, -1));
        map.insert("repeat", TokenRecord::new(Keyword, Repeat, -1));
        map.insert("until", TokenRecord::new(Keyword, Until, -1));
        map.insert("read", TokenRecord::new(Keyword, Read, -1));
        map.insert("write", TokenRecord::new(Keyword, Write, -1));

        map.insert("+", TokenRecord::new(Operator, Plus, 5));
        map.insert("-", TokenRecord::new(Operator, Minus, 5));
        map.insert("*", TokenRecord::new(Operator, Multiply, 10));
        map.insert("/", TokenRecord::new(Operator, Divide, 10));
        map.insert("=", TokenRecord::new(Operator, Equal, 2));
        map.insert("<", TokenRecord::new(Operator, Less, 2));
        map.insert(":=", TokenRecord::new(Operator, Assign, 0));

        map.insert("(", TokenRecord::new(Delimiter, LeftParenthesis, -1));
        map.insert(")", TokenRecord::new(Delimiter, RightParenthesis, -1));
        map.insert(";", TokenRecord::new(Delimiter, Semicolon, -1));

        Self { map }
    }

    /// Looks up a lexeme, returning its classification if reserved.
    pub fn get(&self, lexeme: &str) -> Option<TokenRecord> {
        self.map.get(lexeme).copied()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keywords_present() {
        let lexicon = Lexicon::new();
        for keyword in ["if", "then", "else", "end", "repeat", "until", "read", "write"] {
            let record = lexicon.get(keyword).unwrap();
            assert_eq!(record.kind, TokenKind::Keyword, "keyword {keyword}");
            assert_eq!(record.precedence, -1);
        }
    }

    #[test]
    fn test_operator_precedences() {
        let lexicon = Lexicon::new();
        assert_eq!(lexicon.get("+").unwrap().precedence, 5);
        assert_eq!(lexicon.get("-").unwrap().precedence, 5);
        assert_eq!(lexicon.get("*").unwrap().precedence, 10);
        assert_eq!(lexicon.get("/").unwrap().precedence, 10);
        assert_eq!(lexicon.get("=").unwrap().precedence, 2);
        assert_eq!(lexicon.get("<").unwrap().precedence, 2);
        assert_eq!(lexicon.get(":=").unwrap().precedence, 0);
    }

    #[test]
    fn test_delimiters_present() {
        let lexicon = Lexicon::new();
        assert_eq!(lexicon.get("(").unwrap().value, TokenValue::LeftParenthesis);
        assert_eq!(lexicon.get(")").unwrap().value, TokenValue::RightParenthesis);
        assert_eq!(lexicon.get(";").unwrap().value, TokenValue::Semicolon);
    }

    #[test]
    fn test_unreserved_lexemes_absent() {
        let lexicon = Lexicon::new();
        assert!(lexicon.get("x").is_none());
        assert!(lexicon.get("42").is_none());
        assert!(lexicon.get(":").is_none());
    }
}
