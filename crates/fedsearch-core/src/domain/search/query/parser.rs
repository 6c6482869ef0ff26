//! Query tokenizer
//!
//! Splits free text into words, quoted phrases and `prefix:value`
//! operators. Interpretation of the operators belongs to the compiler.

use crate::error::{Error, Result};

/// Prefixes recognized as operators; anything else stays plain text
pub const OPERATOR_PREFIXES: [&str; 5] = ["from", "before", "after", "during", "in"];

/// What a token is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Word(String),
    Phrase(String),
    Operator { prefix: String, value: String },
}

/// One token, optionally negated with a leading `-`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub negated: bool,
    pub kind: TokenKind,
}

/// Tokenizer for the search query language
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize `query`, failing on unbalanced quotes or empty operators
    pub fn parse(&self, query: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut chars = query.char_indices().peekable();

        while let Some(&(start, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }

            let mut negated = false;
            if c == '-' {
                negated = true;
                chars.next();
            }

            match chars.peek() {
                Some(&(quote_start, '"')) => {
                    chars.next();
                    let mut phrase = String::new();
                    let mut closed = false;
                    for (_, ch) in chars.by_ref() {
                        if ch == '"' {
                            closed = true;
                            break;
                        }
                        phrase.push(ch);
                    }
                    if !closed {
                        return Err(Error::syntax(&query[quote_start..]));
                    }
                    let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !phrase.is_empty() {
                        tokens.push(Token {
                            negated,
                            kind: TokenKind::Phrase(phrase),
                        });
                    }
                }
                Some(_) => {
                    let mut word = String::new();
                    while let Some(&(_, ch)) = chars.peek() {
                        if ch.is_whitespace() {
                            break;
                        }
                        word.push(ch);
                        chars.next();
                    }
                    if word.contains('"') {
                        return Err(Error::syntax(&query[start..]));
                    }
                    if let Some(token) = Self::word_token(negated, word)? {
                        tokens.push(token);
                    }
                }
                None => {}
            }
        }

        Ok(tokens)
    }

    fn word_token(negated: bool, word: String) -> Result<Option<Token>> {
        if word.is_empty() {
            return Ok(None);
        }

        if let Some((prefix, value)) = word.split_once(':') {
            let prefix = prefix.to_lowercase();
            if OPERATOR_PREFIXES.contains(&prefix.as_str()) {
                if value.is_empty() {
                    return Err(Error::syntax(word));
                }
                return Ok(Some(Token {
                    negated,
                    kind: TokenKind::Operator {
                        prefix,
                        value: value.to_string(),
                    },
                }));
            }
        }

        Ok(Some(Token {
            negated,
            kind: TokenKind::Word(word),
        }))
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}
