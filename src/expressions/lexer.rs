//! Tokenizer for condition expressions

use crate::expressions::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    StartGroup,
    EndGroup,
    StartIndex,
    EndIndex,
    Separator,
    Dereference,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Identifier(String),
}

/// A token with its raw text and 1-based character position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    pub position: usize,
}

pub struct Lexer<'a> {
    expression: &'a str,
    chars: Vec<char>,
    index: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(expression: &'a str) -> Self {
        Self {
            expression,
            chars: expression.chars().collect(),
            index: 0,
        }
    }

    /// Tokenize the whole expression
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        while self.chars.get(self.index).is_some_and(|c| c.is_whitespace()) {
            self.index += 1;
        }

        let Some(&c) = self.chars.get(self.index) else {
            return Ok(None);
        };
        let start = self.index;

        let kind = match c {
            '(' => Some(TokenKind::StartGroup),
            ')' => Some(TokenKind::EndGroup),
            '[' => Some(TokenKind::StartIndex),
            ']' => Some(TokenKind::EndIndex),
            ',' => Some(TokenKind::Separator),
            _ => None,
        };
        if let Some(kind) = kind {
            self.index += 1;
            return Ok(Some(self.token(kind, start)));
        }

        let token = match c {
            '\'' => self.read_string(start)?,
            '.' if !self.peek_is_digit(1) => {
                self.index += 1;
                self.token(TokenKind::Dereference, start)
            }
            '-' | '.' | '0'..='9' => self.read_number(start)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(start),
            _ => {
                return Err(self.error(ParseErrorKind::UnrecognizedValue, c.to_string(), start));
            }
        };
        Ok(Some(token))
    }

    fn peek_is_digit(&self, offset: usize) -> bool {
        self.chars
            .get(self.index + offset)
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn read_string(&mut self, start: usize) -> Result<Token, ParseError> {
        let mut value = String::new();
        self.index += 1;

        loop {
            match self.chars.get(self.index) {
                Some('\'') if self.chars.get(self.index + 1) == Some(&'\'') => {
                    value.push('\'');
                    self.index += 2;
                }
                Some('\'') => {
                    self.index += 1;
                    return Ok(self.token(TokenKind::String(value), start));
                }
                Some(&c) => {
                    value.push(c);
                    self.index += 1;
                }
                None => {
                    let raw = self.chars[start..].iter().collect();
                    return Err(self.error(ParseErrorKind::UnrecognizedValue, raw, start));
                }
            }
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Token, ParseError> {
        self.index += 1;
        while self
            .chars
            .get(self.index)
            .is_some_and(|c| c.is_ascii_digit() || *c == '.')
        {
            self.index += 1;
        }

        let raw: String = self.chars[start..self.index].iter().collect();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(self.token(TokenKind::Number(n), start)),
            _ => Err(self.error(ParseErrorKind::UnrecognizedValue, raw, start)),
        }
    }

    fn read_word(&mut self, start: usize) -> Token {
        while self
            .chars
            .get(self.index)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        {
            self.index += 1;
        }

        let raw: String = self.chars[start..self.index].iter().collect();
        let kind = if raw.eq_ignore_ascii_case("true") {
            TokenKind::Boolean(true)
        } else if raw.eq_ignore_ascii_case("false") {
            TokenKind::Boolean(false)
        } else if raw.eq_ignore_ascii_case("null") {
            TokenKind::Null
        } else {
            TokenKind::Identifier(raw)
        };
        self.token(kind, start)
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            raw: self.chars[start..self.index].iter().collect(),
            position: start + 1,
        }
    }

    fn error(&self, kind: ParseErrorKind, raw: String, start: usize) -> ParseError {
        ParseError::new(kind, raw, start + 1, self.expression)
    }
}
