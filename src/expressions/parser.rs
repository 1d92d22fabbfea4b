//! Recursive-descent parser producing [`Node`] trees

use crate::expressions::lexer::{Lexer, Token, TokenKind};
use crate::expressions::{
    CoreFunction, Literal, Node, ParseError, ParseErrorKind, MAX_DEPTH, MAX_LENGTH,
};

/// A caller-supplied function
#[derive(Debug, Clone)]
pub struct FunctionSignature<F> {
    pub name: String,
    pub min_args: usize,
    pub max_args: usize,
    pub function: F,
}

/// Caller-supplied functions and named values the grammar accepts
///
/// Names are matched case-insensitively. Core functions take precedence.
#[derive(Debug, Clone)]
pub struct Vocabulary<F, N> {
    functions: Vec<FunctionSignature<F>>,
    named_values: Vec<(String, N)>,
}

impl<F: Clone, N: Clone> Vocabulary<F, N> {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            named_values: Vec::new(),
        }
    }

    pub fn with_function(mut self, name: &str, min_args: usize, max_args: usize, function: F) -> Self {
        self.functions.push(FunctionSignature {
            name: name.to_string(),
            min_args,
            max_args,
            function,
        });
        self
    }

    pub fn with_named_value(mut self, name: &str, value: N) -> Self {
        self.named_values.push((name.to_string(), value));
        self
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSignature<F>> {
        self.functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn named_value(&self, name: &str) -> Option<&(String, N)> {
        self.named_values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<F: Clone, N: Clone> Default for Vocabulary<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `expression` against `vocabulary`
///
/// Returns `Ok(None)` when the expression is empty or only whitespace.
pub fn parse<F: Clone, N: Clone>(
    expression: &str,
    vocabulary: &Vocabulary<F, N>,
) -> Result<Option<Node<F, N>>, ParseError> {
    let length = expression.chars().count();
    if length > MAX_LENGTH {
        let token: String = expression.chars().take(32).collect();
        return Err(ParseError::new(
            ParseErrorKind::ExceededMaxLength,
            token,
            MAX_LENGTH + 1,
            expression,
        ));
    }

    let tokens = Lexer::new(expression).tokenize()?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser {
        expression,
        vocabulary,
        tokens,
        index: 0,
    };
    let node = parser.parse_expression(1)?;

    if let Some(extra) = parser.peek() {
        return Err(parser.error(ParseErrorKind::UnexpectedSymbol, extra));
    }
    Ok(Some(node))
}

struct Parser<'a, F, N> {
    expression: &'a str,
    vocabulary: &'a Vocabulary<F, N>,
    tokens: Vec<Token>,
    index: usize,
}

/// What an identifier followed by `(` resolved to
enum Callee<F> {
    Core(CoreFunction),
    Extension(String, F),
}

impl<'a, F: Clone, N: Clone> Parser<'a, F, N> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| &t.kind == kind)
    }

    fn parse_expression(&mut self, depth: usize) -> Result<Node<F, N>, ParseError> {
        let Some(token) = self.next() else {
            // Callers only recurse when a token is expected; report the last one
            let last = self.tokens.last().cloned();
            return Err(match last {
                Some(t) => self.error(ParseErrorKind::UnexpectedSymbol, &t),
                None => ParseError::new(ParseErrorKind::UnexpectedSymbol, "", 1, self.expression),
            });
        };

        if depth > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::ExceededMaxDepth, &token));
        }

        let node = match &token.kind {
            TokenKind::Null => Node::Literal(Literal::Null),
            TokenKind::Boolean(b) => Node::Literal(Literal::Boolean(*b)),
            TokenKind::Number(n) => Node::Literal(Literal::Number(*n)),
            TokenKind::String(s) => Node::Literal(Literal::String(s.clone())),
            TokenKind::Identifier(name) if self.peek_is(&TokenKind::StartGroup) => {
                let node = self.parse_call(&token, name, depth)?;
                self.parse_accessors(node, depth)?
            }
            TokenKind::Identifier(name) => {
                let Some((name, value)) = self.vocabulary.named_value(name).cloned() else {
                    return Err(self.error(ParseErrorKind::UnknownNamedValue, &token));
                };
                let node = Node::NamedValue { name, value };
                self.parse_accessors(node, depth)?
            }
            _ => return Err(self.error(ParseErrorKind::UnexpectedSymbol, &token)),
        };

        Ok(node)
    }

    fn parse_call(&mut self, name_token: &Token, name: &str, depth: usize) -> Result<Node<F, N>, ParseError> {
        let (callee, min_args, max_args) = if let Some(core) = CoreFunction::from_name(name) {
            let (min, max) = core.arity();
            (Callee::Core(core), min, max)
        } else if let Some(signature) = self.vocabulary.function(name) {
            (
                Callee::Extension(signature.name.clone(), signature.function.clone()),
                signature.min_args,
                signature.max_args,
            )
        } else {
            return Err(self.error(ParseErrorKind::UnknownFunction, name_token));
        };

        // Consume '('
        self.next();

        let mut args = Vec::new();
        if self.peek_is(&TokenKind::EndGroup) {
            self.next();
        } else {
            loop {
                if self.peek().is_none() {
                    return Err(self.error(ParseErrorKind::UnclosedFunction, name_token));
                }
                args.push(self.parse_expression(depth + 1)?);

                match self.next() {
                    Some(Token { kind: TokenKind::Separator, .. }) => continue,
                    Some(Token { kind: TokenKind::EndGroup, .. }) => break,
                    Some(other) => return Err(self.error(ParseErrorKind::UnexpectedSymbol, &other)),
                    None => return Err(self.error(ParseErrorKind::UnclosedFunction, name_token)),
                }
            }
        }

        if args.len() < min_args {
            return Err(self.error(ParseErrorKind::TooFewParameters, name_token));
        }
        if args.len() > max_args {
            return Err(self.error(ParseErrorKind::TooManyParameters, name_token));
        }

        Ok(match callee {
            Callee::Core(function) => Node::Core { function, args },
            Callee::Extension(name, function) => Node::Extension {
                name,
                function,
                args,
            },
        })
    }

    /// Parse any trailing `[key]` and `.name` accessors
    fn parse_accessors(&mut self, mut node: Node<F, N>, depth: usize) -> Result<Node<F, N>, ParseError> {
        loop {
            if self.peek_is(&TokenKind::StartIndex) {
                let Some(open) = self.next() else { break };
                if self.peek().is_none() {
                    return Err(self.error(ParseErrorKind::UnclosedIndexer, &open));
                }
                let key = self.parse_expression(depth + 1)?;
                match self.next() {
                    Some(Token { kind: TokenKind::EndIndex, .. }) => {}
                    Some(other) => return Err(self.error(ParseErrorKind::UnexpectedSymbol, &other)),
                    None => return Err(self.error(ParseErrorKind::UnclosedIndexer, &open)),
                }
                node = Node::Index {
                    target: Box::new(node),
                    key: Box::new(key),
                };
            } else if self.peek_is(&TokenKind::Dereference) {
                let Some(dot) = self.next() else { break };
                let property = match self.next() {
                    Some(Token {
                        kind: TokenKind::Identifier(_) | TokenKind::Boolean(_) | TokenKind::Null,
                        raw,
                        ..
                    }) => raw,
                    Some(other) => return Err(self.error(ParseErrorKind::ExpectedPropertyName, &other)),
                    None => return Err(self.error(ParseErrorKind::ExpectedPropertyName, &dot)),
                };
                node = Node::Index {
                    target: Box::new(node),
                    key: Box::new(Node::Literal(Literal::String(property))),
                };
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn error(&self, kind: ParseErrorKind, token: &Token) -> ParseError {
        ParseError::new(kind, token.raw.clone(), token.position, self.expression)
    }
}
