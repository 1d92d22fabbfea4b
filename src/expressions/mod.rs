//! Generic condition expression grammar
//!
//! Literals, function calls, named values and index access. Callers supply
//! their own functions and named values through a [`Vocabulary`] and give
//! them meaning at evaluation time through an [`EvaluationState`].

pub mod lexer;
pub mod node;
pub mod parser;
pub mod value;

pub use node::{CoreFunction, EvaluationState, Literal, Node};
pub use parser::{parse, FunctionSignature, Vocabulary};
pub use value::{ReadOnlyObject, Value};

use std::fmt;
use thiserror::Error;

/// Longest accepted expression, in characters
pub const MAX_LENGTH: usize = 2000;

/// Deepest accepted nesting of function calls and indexers
pub const MAX_DEPTH: usize = 50;

/// What went wrong while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedSymbol,
    UnrecognizedValue,
    UnknownFunction,
    UnknownNamedValue,
    TooFewParameters,
    TooManyParameters,
    UnclosedFunction,
    UnclosedIndexer,
    ExpectedPropertyName,
    ExceededMaxLength,
    ExceededMaxDepth,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ParseErrorKind::UnexpectedSymbol => "Unexpected symbol",
            ParseErrorKind::UnrecognizedValue => "Unrecognized value",
            ParseErrorKind::UnknownFunction => "Unrecognized function",
            ParseErrorKind::UnknownNamedValue => "Unrecognized named-value",
            ParseErrorKind::TooFewParameters => "Too few parameters supplied",
            ParseErrorKind::TooManyParameters => "Too many parameters supplied",
            ParseErrorKind::UnclosedFunction => "Unclosed function",
            ParseErrorKind::UnclosedIndexer => "Unclosed indexer",
            ParseErrorKind::ExpectedPropertyName => "Expected property name to follow dereference operator",
            ParseErrorKind::ExceededMaxLength => "Exceeded max expression length",
            ParseErrorKind::ExceededMaxDepth => "Exceeded max expression depth",
        };
        f.write_str(description)
    }
}

/// A condition that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: '{token}'. Located at position {position} within expression: {expression}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Raw text of the offending token
    pub token: String,
    /// 1-based character position of the offending token
    pub position: usize,
    pub expression: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: impl Into<String>, position: usize, expression: &str) -> Self {
        Self {
            kind,
            token: token.into(),
            position,
            expression: expression.to_string(),
        }
    }
}

/// A failure while evaluating a parsed expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Unable to convert from {from} to {to}")]
    InvalidConversion {
        from: &'static str,
        to: &'static str,
    },

    #[error("Unable to compare {left} with {right}")]
    InvalidComparison {
        left: &'static str,
        right: &'static str,
    },
}

/// Receiver of evaluation diagnostics
pub trait TraceWriter {
    fn info(&self, message: &str);
    fn verbose(&self, message: &str);
}

/// Trace writer that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceWriter for NullTrace {
    fn info(&self, _message: &str) {}
    fn verbose(&self, _message: &str) {}
}
