//! Expression tree and evaluation

use crate::expressions::value::{format_bool, format_number};
use crate::expressions::{EvaluationError, TraceWriter, Value};
use std::cmp::Ordering;
use std::fmt;

/// Functions every vocabulary understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreFunction {
    And,
    Or,
    Not,
    Xor,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    ContainsValue,
}

impl CoreFunction {
    const ALL: [CoreFunction; 16] = [
        CoreFunction::And,
        CoreFunction::Or,
        CoreFunction::Not,
        CoreFunction::Xor,
        CoreFunction::Eq,
        CoreFunction::Ne,
        CoreFunction::Gt,
        CoreFunction::Ge,
        CoreFunction::Lt,
        CoreFunction::Le,
        CoreFunction::Contains,
        CoreFunction::StartsWith,
        CoreFunction::EndsWith,
        CoreFunction::In,
        CoreFunction::NotIn,
        CoreFunction::ContainsValue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CoreFunction::And => "and",
            CoreFunction::Or => "or",
            CoreFunction::Not => "not",
            CoreFunction::Xor => "xor",
            CoreFunction::Eq => "eq",
            CoreFunction::Ne => "ne",
            CoreFunction::Gt => "gt",
            CoreFunction::Ge => "ge",
            CoreFunction::Lt => "lt",
            CoreFunction::Le => "le",
            CoreFunction::Contains => "contains",
            CoreFunction::StartsWith => "startsWith",
            CoreFunction::EndsWith => "endsWith",
            CoreFunction::In => "in",
            CoreFunction::NotIn => "notIn",
            CoreFunction::ContainsValue => "containsValue",
        }
    }

    /// Minimum and maximum number of arguments
    pub fn arity(self) -> (usize, usize) {
        match self {
            CoreFunction::And | CoreFunction::Or | CoreFunction::In | CoreFunction::NotIn => {
                (2, usize::MAX)
            }
            CoreFunction::Not => (1, 1),
            _ => (2, 2),
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Literal {
    pub fn to_value<'a>(&self) -> Value<'a> {
        match self {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

/// Parsed expression
///
/// `F` and `N` identify the caller-supplied functions and named values.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<F, N> {
    Literal(Literal),
    NamedValue {
        name: String,
        value: N,
    },
    Index {
        target: Box<Node<F, N>>,
        key: Box<Node<F, N>>,
    },
    Core {
        function: CoreFunction,
        args: Vec<Node<F, N>>,
    },
    Extension {
        name: String,
        function: F,
        args: Vec<Node<F, N>>,
    },
}

/// Gives meaning to a vocabulary's functions and named values
pub trait EvaluationState<F, N> {
    fn call(&self, function: &F, args: &[Value<'_>]) -> Result<Value<'_>, EvaluationError>;

    fn named_value(&self, value: &N) -> Value<'_>;
}

impl<F, N> Node<F, N> {
    /// Evaluate and coerce the result to a boolean
    pub fn evaluate_boolean<S>(&self, state: &S, trace: &dyn TraceWriter) -> Result<bool, EvaluationError>
    where
        S: EvaluationState<F, N>,
    {
        trace.info(&format!("Evaluating: {}", self));
        let result = self.evaluate(state, trace)?.is_truthy();
        trace.info(&format!("Result: {}", format_bool(result)));
        Ok(result)
    }

    pub fn evaluate<'s, S>(&self, state: &'s S, trace: &dyn TraceWriter) -> Result<Value<'s>, EvaluationError>
    where
        S: EvaluationState<F, N>,
    {
        match self {
            Node::Literal(literal) => Ok(literal.to_value()),
            Node::NamedValue { value, .. } => Ok(state.named_value(value)),
            Node::Index { target, key } => {
                let target = target.evaluate(state, trace)?;
                let key = key.evaluate(state, trace)?;
                match (target, key) {
                    (_, Value::Object(_)) => Ok(Value::Null),
                    (Value::Object(object), key) => Ok(object.index(&key.to_text()?)),
                    _ => Ok(Value::Null),
                }
            }
            Node::Core { function, args } => {
                let result = Value::Boolean(evaluate_core(*function, args, state, trace)?);
                trace.verbose(&format!("{} => {}", self, result));
                Ok(result)
            }
            Node::Extension { function, args, .. } => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(state, trace))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = state.call(function, &values)?;
                trace.verbose(&format!("{} => {}", self, result));
                Ok(result)
            }
        }
    }
}

fn evaluate_core<'s, F, N, S>(
    function: CoreFunction,
    args: &[Node<F, N>],
    state: &'s S,
    trace: &dyn TraceWriter,
) -> Result<bool, EvaluationError>
where
    S: EvaluationState<F, N>,
{
    let arg = |i: usize| args[i].evaluate(state, trace);

    let result = match function {
        CoreFunction::And => {
            let mut result = true;
            for node in args {
                if !node.evaluate(state, trace)?.is_truthy() {
                    result = false;
                    break;
                }
            }
            result
        }
        CoreFunction::Or => {
            let mut result = false;
            for node in args {
                if node.evaluate(state, trace)?.is_truthy() {
                    result = true;
                    break;
                }
            }
            result
        }
        CoreFunction::Not => !arg(0)?.is_truthy(),
        CoreFunction::Xor => arg(0)?.is_truthy() != arg(1)?.is_truthy(),
        CoreFunction::Eq => arg(0)?.loose_eq(&arg(1)?),
        CoreFunction::Ne => !arg(0)?.loose_eq(&arg(1)?),
        CoreFunction::Gt => arg(0)?.compare(&arg(1)?)? == Some(Ordering::Greater),
        CoreFunction::Ge => matches!(
            arg(0)?.compare(&arg(1)?)?,
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CoreFunction::Lt => arg(0)?.compare(&arg(1)?)? == Some(Ordering::Less),
        CoreFunction::Le => matches!(
            arg(0)?.compare(&arg(1)?)?,
            Some(Ordering::Less | Ordering::Equal)
        ),
        CoreFunction::Contains => {
            let haystack = arg(0)?.to_text()?.to_lowercase();
            haystack.contains(&arg(1)?.to_text()?.to_lowercase())
        }
        CoreFunction::StartsWith => {
            let text = arg(0)?.to_text()?.to_lowercase();
            text.starts_with(&arg(1)?.to_text()?.to_lowercase())
        }
        CoreFunction::EndsWith => {
            let text = arg(0)?.to_text()?.to_lowercase();
            text.ends_with(&arg(1)?.to_text()?.to_lowercase())
        }
        CoreFunction::In | CoreFunction::NotIn => {
            let needle = arg(0)?;
            let mut found = false;
            for node in &args[1..] {
                if needle.loose_eq(&node.evaluate(state, trace)?) {
                    found = true;
                    break;
                }
            }
            found == (function == CoreFunction::In)
        }
        CoreFunction::ContainsValue => {
            let needle = arg(1)?;
            match arg(0)? {
                Value::Object(object) => object.values()?.iter().any(|v| v.loose_eq(&needle)),
                _ => false,
            }
        }
    };

    Ok(result)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Boolean(b) => f.write_str(format_bool(*b)),
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl<F, N> fmt::Display for Node<F, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(literal) => write!(f, "{}", literal),
            Node::NamedValue { name, .. } => f.write_str(name),
            Node::Index { target, key } => write!(f, "{}[{}]", target, key),
            Node::Core { function, args } => write_call(f, function.name(), args),
            Node::Extension { name, args, .. } => write_call(f, name, args),
        }
    }
}

fn write_call<F, N>(f: &mut fmt::Formatter<'_>, name: &str, args: &[Node<F, N>]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", arg)?;
    }
    f.write_str(")")
}
