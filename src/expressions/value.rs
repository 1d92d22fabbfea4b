//! Runtime values and their coercion rules

use crate::expressions::EvaluationError;
use std::cmp::Ordering;
use std::fmt;

/// A structured value exposed to expressions through index access
pub trait ReadOnlyObject: fmt::Debug {
    /// Member named `key`, or `Null` when there is none
    fn index(&self, key: &str) -> Value<'_>;

    /// Every member value
    fn values(&self) -> Result<Vec<Value<'_>>, EvaluationError>;
}

/// Result of evaluating a node
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Object(&'a dyn ReadOnlyObject),
}

impl<'a> Value<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Object(_) => "Object",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Numeric form; NaN when the value has none
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return 0.0;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => n,
                    _ => f64::NAN,
                }
            }
            Value::Object(_) => f64::NAN,
        }
    }

    /// String form used by string comparisons and functions
    pub fn to_text(&self) -> Result<String, EvaluationError> {
        match self {
            Value::Null => Ok(String::new()),
            Value::Boolean(b) => Ok(format_bool(*b).to_string()),
            Value::Number(n) => Ok(format_number(*n)),
            Value::String(s) => Ok(s.clone()),
            Value::Object(_) => Err(EvaluationError::InvalidConversion {
                from: "Object",
                to: "String",
            }),
        }
    }

    /// Equality with the right operand converted to this value's type
    pub fn loose_eq(&self, right: &Value<'_>) -> bool {
        match (self, right) {
            (Value::Null, right) => matches!(right, Value::Null),
            (Value::Boolean(b), right) => *b == right.is_truthy(),
            (Value::Number(n), right) => *n == right.to_number(),
            (Value::String(_), Value::Object(_)) => false,
            (Value::String(s), right) => match right.to_text() {
                Ok(text) => s.to_lowercase() == text.to_lowercase(),
                Err(_) => false,
            },
            (Value::Object(a), Value::Object(b)) => same_object(*a, *b),
            (Value::Object(_), _) => false,
        }
    }

    /// Ordering with the right operand converted to this value's type
    ///
    /// `None` when the numbers involved are not comparable (NaN).
    pub fn compare(&self, right: &Value<'_>) -> Result<Option<Ordering>, EvaluationError> {
        if matches!(self, Value::Object(_)) || matches!(right, Value::Object(_)) {
            return Err(EvaluationError::InvalidComparison {
                left: self.kind_name(),
                right: right.kind_name(),
            });
        }

        let ordering = match self {
            Value::Boolean(b) => Some(b.cmp(&right.is_truthy())),
            Value::String(s) => Some(s.to_lowercase().cmp(&right.to_text()?.to_lowercase())),
            _ => self.to_number().partial_cmp(&right.to_number()),
        };
        Ok(ordering)
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(format_bool(*b)),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Object(_) => f.write_str("Object"),
        }
    }
}

pub(crate) fn format_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn same_object(a: &dyn ReadOnlyObject, b: &dyn ReadOnlyObject) -> bool {
    std::ptr::eq(
        a as *const dyn ReadOnlyObject as *const (),
        b as *const dyn ReadOnlyObject as *const (),
    )
}
