//! The `variables` named value

use crate::core::variables::{VariableLookup, VariableStore};
use crate::expressions::{EvaluationError, ReadOnlyObject, Value};
use std::fmt;

/// Read-only view of a job's variables for use inside expressions
///
/// Supports lookup and containment only. Enumeration is refused so that an
/// expression cannot walk the whole variable set.
#[derive(Clone, Copy)]
pub struct VariablesView<'a> {
    store: &'a VariableStore,
}

impl<'a> VariablesView<'a> {
    pub fn new(store: &'a VariableStore) -> Self {
        Self { store }
    }

    /// Value of `name`; `None` when undefined, null or `name` is empty
    pub fn get(&self, name: &str) -> Option<&'a str> {
        match self.store.try_get(name) {
            Ok(Some(value)) => value,
            _ => None,
        }
    }

    /// Whether `name` is defined, null values included
    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name).unwrap_or(false)
    }
}

impl fmt::Debug for VariablesView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariablesView")
            .field("len", &self.store.len())
            .finish()
    }
}

impl ReadOnlyObject for VariablesView<'_> {
    fn index(&self, key: &str) -> Value<'_> {
        match self.get(key) {
            Some(value) => Value::String(value.to_string()),
            None => Value::Null,
        }
    }

    fn values(&self) -> Result<Vec<Value<'_>>, EvaluationError> {
        Err(EvaluationError::Unsupported(
            "enumerating 'variables' is not allowed".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variables::CaseSensitivity;

    fn store() -> VariableStore {
        let mut vars = VariableStore::new(CaseSensitivity::Insensitive);
        vars.set("Agent.OS", "Linux").unwrap();
        vars.set_null("unset").unwrap();
        vars
    }

    #[test]
    fn test_index_lookup() {
        let vars = store();
        let view = VariablesView::new(&vars);

        assert!(matches!(view.index("agent.os"), Value::String(ref s) if s == "Linux"));
        assert!(matches!(view.index("missing"), Value::Null));
        assert!(matches!(view.index("unset"), Value::Null));
        assert!(matches!(view.index(""), Value::Null));
    }

    #[test]
    fn test_contains() {
        let vars = store();
        let view = VariablesView::new(&vars);

        assert!(view.contains("AGENT.OS"));
        assert!(view.contains("unset"));
        assert!(!view.contains("missing"));
        assert!(!view.contains(""));
    }

    #[test]
    fn test_enumeration_is_refused() {
        let vars = store();
        let view = VariablesView::new(&vars);

        let err = view.values().unwrap_err();
        assert!(matches!(err, EvaluationError::Unsupported(_)));
    }

    #[test]
    fn test_debug_does_not_print_values() {
        let mut vars = store();
        vars.set_secret("token", "hunter2").unwrap();
        let view = VariablesView::new(&vars);

        assert!(!format!("{:?}", view).contains("hunter2"));
    }
}
