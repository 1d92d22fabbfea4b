//! Job variable store and lookup policy

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by direct variable access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    #[error("Variable name must not be empty")]
    EmptyName,
}

/// How variable names are compared
///
/// Chosen once per run. The same policy must back both the macro expansion
/// snapshot and the `variables` value seen by conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    /// Names must match exactly
    Sensitive,
    /// Names match regardless of case
    Insensitive,
}

impl CaseSensitivity {
    /// Policy matching the native environment of the target platform
    pub fn platform() -> Self {
        if cfg!(windows) {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        }
    }

    /// Key under which `name` is stored
    pub fn key(self, name: &str) -> String {
        match self {
            CaseSensitivity::Sensitive => name.to_string(),
            CaseSensitivity::Insensitive => name.to_lowercase(),
        }
    }
}

impl Default for CaseSensitivity {
    fn default() -> Self {
        Self::platform()
    }
}

/// Uniform read access to a set of variables
///
/// `Ok(None)` means the variable is not defined, `Ok(Some(None))` means it
/// is defined with a null value.
pub trait VariableLookup {
    fn try_get(&self, name: &str) -> Result<Option<Option<&str>>, VariableError>;
}

#[derive(Debug, Clone)]
struct VariableEntry {
    /// Name as it was last written
    name: String,
    value: Option<String>,
    secret: bool,
}

/// Variables of a single job
///
/// Owned by the execution context. Writes must not interleave with
/// evaluation or expansion reads of the same job.
#[derive(Debug, Clone)]
pub struct VariableStore {
    policy: CaseSensitivity,
    entries: HashMap<String, VariableEntry>,
}

impl VariableStore {
    /// Create an empty store with the given comparison policy
    pub fn new(policy: CaseSensitivity) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    /// Create an empty store using the platform policy
    pub fn with_platform_policy() -> Self {
        Self::new(CaseSensitivity::platform())
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.policy
    }

    /// Set a variable, replacing any entry whose name matches under the policy
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), VariableError> {
        self.insert(name, Some(value.into()), false)
    }

    /// Define a variable with a null value
    pub fn set_null(&mut self, name: &str) -> Result<(), VariableError> {
        self.insert(name, None, false)
    }

    /// Set a variable whose value must never appear in diagnostics
    pub fn set_secret(&mut self, name: &str, value: impl Into<String>) -> Result<(), VariableError> {
        self.insert(name, Some(value.into()), true)
    }

    fn insert(&mut self, name: &str, value: Option<String>, secret: bool) -> Result<(), VariableError> {
        if name.is_empty() {
            return Err(VariableError::EmptyName);
        }

        // A secret stays secret even when overwritten with a plain set
        let secret = secret
            || self
                .entries
                .get(&self.policy.key(name))
                .is_some_and(|e| e.secret);

        self.entries.insert(
            self.policy.key(name),
            VariableEntry {
                name: name.to_string(),
                value,
                secret,
            },
        );
        Ok(())
    }

    /// Remove a variable, returning whether it existed
    pub fn remove(&mut self, name: &str) -> Result<bool, VariableError> {
        if name.is_empty() {
            return Err(VariableError::EmptyName);
        }
        Ok(self.entries.remove(&self.policy.key(name)).is_some())
    }

    /// Check whether a variable is defined
    pub fn contains(&self, name: &str) -> Result<bool, VariableError> {
        Ok(self.try_get(name)?.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all variables as `(name, value)`
    ///
    /// Only the owner of the store may enumerate it. Conditions see the store
    /// through a view that refuses enumeration.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .values()
            .map(|e| (e.name.as_str(), e.value.as_deref()))
    }

    /// Non-empty values of secret variables
    pub fn secret_values(&self) -> Vec<&str> {
        self.entries
            .values()
            .filter(|e| e.secret)
            .filter_map(|e| e.value.as_deref())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Apply `key=value` overrides on top of the current values
    pub fn merge_overrides<I, K, V>(&mut self, overrides: I) -> Result<(), VariableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::with_platform_policy()
    }
}

impl VariableLookup for VariableStore {
    fn try_get(&self, name: &str) -> Result<Option<Option<&str>>, VariableError> {
        if name.is_empty() {
            return Err(VariableError::EmptyName);
        }
        Ok(self
            .entries
            .get(&self.policy.key(name))
            .map(|e| e.value.as_deref()))
    }
}

impl VariableLookup for HashMap<String, String> {
    fn try_get(&self, name: &str) -> Result<Option<Option<&str>>, VariableError> {
        if name.is_empty() {
            return Err(VariableError::EmptyName);
        }
        Ok(self.get(name).map(|v| Some(v.as_str())))
    }
}
