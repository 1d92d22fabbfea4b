//! `${{name}}` macro expansion for step inputs and environment

use crate::core::variables::VariableLookup;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// Opening delimiter of a macro
pub const MACRO_PREFIX: &str = "${{";

/// Closing delimiter of a macro
pub const MACRO_SUFFIX: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("Macro delimiters must not be empty")]
    EmptyDelimiter,
}

/// Single-pass macro scanner
///
/// Substituted text is never rescanned. A macro that is unterminated, empty
/// or names an unknown variable is left in place as written.
#[derive(Debug, Clone)]
pub struct MacroExpander {
    prefix: String,
    suffix: String,
}

impl MacroExpander {
    /// Expander using the `${{` / `}}` delimiters
    pub fn new() -> Self {
        Self {
            prefix: MACRO_PREFIX.to_string(),
            suffix: MACRO_SUFFIX.to_string(),
        }
    }

    /// Expander using custom delimiters
    pub fn with_delimiters(prefix: &str, suffix: &str) -> Result<Self, MacroError> {
        if prefix.is_empty() || suffix.is_empty() {
            return Err(MacroError::EmptyDelimiter);
        }
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Expand every macro in `value`
    pub fn expand_str<L: VariableLookup + ?Sized>(&self, source: &L, value: &str) -> String {
        let mut result = value.to_string();
        let mut start_index = 0;
        // Width of the first prefix character, the step taken after a failed candidate
        let retry_step = self.prefix.chars().next().map_or(1, char::len_utf8);

        while start_index < result.len() {
            let Some(offset) = result[start_index..].find(&self.prefix) else {
                break;
            };
            let prefix_index = start_index + offset;
            let name_start = prefix_index + self.prefix.len();

            let Some(name_len) = result[name_start..].find(&self.suffix) else {
                trace!("Unterminated macro at {}", prefix_index);
                break;
            };
            let name_end = name_start + name_len;
            let name = &result[name_start..name_end];

            let resolved = if name.is_empty() {
                None
            } else {
                match source.try_get(name) {
                    Ok(Some(value)) => Some(value.unwrap_or_default().to_string()),
                    _ => None,
                }
            };

            match resolved {
                Some(value) => {
                    trace!("Macro found: '{}'", name);
                    let macro_end = name_end + self.suffix.len();
                    result.replace_range(prefix_index..macro_end, &value);
                    start_index = prefix_index + value.len();
                }
                None => {
                    trace!("Macro not resolved: '{}'", name);
                    start_index = prefix_index + retry_step;
                }
            }
        }

        result
    }

    /// Expand every value of `target` in place; keys are left unchanged
    pub fn expand_values<L: VariableLookup + ?Sized>(
        &self,
        source: &L,
        target: &mut HashMap<String, String>,
    ) {
        for value in target.values_mut() {
            *value = self.expand_str(source, value);
        }
    }

    /// Expand values that may be null, which come back as empty strings
    pub fn expand_nullable_values<L: VariableLookup + ?Sized>(
        &self,
        source: &L,
        target: &HashMap<String, Option<String>>,
    ) -> HashMap<String, String> {
        target
            .iter()
            .map(|(key, value)| {
                let value = value.as_deref().unwrap_or_default();
                (key.clone(), self.expand_str(source, value))
            })
            .collect()
    }
}

impl Default for MacroExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand `target` in place against `source` with the default delimiters
pub fn expand_values<L: VariableLookup + ?Sized>(source: &L, target: &mut HashMap<String, String>) {
    MacroExpander::new().expand_values(source, target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variables::{CaseSensitivity, VariableStore};

    fn store(pairs: &[(&str, &str)]) -> VariableStore {
        let mut vars = VariableStore::new(CaseSensitivity::Sensitive);
        for (k, v) in pairs {
            vars.set(k, *v).unwrap();
        }
        vars
    }

    fn expand(vars: &VariableStore, value: &str) -> String {
        MacroExpander::new().expand_str(vars, value)
    }

    #[test]
    fn test_no_macros_is_identity() {
        let vars = store(&[("A", "X")]);
        assert_eq!(expand(&vars, "plain text { } $ {{ }}"), "plain text { } $ {{ }}");
        assert_eq!(expand(&vars, ""), "");
    }

    #[test]
    fn test_simple_substitution() {
        let vars = store(&[("configuration", "Release")]);
        assert_eq!(
            expand(&vars, "dotnet build -c ${{configuration}}"),
            "dotnet build -c Release"
        );
    }

    #[test]
    fn test_adjacent_macros() {
        let vars = store(&[("A", "X")]);
        assert_eq!(expand(&vars, "${{A}}${{A}}"), "XX");
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let vars = store(&[("A", "${{A}}"), ("B", "${{C}}"), ("C", "nope")]);
        assert_eq!(expand(&vars, "${{A}}${{A}}"), "${{A}}${{A}}");
        assert_eq!(expand(&vars, "${{B}}"), "${{C}}");
    }

    #[test]
    fn test_unresolved_macro_left_verbatim() {
        let vars = store(&[]);
        assert_eq!(expand(&vars, "${{MISSING}}"), "${{MISSING}}");
    }

    #[test]
    fn test_unterminated_macro_left_verbatim() {
        let vars = store(&[("name", "x")]);
        assert_eq!(expand(&vars, "abc${{name"), "abc${{name");
    }

    #[test]
    fn test_empty_macro_left_verbatim() {
        let vars = store(&[("A", "X")]);
        assert_eq!(expand(&vars, "${{}}"), "${{}}");
        assert_eq!(expand(&vars, "${{}}${{A}}"), "${{}}X");
    }

    #[test]
    fn test_empty_value_substitutes() {
        let mut vars = store(&[("blank", "")]);
        vars.set_null("nothing").unwrap();
        assert_eq!(expand(&vars, "[${{blank}}][${{nothing}}]"), "[][]");
    }

    #[test]
    fn test_retry_after_failed_candidate() {
        // The first candidate name is "${{A" which is unknown; scanning resumes one
        // character later and finds the inner macro.
        let vars = store(&[("A", "X")]);
        assert_eq!(expand(&vars, "${{${{A}}"), "${{X");
    }

    #[test]
    fn test_first_suffix_closes_name() {
        let vars = store(&[("A", "X")]);
        assert_eq!(expand(&vars, "${{A}}}}"), "X}}");
        assert_eq!(expand(&vars, "${{A}} and ${{B}} and ${{A}}"), "X and ${{B}} and X");
    }

    #[test]
    fn test_case_policy_applies() {
        let mut sensitive = VariableStore::new(CaseSensitivity::Sensitive);
        sensitive.set("Name", "v").unwrap();
        assert_eq!(expand(&sensitive, "${{name}}"), "${{name}}");

        let mut insensitive = VariableStore::new(CaseSensitivity::Insensitive);
        insensitive.set("Name", "v").unwrap();
        assert_eq!(expand(&insensitive, "${{name}}"), "v");
    }

    #[test]
    fn test_expand_values_in_place() {
        let vars = store(&[("A", "1")]);
        let mut target = HashMap::new();
        target.insert("first".to_string(), "${{A}}".to_string());
        target.insert("second".to_string(), "none".to_string());

        expand_values(&vars, &mut target);

        assert_eq!(target["first"], "1");
        assert_eq!(target["second"], "none");
        // Source is untouched
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_expand_nullable_values() {
        let vars = store(&[("A", "1")]);
        let mut target = HashMap::new();
        target.insert("set".to_string(), Some("${{A}}".to_string()));
        target.insert("unset".to_string(), None);

        let expanded = MacroExpander::new().expand_nullable_values(&vars, &target);

        assert_eq!(expanded["set"], "1");
        assert_eq!(expanded["unset"], "");
    }

    #[test]
    fn test_custom_delimiters() {
        let vars = store(&[("A", "X")]);
        let expander = MacroExpander::with_delimiters("$(", ")").unwrap();
        assert_eq!(expander.expand_str(&vars, "a $(A) b $(B)"), "a X b $(B)");
        assert_eq!(
            MacroExpander::with_delimiters("", ")").unwrap_err(),
            MacroError::EmptyDelimiter
        );
    }

    #[test]
    fn test_non_ascii_text_around_macros() {
        let vars = store(&[("A", "ü")]);
        assert_eq!(expand(&vars, "é${{A}}é${{B}}é"), "éüé${{B}}é");
    }
}
