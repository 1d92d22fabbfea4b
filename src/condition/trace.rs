//! Diagnostics emitted while evaluating conditions

use crate::core::variables::VariableStore;
use crate::expressions::TraceWriter;
use std::sync::Mutex;
use tracing::{debug, info};

/// User-facing destination for evaluation diagnostics
pub trait DiagnosticSink {
    fn info(&self, message: &str);
    fn verbose(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Verbose,
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(DiagnosticLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines recorded so far
    pub fn lines(&self) -> Vec<(DiagnosticLevel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, level: DiagnosticLevel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}

impl DiagnosticSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(DiagnosticLevel::Info, message);
    }

    fn verbose(&self, message: &str) {
        self.push(DiagnosticLevel::Verbose, message);
    }
}

/// Replaces secret values with `***`
#[derive(Debug, Clone, Default)]
pub struct SecretMasker {
    /// Longest first, so a secret containing another is masked whole
    secrets: Vec<String>,
}

impl SecretMasker {
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Literals are traced with quotes doubled, so mask that form too
        let mut secrets: Vec<String> = secrets
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .flat_map(|s| {
                let escaped = s.contains('\'').then(|| s.replace('\'', "''"));
                std::iter::once(s).chain(escaped)
            })
            .collect();
        secrets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        secrets.dedup();
        Self { secrets }
    }

    pub fn from_store(variables: &VariableStore) -> Self {
        Self::new(variables.secret_values())
    }

    pub fn mask(&self, text: &str) -> String {
        let mut masked = text.to_string();
        for secret in &self.secrets {
            masked = masked.replace(secret.as_str(), "***");
        }
        masked
    }
}

/// Trace writer for one condition evaluation
///
/// Every line goes to `tracing` for operators. Lines are echoed to the
/// user-facing sink unless `host_tracing_only` is set.
pub struct ConditionTraceWriter<'a> {
    sink: Option<&'a dyn DiagnosticSink>,
    host_tracing_only: bool,
    masker: SecretMasker,
}

impl<'a> ConditionTraceWriter<'a> {
    pub fn new(sink: Option<&'a dyn DiagnosticSink>, host_tracing_only: bool, masker: SecretMasker) -> Self {
        Self {
            sink,
            host_tracing_only,
            masker,
        }
    }

    fn user_sink(&self) -> Option<&'a dyn DiagnosticSink> {
        if self.host_tracing_only {
            None
        } else {
            self.sink
        }
    }
}

impl TraceWriter for ConditionTraceWriter<'_> {
    fn info(&self, message: &str) {
        let message = self.masker.mask(message);
        info!("{}", message);
        if let Some(sink) = self.user_sink() {
            sink.info(&message);
        }
    }

    fn verbose(&self, message: &str) {
        let message = self.masker.mask(message);
        debug!("{}", message);
        if let Some(sink) = self.user_sink() {
            sink.verbose(&message);
        }
    }
}
