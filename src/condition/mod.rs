//! Step conditions
//!
//! A condition is an expression over the built-in status functions
//! (`always()`, `canceled()`, `failed()`, `succeeded()`,
//! `succeededOrFailed()`) and the `variables` named value. An empty condition
//! means `succeeded()`.

pub mod builtins;
pub mod trace;
pub mod variables;

pub use builtins::ConditionFunction;
pub use trace::{ConditionTraceWriter, DiagnosticLevel, DiagnosticSink, MemorySink, SecretMasker};
pub use variables::VariablesView;

use crate::core::status::JobStatus;
use crate::core::variables::VariableStore;
use crate::expressions::{
    self, EvaluationError, EvaluationState, Node, ParseError, Value, Vocabulary,
};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Named values available to conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionValue {
    Variables,
}

/// Parsed condition tree
pub type ConditionNode = Node<ConditionFunction, ConditionValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Grammar vocabulary for conditions
pub fn vocabulary() -> &'static Vocabulary<ConditionFunction, ConditionValue> {
    static VOCABULARY: OnceLock<Vocabulary<ConditionFunction, ConditionValue>> = OnceLock::new();
    VOCABULARY.get_or_init(|| {
        ConditionFunction::ALL
            .iter()
            .fold(Vocabulary::new(), |vocabulary, function| {
                vocabulary.with_function(function.name(), 0, 0, *function)
            })
            .with_named_value("variables", ConditionValue::Variables)
    })
}

fn builtin_node(function: ConditionFunction) -> ConditionNode {
    Node::Extension {
        name: function.name().to_string(),
        function,
        args: Vec::new(),
    }
}

/// Shared `always()` tree
pub fn always() -> &'static ConditionNode {
    static ALWAYS: OnceLock<ConditionNode> = OnceLock::new();
    ALWAYS.get_or_init(|| builtin_node(ConditionFunction::Always))
}

/// Shared `succeeded()` tree, the default condition
pub fn succeeded() -> &'static ConditionNode {
    static SUCCEEDED: OnceLock<ConditionNode> = OnceLock::new();
    SUCCEEDED.get_or_init(|| builtin_node(ConditionFunction::Succeeded))
}

/// Parse condition text; empty text yields `succeeded()`
pub fn parse_condition(condition: &str) -> Result<ConditionNode, ConditionError> {
    match expressions::parse(condition, vocabulary())? {
        Some(node) => Ok(node),
        None => {
            debug!("Empty condition, defaulting to succeeded()");
            Ok(succeeded().clone())
        }
    }
}

/// State a condition is evaluated against
struct ConditionState<'a> {
    status: JobStatus,
    variables: VariablesView<'a>,
}

impl EvaluationState<ConditionFunction, ConditionValue> for ConditionState<'_> {
    fn call(&self, function: &ConditionFunction, _args: &[Value<'_>]) -> Result<Value<'_>, EvaluationError> {
        Ok(Value::Boolean(function.evaluate(self.status)))
    }

    fn named_value(&self, value: &ConditionValue) -> Value<'_> {
        match value {
            ConditionValue::Variables => Value::Object(&self.variables),
        }
    }
}

/// Evaluates conditions, optionally echoing diagnostics to a user-facing sink
#[derive(Clone, Copy, Default)]
pub struct ConditionEvaluator<'a> {
    sink: Option<&'a dyn DiagnosticSink>,
    host_tracing_only: bool,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Keep diagnostics in the host trace only
    pub fn host_tracing_only(mut self, host_tracing_only: bool) -> Self {
        self.host_tracing_only = host_tracing_only;
        self
    }

    /// Evaluate a parsed condition
    pub fn evaluate(
        &self,
        tree: &ConditionNode,
        status: JobStatus,
        variables: &VariableStore,
    ) -> Result<bool, ConditionError> {
        let state = ConditionState {
            status,
            variables: VariablesView::new(variables),
        };
        let trace = ConditionTraceWriter::new(
            self.sink,
            self.host_tracing_only,
            SecretMasker::from_store(variables),
        );
        Ok(tree.evaluate_boolean(&state, &trace)?)
    }

    /// Parse and evaluate condition text
    pub fn should_run(
        &self,
        condition: &str,
        status: JobStatus,
        variables: &VariableStore,
    ) -> Result<bool, ConditionError> {
        let tree = parse_condition(condition)?;
        self.evaluate(&tree, status, variables)
    }
}

/// Decide whether a step with `condition` runs, without diagnostics echo
pub fn should_run(condition: &str, status: JobStatus, variables: &VariableStore) -> Result<bool, ConditionError> {
    ConditionEvaluator::new().should_run(condition, status, variables)
}
