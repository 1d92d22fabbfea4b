//! Job runner - walks a job's steps, deciding from each condition whether it runs

use crate::{
    condition::{ConditionEvaluator, DiagnosticSink},
    core::{ExecutionContext, Job, JobStatus, StepOutcome},
    execution::{StepExecutor, StepHandler},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Events that can occur during a job run
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    JobStarted {
        job_name: String,
    },
    ConditionEvaluated {
        step_id: String,
        condition: String,
        result: bool,
    },
    StepSkipped {
        step_id: String,
    },
    StepStarted {
        step_id: String,
        display_name: String,
    },
    StepFinished {
        step_id: String,
        outcome: StepOutcome,
    },
    StepErrored {
        step_id: String,
        error: String,
    },
    JobFinished {
        job_name: String,
        status: JobStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(JobEvent) + Send + Sync>;

/// What happened to one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step_id: String,
    pub outcome: StepOutcome,
    pub error: Option<String>,
}

/// Result of a job run
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_name: String,
    pub steps: Vec<StepRecord>,

    /// Final status, variables and environment
    pub context: ExecutionContext,
}

impl JobReport {
    pub fn status(&self) -> JobStatus {
        self.context.status
    }

    pub fn step(&self, id: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step_id == id)
    }
}

/// Requests cancellation of a running job from anywhere
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs the steps of a job in order
pub struct JobRunner<H> {
    executor: StepExecutor<H>,
    event_handlers: Mutex<Vec<EventHandler>>,
    diagnostics: Option<Arc<dyn DiagnosticSink + Send + Sync>>,
    host_tracing_only: bool,
    cancel: CancelHandle,
}

impl<H: StepHandler> JobRunner<H> {
    pub fn new(handler: H) -> Self {
        Self {
            executor: StepExecutor::new(handler),
            event_handlers: Mutex::new(Vec::new()),
            diagnostics: None,
            host_tracing_only: false,
            cancel: CancelHandle::default(),
        }
    }

    /// Echo condition diagnostics to `sink`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink + Send + Sync>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Keep condition diagnostics in the host trace only
    pub fn host_tracing_only(mut self, host_tracing_only: bool) -> Self {
        self.host_tracing_only = host_tracing_only;
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(JobEvent) + Send + Sync + 'static,
    {
        self.event_handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: JobEvent) {
        let handlers = self
            .event_handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Cancel the job; steps not yet considered see a canceled status
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle that cancels this runner's job, usable from step handlers
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run every step of `job` against a fresh context
    pub fn run(&self, job: &Job) -> JobReport {
        self.run_with_context(job, job.create_context())
    }

    /// Run every step of `job` against `context`
    pub fn run_with_context(&self, job: &Job, mut context: ExecutionContext) -> JobReport {
        info!("Starting job: {}", job.name);
        self.emit_event(JobEvent::JobStarted {
            job_name: job.name.clone(),
        });

        let mut evaluator = ConditionEvaluator::new().host_tracing_only(self.host_tracing_only);
        if let Some(sink) = &self.diagnostics {
            evaluator = evaluator.with_sink(sink.as_ref());
        }

        let mut records = Vec::with_capacity(job.steps.len());
        for step in &job.steps {
            if self.cancel.is_canceled() && context.status != JobStatus::Canceled {
                warn!("Job {} canceled", job.name);
                context.cancel();
            }

            let decision = step
                .parse_condition()
                .and_then(|tree| {
                    let result = evaluator.evaluate(&tree, context.status, &context.variables)?;
                    Ok((tree, result))
                });

            let (tree, should_run) = match decision {
                Ok(decision) => decision,
                Err(e) => {
                    error!("Condition for step {} could not be evaluated: {}", step.id, e);
                    let error = e.to_string();
                    context.record_outcome(StepOutcome::Failed);
                    self.emit_event(JobEvent::StepErrored {
                        step_id: step.id.clone(),
                        error: error.clone(),
                    });
                    records.push(StepRecord {
                        step_id: step.id.clone(),
                        outcome: StepOutcome::Failed,
                        error: Some(error),
                    });
                    continue;
                }
            };

            self.emit_event(JobEvent::ConditionEvaluated {
                step_id: step.id.clone(),
                condition: tree.to_string(),
                result: should_run,
            });

            if !should_run {
                info!("Skipping step {}: condition {} is false", step.id, tree);
                self.emit_event(JobEvent::StepSkipped {
                    step_id: step.id.clone(),
                });
                records.push(StepRecord {
                    step_id: step.id.clone(),
                    outcome: StepOutcome::Skipped,
                    error: None,
                });
                continue;
            }

            self.emit_event(JobEvent::StepStarted {
                step_id: step.id.clone(),
                display_name: step.display_name.clone(),
            });

            let result = self.executor.execute(step, &mut context);
            context.record_outcome(result.outcome);

            if let Some(error) = &result.error {
                self.emit_event(JobEvent::StepErrored {
                    step_id: step.id.clone(),
                    error: error.clone(),
                });
            }
            self.emit_event(JobEvent::StepFinished {
                step_id: step.id.clone(),
                outcome: result.outcome,
            });
            records.push(StepRecord {
                step_id: step.id.clone(),
                outcome: result.outcome,
                error: result.error,
            });
        }

        if self.cancel.is_canceled() {
            context.cancel();
        }

        info!("Job finished: {} - {}", job.name, context.status);
        self.emit_event(JobEvent::JobFinished {
            job_name: job.name.clone(),
            status: context.status,
        });

        JobReport {
            job_name: job.name.clone(),
            steps: records,
            context,
        }
    }
}
