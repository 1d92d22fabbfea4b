//! Scenario-based tests driving whole jobs through the runner

mod helpers;

mod condition_errors;
mod macro_expansion;
mod status_conditions;
mod variable_conditions;
