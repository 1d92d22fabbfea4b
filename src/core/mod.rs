//! Core domain models
//!
//! Jobs, steps, variables and the status they run under.

pub mod config;
pub mod context;
pub mod job;
pub mod macros;
pub mod status;
pub mod step;
pub mod variables;

pub use context::*;
pub use job::*;
pub use macros::*;
pub use status::*;
pub use step::*;
pub use variables::*;
