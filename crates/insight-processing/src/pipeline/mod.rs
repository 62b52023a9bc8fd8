//! Ordered, all-or-nothing application of transform requests.

mod executor;
mod operation;

pub use executor::{PipelineExecutor, PipelineOutcome, StepRecord};
pub use operation::Operation;
