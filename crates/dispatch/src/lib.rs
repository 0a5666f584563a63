#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod expand;
pub mod output;
pub mod queue;
pub mod report;
pub mod target;

pub use dispatcher::{Dispatcher, ScanOptions};
pub use engine::{CpeHint, EngineOutput, EngineStatus, OscapEngine, ScanEngine, ScanMode};
pub use error::Error;
pub use expand::expand_targets;
pub use output::{OutputSummary, write_results};
pub use queue::WorkQueue;
pub use report::{Failure, ScanOutcome, ScanReport};
pub use target::Target;
