//! Background workers for the analytics service.
//!
//! - Sweep (reclaim expired entries from backends that do not expire keys themselves)
//! - Metrics report (periodic log line with the process metrics snapshot)

pub mod report;
pub mod retention;
pub mod scheduler;

pub use report::MetricsReporter;
pub use retention::SweepWorker;
pub use scheduler::*;
