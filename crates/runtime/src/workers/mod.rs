//! Worker tasks that back the pilot runtime.
//!
//! The planner worker runs population searches off the tick thread; metrics
//! are shared with the session through an `Arc`.

mod metrics;
mod planner;

pub use metrics::{MetricsSnapshot, PlannerMetrics};
pub use planner::{PlanFailure, PlanJob, PlanResponse, PlannerWorker};
