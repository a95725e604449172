//! Service layer
//!
//! Services contain the business logic of one execution. They build on the
//! repository layer and the scheduler:
//! - Submission: turns the resolved configuration into a job request
//! - Report: persists the TAP report into the build workspace
//! - Orchestrator: sequences validation, submission, polling and reporting

mod orchestrator;
mod report;
mod submission;

pub use orchestrator::Orchestrator;
pub use report::ReportWriter;
pub use submission::{JobSubmitter, ResolvedJob};
