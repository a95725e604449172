//! Scheduler layer for the runner
//!
//! This layer watches a submitted job: it polls the TestSwarm server on a
//! fixed interval and classifies each status document until the job reaches a
//! verdict, the deadline passes or the build is cancelled.

pub mod poller;

pub use poller::{DEFAULT_GRACE_PERIOD, PollError, PollSchedule, VerdictEngine};
