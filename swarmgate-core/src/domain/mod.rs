//! Core domain types
//!
//! This module contains the structures the runner reasons about: the validated
//! job configuration, the handle of a submitted job, the verdict state machine
//! and the test report produced at the end of an execution.

pub mod config;
pub mod job;
pub mod report;
pub mod verdict;
