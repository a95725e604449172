//! Swarmgate Core
//!
//! Core types and pure decision logic for driving TestSwarm jobs from CI.
//!
//! This crate contains:
//! - Domain types: job configuration, job handles, verdicts and reports
//! - DTOs: wire shapes of the TestSwarm `addjob` and `job` API calls
//!
//! Nothing in here performs I/O; the client and runner crates do.

pub mod domain;
pub mod dto;
