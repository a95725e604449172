//! Data Transfer Objects for the TestSwarm API
//!
//! These are the request and response shapes exchanged with the service.
//! Responses are decoded into explicit structures so that a malformed document
//! fails at decode time instead of deep inside the verdict logic.

pub mod job;
