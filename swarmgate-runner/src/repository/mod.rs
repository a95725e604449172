//! Repository layer
//!
//! Repositories abstract communication with the TestSwarm server behind a
//! trait so the services above them can run against a scripted server in
//! tests.

mod swarm;

pub use swarm::{HttpSwarmRepository, SwarmRepository};
