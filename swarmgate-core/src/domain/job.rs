//! Job domain types

/// Handle of a job accepted by the TestSwarm server
///
/// Created once after submission and read-only for the rest of the execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: u64,
    /// JSON status endpoint polled by the verdict engine
    pub status_url: String,
    /// Human-facing job page
    pub friendly_url: String,
}

impl JobHandle {
    /// Derives both job URLs from the server base URL
    pub fn new(server_url: &str, id: u64) -> Self {
        let base = server_url.trim_end_matches('/');
        Self {
            id,
            status_url: format!("{}/api.php?format=json&action=job&item={}", base, id),
            friendly_url: format!("{}/job/{}", base, id),
        }
    }
}
