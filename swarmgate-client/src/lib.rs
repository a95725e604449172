//! Swarmgate HTTP Client
//!
//! A small, type-safe HTTP client for the TestSwarm job API.
//!
//! Only the two calls a CI run needs are covered: submitting a job and
//! fetching its status document. Responses are decoded eagerly into the DTOs
//! of `swarmgate-core`.
//!
//! # Example
//!
//! ```no_run
//! use swarmgate_client::SwarmClient;
//! use swarmgate_core::dto::job::{AddJobRequest, RunSpec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SwarmClient::new("http://swarm.example.org");
//!
//!     let submitted = client.add_job(&AddJobRequest {
//!         auth_id: "ci".to_string(),
//!         auth_token: "secret".to_string(),
//!         job_name: "nightly".to_string(),
//!         run_max: 2,
//!         browser_set: "popular".to_string(),
//!         runs: vec![RunSpec {
//!             name: "core".to_string(),
//!             url: "http://ci.example.org/test/core.html".to_string(),
//!         }],
//!     }).await?;
//!
//!     let status = client.get_job_status(&submitted.handle).await?;
//!     println!("{} run(s)", status.job.runs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobs::{SubmittedJob, parse_add_job, parse_job_status};

use reqwest::Client;

/// HTTP client for the TestSwarm API
#[derive(Debug, Clone)]
pub struct SwarmClient {
    /// Base URL of the server (e.g., "http://swarm.example.org")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SwarmClient {
    /// Create a new TestSwarm client
    ///
    /// # Arguments
    /// * `base_url` - The server base URL; a trailing slash is ignored
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new TestSwarm client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the status code and return the response body
    ///
    /// TestSwarm reports most errors in the body, so the text is handed back
    /// for decoding rather than deserialized here.
    async fn handle_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }
}
