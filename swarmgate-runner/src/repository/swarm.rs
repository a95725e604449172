//! TestSwarm repository
//!
//! Handles communication with the TestSwarm server:
//! - Submitting jobs
//! - Fetching job status documents

use async_trait::async_trait;
use swarmgate_client::{ClientError, SubmittedJob, SwarmClient};
use swarmgate_core::domain::job::JobHandle;
use swarmgate_core::dto::job::{AddJobRequest, JobStatusDocument};

/// Repository trait for job operations against the TestSwarm server
#[async_trait]
pub trait SwarmRepository: Send + Sync {
    /// Submits a job
    ///
    /// # Arguments
    /// * `request` - The fully resolved job request
    async fn add_job(&self, request: &AddJobRequest) -> Result<SubmittedJob, ClientError>;

    /// Fetches the current status document of a job
    ///
    /// # Arguments
    /// * `handle` - The handle returned on submission
    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatusDocument, ClientError>;
}

/// HTTP implementation of SwarmRepository
pub struct HttpSwarmRepository {
    client: SwarmClient,
}

impl HttpSwarmRepository {
    /// Creates a new HTTP repository
    ///
    /// # Arguments
    /// * `server_url` - Resolved base URL of the TestSwarm server
    pub fn new(server_url: &str) -> Self {
        Self {
            client: SwarmClient::new(server_url),
        }
    }
}

#[async_trait]
impl SwarmRepository for HttpSwarmRepository {
    async fn add_job(&self, request: &AddJobRequest) -> Result<SubmittedJob, ClientError> {
        self.client.add_job(request).await
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatusDocument, ClientError> {
        self.client.get_job_status(handle).await
    }
}
