//! Job-related API endpoints

use swarmgate_core::domain::job::JobHandle;
use swarmgate_core::dto::job::{
    AddJobRequest, AddJobResponse, JobStatusDocument, ServiceErrorEnvelope,
};
use tracing::debug;

use crate::SwarmClient;
use crate::error::{ClientError, Result};

/// A job accepted by the server
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub handle: JobHandle,
    /// Raw response body, echoed to the build console
    pub response: String,
}

impl SwarmClient {
    /// Submit a new job
    ///
    /// Posts the request form-encoded to `api.php?action=addjob`.
    ///
    /// # Returns
    /// The handle of the created job
    pub async fn add_job(&self, req: &AddJobRequest) -> Result<SubmittedJob> {
        let url = format!("{}/api.php?action=addjob", self.base_url);
        debug!("Submitting job '{}' with {} run(s)", req.job_name, req.runs.len());

        let response = self
            .client
            .post(&url)
            .form(&req.form_fields())
            .send()
            .await?;

        let body = self.handle_response(response).await?;
        let handle = parse_add_job(&self.base_url, &body)?;

        Ok(SubmittedJob {
            handle,
            response: body,
        })
    }

    /// Fetch the current status document of a job
    pub async fn get_job_status(&self, handle: &JobHandle) -> Result<JobStatusDocument> {
        debug!("Fetching status of job {}", handle.id);

        let response = self.client.get(&handle.status_url).send().await?;
        let body = self.handle_response(response).await?;

        parse_job_status(&body)
    }
}

/// Decode an `addjob` response body into a job handle
pub fn parse_add_job(base_url: &str, body: &str) -> Result<JobHandle> {
    if body.trim().is_empty() {
        return Err(ClientError::EmptyResponse("job submission"));
    }

    let response: AddJobResponse = serde_json::from_str(body).map_err(|e| {
        ClientError::ParseError(format!("Failed to parse job submission response: {}", e))
    })?;

    if let Some(error) = response.error {
        return Err(ClientError::ServiceError {
            code: error.code,
            info: error.info,
        });
    }

    let id = response
        .addjob
        .and_then(|result| result.id)
        .ok_or_else(|| ClientError::MissingJobId(body.trim().to_string()))?;

    Ok(JobHandle::new(base_url, id))
}

/// Decode a job status response body
pub fn parse_job_status(body: &str) -> Result<JobStatusDocument> {
    if body.trim().is_empty() {
        return Err(ClientError::EmptyResponse("job status query"));
    }

    if let Ok(envelope) = serde_json::from_str::<ServiceErrorEnvelope>(body) {
        return Err(ClientError::ServiceError {
            code: envelope.error.code,
            info: envelope.error.info,
        });
    }

    serde_json::from_str(body)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse job status: {}", e)))
}
