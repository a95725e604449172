//! Submission service
//!
//! Builds the `addjob` request from the validated configuration and its
//! resolved values, and submits it.

use std::sync::Arc;
use swarmgate_client::{ClientError, SubmittedJob};
use swarmgate_core::domain::config::{JobConfig, TestSuite};
use swarmgate_core::dto::job::{AddJobRequest, RunSpec};
use tracing::info;

use crate::repository::SwarmRepository;
use crate::variables::VariableResolver;

/// Configuration values after variable resolution
///
/// Produced from a [`JobConfig`] without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedJob {
    pub server_url: String,
    pub job_name: String,
    pub suites: Vec<TestSuite>,
}

impl ResolvedJob {
    pub fn resolve(config: &JobConfig, resolver: &VariableResolver) -> Self {
        Self {
            server_url: resolver
                .resolve(&config.server_url)
                .trim_end_matches('/')
                .to_string(),
            job_name: resolver.resolve(&config.job_name),
            suites: resolver.resolve_suites(&config.test_suites),
        }
    }

    pub fn disabled_suites(&self) -> impl Iterator<Item = &TestSuite> {
        self.suites.iter().filter(|suite| suite.disabled)
    }
}

/// Builds the job request
///
/// Disabled suites are left out; cache-busted suite URLs carry the
/// submission timestamp.
pub fn build_request(
    config: &JobConfig,
    resolved: &ResolvedJob,
    submitted_at_millis: i64,
) -> AddJobRequest {
    let runs = resolved
        .suites
        .iter()
        .filter(|suite| !suite.disabled)
        .map(|suite| RunSpec {
            name: suite.name.clone(),
            url: suite.submission_url(submitted_at_millis),
        })
        .collect();

    AddJobRequest {
        auth_id: config.project_id.clone(),
        auth_token: config.auth_token.clone(),
        job_name: resolved.job_name.clone(),
        run_max: config.max_runs,
        browser_set: config.browser_set.clone(),
        runs,
    }
}

/// Submits jobs to the TestSwarm server
pub struct JobSubmitter {
    repository: Arc<dyn SwarmRepository>,
}

impl JobSubmitter {
    pub fn new(repository: Arc<dyn SwarmRepository>) -> Self {
        Self { repository }
    }

    pub async fn submit(
        &self,
        config: &JobConfig,
        resolved: &ResolvedJob,
    ) -> Result<SubmittedJob, ClientError> {
        let submitted_at = chrono::Utc::now().timestamp_millis();
        let request = build_request(config, resolved, submitted_at);

        info!(
            "Submitting job '{}' with {} run(s) to {}",
            request.job_name,
            request.runs.len(),
            resolved.server_url
        );

        let submitted = self.repository.add_job(&request).await?;
        info!("Job accepted with id {}", submitted.handle.id);

        Ok(submitted)
    }
}
