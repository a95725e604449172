//! Orchestrator
//!
//! Runs one execution end to end:
//! 1. Validates the configuration, before any network traffic
//! 2. Resolves build variables into copies of the configured values
//! 3. Submits the job
//! 4. Polls it to a verdict
//! 5. Writes the TAP report (best effort)
//!
//! and records the build result on the invocation context.

use std::path::PathBuf;
use std::sync::Arc;
use swarmgate_client::ClientError;
use swarmgate_core::domain::report::Report;
use swarmgate_core::domain::verdict::Verdict;
use thiserror::Error;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{ConfigError, RawJobConfig, validate_server_url};
use crate::context::{BuildContext, BuildResult};
use crate::repository::SwarmRepository;
use crate::scheduler::{PollError, PollSchedule, VerdictEngine};
use crate::service::{JobSubmitter, ReportWriter, ResolvedJob};
use crate::variables::VariableResolver;

const BANNER: &str = "**************************************************************";

/// Errors that end an execution early
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Job submission failed: {0}")]
    Submission(#[source] ClientError),

    #[error("Polling TestSwarm failed: {0}")]
    Polling(#[source] ClientError),

    #[error("Build aborted while waiting for TestSwarm results")]
    Cancelled,
}

impl From<PollError> for RunError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Fetch(e) => RunError::Polling(e),
            PollError::Cancelled => RunError::Cancelled,
        }
    }
}

/// What an execution produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub result: BuildResult,
    /// Absent when the execution ended before a verdict
    pub verdict: Option<Verdict>,
    /// Absent when no report was written
    pub report: Option<PathBuf>,
}

/// Sequences submission, polling and reporting for one job
pub struct Orchestrator {
    context: Arc<BuildContext>,
    grace_period: Duration,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(context: Arc<BuildContext>, grace_period: Duration, cancel: CancellationToken) -> Self {
        Self {
            context,
            grace_period,
            cancel,
        }
    }

    /// Runs the execution and records its result
    ///
    /// # Arguments
    /// * `raw` - Configuration as entered
    /// * `resolver` - Build variable resolver
    /// * `connect` - Opens a repository for the resolved server URL
    pub async fn run<F>(
        &self,
        raw: RawJobConfig,
        resolver: &VariableResolver,
        connect: F,
    ) -> RunSummary
    where
        F: FnOnce(&str) -> Arc<dyn SwarmRepository>,
    {
        let console = self.context.console();
        console.line("");
        console.line("Launching TestSwarm Integration Suite...");

        let summary = match self.execute(raw, resolver, connect).await {
            Ok(summary) => summary,
            Err(err) => {
                error!("Execution failed: {}", err);
                console.error(&err.to_string());
                let result = match err {
                    RunError::Cancelled => {
                        console.line("ABORTED");
                        BuildResult::Aborted
                    }
                    _ => BuildResult::Failure,
                };
                RunSummary {
                    result,
                    verdict: None,
                    report: None,
                }
            }
        };

        self.context.set_result(summary.result);
        summary
    }

    async fn execute<F>(
        &self,
        raw: RawJobConfig,
        resolver: &VariableResolver,
        connect: F,
    ) -> Result<RunSummary, RunError>
    where
        F: FnOnce(&str) -> Arc<dyn SwarmRepository>,
    {
        let console = self.context.console();

        let config = raw.validate()?;
        for suite in config.disabled_suites() {
            console.line(&format!("Test is disabled for : {}", suite.name));
        }

        let resolved = ResolvedJob::resolve(&config, resolver);
        validate_server_url(&resolved.server_url)?;

        let repository = connect(&resolved.server_url);
        let submitted = JobSubmitter::new(Arc::clone(&repository))
            .submit(&config, &resolved)
            .await
            .map_err(RunError::Submission)?;
        let handle = &submitted.handle;

        console.line(&submitted.response);
        console.line(BANNER);
        console.line(
            "Your request is successfully posted to TestSwarm Server and \
             you can view the result in the following URL",
        );
        console.line(&handle.friendly_url);
        console.line("");
        console.line(&handle.status_url);
        console.line(BANNER);
        console.line("");
        console.line("Analyzing Test Suite Result....");

        let engine = VerdictEngine::new(
            repository,
            Arc::clone(&self.context),
            PollSchedule::from_config(&config, self.grace_period),
            config.minimum_passing,
            self.cancel.clone(),
        );
        let outcome = engine.run(handle).await?;

        let result = if outcome.verdict.is_success() {
            BuildResult::Success
        } else {
            BuildResult::Failure
        };
        info!(
            "Job {} verdict {} after {} poll(s): {:?}",
            handle.id, outcome.verdict, outcome.polls, result
        );

        console.line("Analyzing Test Suite Result COMPLETED...");
        console.line(&format!(
            "{} ({})",
            outcome.verdict.narrative(),
            outcome.verdict
        ));

        let report = Report::build(
            &outcome.document,
            resolved.disabled_suites(),
            config.minimum_passing,
            &handle.friendly_url,
        );
        info!(
            "Report for job {}: {} ok, {} not ok",
            handle.id,
            report.passed(),
            report.failed()
        );
        let report = self.persist_report(&report).await;

        Ok(RunSummary {
            result,
            verdict: Some(outcome.verdict),
            report,
        })
    }

    /// Writing the report never changes the verdict
    async fn persist_report(&self, report: &Report) -> Option<PathBuf> {
        let console = self.context.console();
        let writer = ReportWriter::new(self.context.workspace());

        match writer.write(report).await {
            Ok(path) => {
                console.line(&format!("Writing TAP results to {}", path.display()));
                Some(path.to_path_buf())
            }
            Err(e) => {
                warn!("Failed to write report: {}", e);
                console.error(&format!(
                    "Failed to write TAP results to {}: {}",
                    writer.path().display(),
                    e
                ));
                None
            }
        }
    }
}
