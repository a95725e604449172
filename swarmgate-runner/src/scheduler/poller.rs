//! Job status poller
//!
//! Drives the verdict state machine: waits for the server to settle, then
//! fetches the job status, classifies it and sleeps until the next poll, until
//! the job reaches a terminal verdict or the deadline passes.
//!
//! Every sleep observes the cancellation token, so an aborted build stops at
//! the next sleep boundary instead of polling on.

use std::sync::Arc;
use swarmgate_client::ClientError;
use swarmgate_core::domain::config::JobConfig;
use swarmgate_core::domain::job::JobHandle;
use swarmgate_core::domain::verdict::{JobTally, Verdict, classify};
use swarmgate_core::dto::job::JobStatusDocument;
use thiserror::Error;
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::BuildContext;
use crate::repository::SwarmRepository;

/// Wait before the first poll, giving the server time to schedule the runs
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(15);

/// Timing of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub grace_period: Duration,
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSchedule {
    pub fn from_config(config: &JobConfig, grace_period: Duration) -> Self {
        Self {
            grace_period,
            interval: Duration::from_secs(config.polling_interval_secs),
            timeout: Duration::from_secs(config.timeout_minutes.saturating_mul(60)),
        }
    }
}

/// Errors that abort polling
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Failed to fetch job status: {0}")]
    Fetch(#[from] ClientError),

    #[error("Polling cancelled")]
    Cancelled,
}

/// Final state of a poll loop
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub verdict: Verdict,
    /// Last status document fetched
    pub document: JobStatusDocument,
    pub polls: usize,
}

/// Polls a submitted job until a verdict is reached
pub struct VerdictEngine {
    repository: Arc<dyn SwarmRepository>,
    context: Arc<BuildContext>,
    schedule: PollSchedule,
    minimum_passing: u32,
    cancel: CancellationToken,
}

impl VerdictEngine {
    pub fn new(
        repository: Arc<dyn SwarmRepository>,
        context: Arc<BuildContext>,
        schedule: PollSchedule,
        minimum_passing: u32,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            repository,
            context,
            schedule,
            minimum_passing,
            cancel,
        }
    }

    /// Runs the poll loop for a job
    ///
    /// A fetch or decode error ends the loop immediately; nothing is retried.
    pub async fn run(&self, handle: &JobHandle) -> Result<PollOutcome, PollError> {
        let started = Instant::now();
        info!(
            "Watching job {} (interval: {:?}, timeout: {:?})",
            handle.id, self.schedule.interval, self.schedule.timeout
        );

        self.pause(self.schedule.grace_period).await?;

        let mut polls = 0;
        loop {
            let document = self.repository.fetch_status(handle).await?;
            polls += 1;

            let verdict = classify(&JobTally::from_document(&document), self.minimum_passing);
            debug!("Poll {} of job {}: {}", polls, handle.id, verdict);

            if verdict.is_terminal() {
                info!("Job {} finished: {}", handle.id, verdict);
                return Ok(PollOutcome {
                    verdict,
                    document,
                    polls,
                });
            }

            if started.elapsed() >= self.schedule.timeout {
                let verdict = verdict.at_deadline();
                warn!(
                    "Job {} still not finished after {:?}: {}",
                    handle.id, self.schedule.timeout, verdict
                );
                return Ok(PollOutcome {
                    verdict,
                    document,
                    polls,
                });
            }

            let console = self.context.console();
            console.line(&format!(
                "Sleeping for {} seconds...",
                self.schedule.interval.as_secs()
            ));
            console.line("");
            self.pause(self.schedule.interval).await?;
        }
    }

    async fn pause(&self, duration: Duration) -> Result<(), PollError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PollError::Cancelled),
            _ = time::sleep(duration) => Ok(()),
        }
    }
}
