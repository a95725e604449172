//! Test doubles shared by the runner's unit tests

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use swarmgate_client::{ClientError, SubmittedJob};
use swarmgate_core::domain::config::{JobConfig, TestSuite};
use swarmgate_core::domain::job::JobHandle;
use swarmgate_core::dto::job::{
    AddJobRequest, JobRecord, JobStatusDocument, Run, RunInfo, RunStatus, UaRun,
};

use crate::context::Console;
use crate::repository::SwarmRepository;

/// Console that keeps every line in memory
#[derive(Debug, Default)]
pub struct BufferedConsole {
    lines: Mutex<Vec<(bool, String)>>,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(is_error, _)| *is_error)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Console for BufferedConsole {
    fn line(&self, message: &str) {
        self.lines.lock().unwrap().push((false, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines.lock().unwrap().push((true, message.to_string()));
    }
}

/// One scripted answer to a status query
#[derive(Debug, Clone)]
pub enum Step {
    Status(JobStatusDocument),
    Fail(String),
}

/// In-memory TestSwarm server
///
/// Answers status queries from a script; the last step repeats forever.
pub struct ScriptedRepository {
    job_id: u64,
    reject_submission: Option<String>,
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<AddJobRequest>>,
    fetches: AtomicUsize,
}

impl ScriptedRepository {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            job_id: 7,
            reject_submission: None,
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_submissions(message: &str) -> Self {
        Self {
            reject_submission: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<AddJobRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwarmRepository for ScriptedRepository {
    async fn add_job(&self, request: &AddJobRequest) -> Result<SubmittedJob, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(message) = &self.reject_submission {
            return Err(ClientError::MissingJobId(message.clone()));
        }

        Ok(SubmittedJob {
            handle: JobHandle::new("http://swarm.test", self.job_id),
            response: format!(r#"{{"addjob":{{"id":{}}}}}"#, self.job_id),
        })
    }

    async fn fetch_status(&self, _handle: &JobHandle) -> Result<JobStatusDocument, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            }
        };

        match step.expect("status script is empty") {
            Step::Status(document) => Ok(document),
            Step::Fail(message) => Err(ClientError::ParseError(message)),
        }
    }
}

/// Builds a status document from `(run name, browser statuses)` pairs
pub fn document(runs: &[(&str, &[&str])]) -> JobStatusDocument {
    let runs = runs
        .iter()
        .map(|(name, statuses)| {
            let ua_runs: BTreeMap<String, UaRun> = statuses
                .iter()
                .enumerate()
                .map(|(index, status)| {
                    (
                        format!("browser_{}", index),
                        UaRun {
                            run_status: RunStatus::from(status.to_string()),
                        },
                    )
                })
                .collect();

            Run {
                info: RunInfo {
                    name: name.to_string(),
                    url: format!("http://ci.test/{}.html", name),
                },
                ua_runs,
            }
        })
        .collect();

    JobStatusDocument {
        job: JobRecord { runs },
    }
}

pub fn suite(name: &str, disabled: bool) -> TestSuite {
    TestSuite {
        name: name.to_string(),
        url: format!("http://ci.test/{}.html", name),
        cache_bust: false,
        disabled,
    }
}

pub fn job_config(minimum_passing: u32, test_suites: Vec<TestSuite>) -> JobConfig {
    JobConfig {
        server_url: "http://swarm.test".to_string(),
        job_name: "nightly".to_string(),
        project_id: "ci".to_string(),
        auth_token: "secret".to_string(),
        max_runs: 2,
        browser_set: "popular".to_string(),
        polling_interval_secs: 10,
        timeout_minutes: 1,
        minimum_passing,
        test_suites,
    }
}
