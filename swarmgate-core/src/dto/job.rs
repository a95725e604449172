//! Job DTOs for the TestSwarm API

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Request to create a new job (`api.php?action=addjob`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddJobRequest {
    pub auth_id: String,
    pub auth_token: String,
    pub job_name: String,
    pub run_max: u32,
    pub browser_set: String,
    pub runs: Vec<RunSpec>,
}

/// One run of the job: a suite name and the URL the browsers will load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: String,
    pub url: String,
}

impl AddJobRequest {
    /// Flattens the request into ordered form fields
    ///
    /// Runs become repeated `runNames[]`/`runUrls[]` pairs, in submission order.
    /// Percent-encoding is left to the form encoder.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("authID", self.auth_id.clone()),
            ("authToken", self.auth_token.clone()),
            ("jobName", self.job_name.clone()),
            ("runMax", self.run_max.to_string()),
            ("browserSets[]", self.browser_set.clone()),
        ];

        for run in &self.runs {
            fields.push(("runNames[]", run.name.clone()));
            fields.push(("runUrls[]", run.url.clone()));
        }

        fields
    }
}

/// Response to `addjob`
///
/// Both members are optional so that a well-formed document lacking the job id
/// can be told apart from one that is not JSON at all.
#[derive(Debug, Clone, Deserialize)]
pub struct AddJobResponse {
    #[serde(default)]
    pub addjob: Option<AddJobResult>,
    #[serde(default)]
    pub error: Option<ServiceErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddJobResult {
    #[serde(default)]
    pub id: Option<u64>,
}

/// Error envelope the service returns instead of a result
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// Envelope used to recognise an error answer to a status query
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorEnvelope {
    pub error: ServiceErrorBody,
}

/// Response to `api.php?format=json&action=job&item={id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatusDocument {
    pub job: JobRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobRecord {
    /// One run per submitted suite, in submission order
    pub runs: Vec<Run>,
}

/// A suite's execution across all requested browsers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Run {
    pub info: RunInfo,
    /// Keyed by browser identifier
    #[serde(rename = "uaRuns", deserialize_with = "deserialize_ua_runs")]
    pub ua_runs: BTreeMap<String, UaRun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunInfo {
    pub name: String,
    pub url: String,
}

/// Result of one run in one browser
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UaRun {
    #[serde(rename = "runStatus")]
    pub run_status: RunStatus,
}

/// Status of a run in a single browser
///
/// Only `passed` and `failed` are tallied. `new` means the browser has not
/// executed the run yet. Anything else the service reports is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    New,
    Passed,
    Failed,
    Other(String),
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new" => RunStatus::New,
            "passed" => RunStatus::Passed,
            "failed" => RunStatus::Failed,
            _ => RunStatus::Other(value),
        }
    }
}

/// PHP encodes an empty associative array as `[]`
fn deserialize_ua_runs<'de, D>(deserializer: D) -> Result<BTreeMap<String, UaRun>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum UaRuns {
        Map(BTreeMap<String, UaRun>),
        List(Vec<serde_json::Value>),
    }

    match UaRuns::deserialize(deserializer)? {
        UaRuns::Map(map) => Ok(map),
        UaRuns::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        UaRuns::List(_) => Err(serde::de::Error::custom(
            "uaRuns must be an object keyed by browser",
        )),
    }
}
