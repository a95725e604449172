//! Job configuration
//!
//! The configuration surface is a JSON document whose values arrive as the
//! user typed them, so every field is optional and numbers may be strings.
//! [`RawJobConfig::validate`] turns it into a typed [`JobConfig`], failing on
//! the first problem with a message naming the field.

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use swarmgate_core::domain::config::{JobConfig, TestSuite};
use thiserror::Error;

const SERVER_URL: &str = "TestSwarm server url";
const JOB_NAME: &str = "Job name";
const PROJECT_ID: &str = "Project id";
const AUTH_TOKEN: &str = "Auth token";
const MAX_RUNS: &str = "Maximum number of runs";
const BROWSER_SET: &str = "Browser set";
const POLLING_INTERVAL: &str = "Polling interval";
const TIMEOUT: &str = "Timeout period";
const MINIMUM_PASSING: &str = "Minimum passing";

/// Configuration errors, one per validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is mandatory")]
    Missing(&'static str),

    #[error("{field} is not an integer: '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} must be greater than 0 (got {value})")]
    NotPositive { field: &'static str, value: i64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    #[error("Test suite #{0} has no name")]
    SuiteMissingName(usize),

    #[error("Test suite '{0}' has no url")]
    SuiteMissingUrl(String),

    #[error("At least one enabled test suite is required")]
    NoEnabledSuites,

    #[error("TestSwarm server url '{url}' is not a valid url ({reason}), check the job configuration")]
    InvalidServerUrl { url: String, reason: String },
}

/// Job configuration as entered
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJobConfig {
    pub server_url: Option<String>,
    pub job_name: Option<String>,
    pub project_id: Option<String>,
    pub auth_token: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_runs: Option<String>,
    pub browser_set: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub polling_interval_seconds: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timeout_minutes: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub minimum_passing: Option<String>,
    #[serde(default)]
    pub test_suites: Vec<RawTestSuite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTestSuite {
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub cache_bust: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl RawJobConfig {
    /// Loads the configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces the auth token, typically with one taken from the environment
    pub fn with_auth_token(mut self, auth_token: Option<String>) -> Self {
        if auth_token.is_some() {
            self.auth_token = auth_token;
        }
        self
    }

    /// Validates every field, stopping at the first failure
    ///
    /// The server URL is only checked for presence here; its syntax is checked
    /// once placeholders have been resolved.
    pub fn validate(self) -> Result<JobConfig, ConfigError> {
        let server_url = required(self.server_url, SERVER_URL)?;
        let job_name = required(self.job_name, JOB_NAME)?;
        let project_id = required(self.project_id, PROJECT_ID)?;
        let auth_token = required(self.auth_token, AUTH_TOKEN)?;

        let max_runs = integer(self.max_runs, MAX_RUNS)?;
        let max_runs = positive(max_runs, MAX_RUNS)?;
        let polling_interval = integer(self.polling_interval_seconds, POLLING_INTERVAL)?;
        let polling_interval_secs = positive(polling_interval, POLLING_INTERVAL)?;
        let timeout = integer(self.timeout_minutes, TIMEOUT)?;
        let timeout_minutes = positive(timeout, TIMEOUT)?;
        let minimum_passing = integer(self.minimum_passing, MINIMUM_PASSING)?;
        let minimum_passing = non_negative(minimum_passing, MINIMUM_PASSING)?;

        let browser_set = required(self.browser_set, BROWSER_SET)?;

        let test_suites = self
            .test_suites
            .into_iter()
            .enumerate()
            .map(|(index, suite)| suite.validate(index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        if test_suites.iter().all(|suite| suite.disabled) {
            return Err(ConfigError::NoEnabledSuites);
        }

        Ok(JobConfig {
            server_url,
            job_name,
            project_id,
            auth_token,
            max_runs,
            browser_set,
            polling_interval_secs,
            timeout_minutes,
            minimum_passing,
            test_suites,
        })
    }
}

impl RawTestSuite {
    fn validate(self, position: usize) -> Result<TestSuite, ConfigError> {
        let name = non_empty(self.name).ok_or(ConfigError::SuiteMissingName(position))?;
        let url = non_empty(self.url).ok_or_else(|| ConfigError::SuiteMissingUrl(name.clone()))?;

        Ok(TestSuite {
            name,
            url,
            cache_bust: self.cache_bust,
            disabled: self.disabled,
        })
    }
}

/// Checks the syntax of a (resolved) server URL
pub fn validate_server_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidServerUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::Missing(field))
}

fn integer(value: Option<String>, field: &'static str) -> Result<i64, ConfigError> {
    let value = required(value, field)?;
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::NotAnInteger { field, value })
}

fn positive<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    T::try_from(value).map_err(|_| ConfigError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

fn non_negative<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T, ConfigError> {
    if value < 0 {
        return Err(ConfigError::Negative { field, value });
    }
    T::try_from(value).map_err(|_| ConfigError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

/// Accepts `"10"` as well as `10`
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}
