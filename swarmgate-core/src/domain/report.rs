//! Test report
//!
//! Translates the final status document into a TAP test set: one entry per
//! run followed by one skipped entry per disabled suite.

use std::fmt;

use crate::domain::config::TestSuite;
use crate::domain::verdict::RunTally;
use crate::dto::job::{JobStatusDocument, Run, RunStatus};

/// Skip reason attached to disabled suites
pub const DISABLED_REASON: &str = "test disabled";

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// 1-based, contiguous across runs and disabled suites
    pub number: usize,
    pub description: String,
    pub ok: bool,
    pub comments: Vec<String>,
    pub skip: Option<String>,
}

/// A complete test set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Declared number of entries
    pub plan: usize,
    /// Leading free-text comment, the human-facing job URL
    pub header: String,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Builds the report for a job
    pub fn build<'a>(
        document: &JobStatusDocument,
        disabled_suites: impl IntoIterator<Item = &'a TestSuite>,
        minimum_passing: u32,
        friendly_job_url: &str,
    ) -> Self {
        let mut entries: Vec<ReportEntry> = document
            .job
            .runs
            .iter()
            .enumerate()
            .map(|(index, run)| run_entry(index + 1, run, minimum_passing))
            .collect();

        for suite in disabled_suites {
            entries.push(ReportEntry {
                number: entries.len() + 1,
                description: suite.name.clone(),
                ok: true,
                comments: Vec::new(),
                skip: Some(DISABLED_REASON.to_string()),
            });
        }

        Self {
            plan: entries.len(),
            header: friendly_job_url.to_string(),
            entries,
        }
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|entry| entry.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.passed()
    }
}

fn run_entry(number: usize, run: &Run, minimum_passing: u32) -> ReportEntry {
    let tally = RunTally::from_run(run);
    let ok = tally.is_passing_enough(minimum_passing);

    let mut comments = Vec::new();
    if tally.is_erroring() {
        comments.push(format!(
            "failing - [{}]",
            browsers_with(run, &RunStatus::Failed).join(", ")
        ));
        comments.push(format!(
            "passed - [{}]",
            browsers_with(run, &RunStatus::Passed).join(", ")
        ));
    } else if !ok {
        comments.push(format!("passing: {} < {}", tally.passed, minimum_passing));
    }
    comments.push(run.info.url.clone());

    ReportEntry {
        number,
        description: run.info.name.clone(),
        ok,
        comments,
        skip: None,
    }
}

fn browsers_with<'a>(run: &'a Run, status: &RunStatus) -> Vec<&'a str> {
    run.ua_runs
        .iter()
        .filter(|(_, ua_run)| &ua_run.run_status == status)
        .map(|(browser, _)| browser.as_str())
        .collect()
}

/// Renders the report as TAP
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "1..{}", self.plan)?;
        writeln!(f, "# {}", self.header)?;

        for entry in &self.entries {
            let status = if entry.ok { "ok" } else { "not ok" };
            write!(f, "{} {} - {}", status, entry.number, entry.description)?;
            if let Some(reason) = &entry.skip {
                write!(f, " # SKIP {}", reason)?;
            }
            writeln!(f)?;

            for comment in &entry.comments {
                writeln!(f, "# {}", comment)?;
            }
        }

        Ok(())
    }
}
