//! Verdict state machine
//!
//! A job's aggregate health is derived from an immutable tally of its runs by
//! the pure [`classify`] function. The poll loop that drives it lives in the
//! runner; nothing here depends on time or I/O.

use std::fmt;

use crate::dto::job::{JobStatusDocument, Run, RunStatus};

/// Classification of a job at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Unknown,
    AllPassing,
    InProgressEnoughPassingNoErrors,
    InProgressNotEnoughPassingNoErrors,
    TimeoutNotEnoughPassingNoErrors,
    FailureInProgress,
    FailureDone,
}

impl Verdict {
    /// Terminal verdicts stop the poll loop
    pub fn is_terminal(self) -> bool {
        matches!(self, Verdict::AllPassing | Verdict::FailureDone)
    }

    /// Whether the verdict maps to a successful build
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Verdict::AllPassing | Verdict::InProgressEnoughPassingNoErrors
        )
    }

    /// Verdict reported when the deadline expires on a non-terminal state
    ///
    /// Known failures and in-progress jobs that already pass keep their
    /// classification; everything else times out.
    pub fn at_deadline(self) -> Verdict {
        match self {
            Verdict::FailureInProgress
            | Verdict::InProgressEnoughPassingNoErrors
            | Verdict::AllPassing
            | Verdict::FailureDone => self,
            _ => Verdict::TimeoutNotEnoughPassingNoErrors,
        }
    }

    /// Console wording of the verdict
    pub fn narrative(self) -> &'static str {
        match self {
            Verdict::Unknown => "UNKNOWN",
            Verdict::AllPassing => "ALL PASSING",
            Verdict::InProgressEnoughPassingNoErrors => "ALL PASSING - SOME STILL RUNNING",
            Verdict::InProgressNotEnoughPassingNoErrors => "FAILURE - NOT ENOUGH FINISHED",
            Verdict::TimeoutNotEnoughPassingNoErrors => "FAILURE - TIMED OUT",
            Verdict::FailureInProgress | Verdict::FailureDone => "FAILURE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Unknown => "UNKNOWN",
            Verdict::AllPassing => "ALL_PASSING",
            Verdict::InProgressEnoughPassingNoErrors => "IN_PROGRESS_ENOUGH_PASSING_NO_ERRORS",
            Verdict::InProgressNotEnoughPassingNoErrors => {
                "IN_PROGRESS_NOT_ENOUGH_PASSING_NO_ERRORS"
            }
            Verdict::TimeoutNotEnoughPassingNoErrors => "TIMEOUT_NOT_ENOUGH_PASSING_NO_ERRORS",
            Verdict::FailureInProgress => "FAILURE_IN_PROGRESS",
            Verdict::FailureDone => "FAILURE_DONE",
        };
        f.write_str(name)
    }
}

/// Browser result counts of a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub passed: usize,
    pub failed: usize,
    /// Browsers still reporting `new`
    pub pending: usize,
}

impl RunTally {
    pub fn from_run(run: &Run) -> Self {
        run.ua_runs
            .values()
            .fold(RunTally::default(), |mut tally, ua_run| {
                match ua_run.run_status {
                    RunStatus::Passed => tally.passed += 1,
                    RunStatus::Failed => tally.failed += 1,
                    RunStatus::New => tally.pending += 1,
                    RunStatus::Other(_) => {}
                }
                tally
            })
    }

    /// No browser is left in `new`
    pub fn is_terminal(&self) -> bool {
        self.pending == 0
    }

    pub fn is_erroring(&self) -> bool {
        self.failed > 0
    }

    pub fn is_passing_enough(&self, minimum_passing: u32) -> bool {
        self.failed == 0 && self.passed >= minimum_passing as usize
    }
}

/// Per-run tallies of a whole job, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTally {
    pub runs: Vec<RunTally>,
}

impl JobTally {
    pub fn from_document(document: &JobStatusDocument) -> Self {
        Self {
            runs: document.job.runs.iter().map(RunTally::from_run).collect(),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.runs.iter().any(|run| !run.is_terminal())
    }

    pub fn has_errors(&self) -> bool {
        self.runs.iter().any(RunTally::is_erroring)
    }

    /// Runs still waiting on browsers are not judged yet
    pub fn finished_runs_passing_enough(&self, minimum_passing: u32) -> bool {
        self.runs
            .iter()
            .filter(|run| run.is_terminal())
            .all(|run| run.is_passing_enough(minimum_passing))
    }
}

/// Classifies a job from its tally
///
/// Any failing browser puts the job in the failure family regardless of how
/// far the other runs got. While the job is in progress only finished runs are
/// held to the minimum number of passing browsers. A job with no runs has
/// produced no evidence and stays `Unknown`.
pub fn classify(tally: &JobTally, minimum_passing: u32) -> Verdict {
    if tally.runs.is_empty() {
        return Verdict::Unknown;
    }

    let in_progress = tally.is_in_progress();

    if tally.has_errors() {
        return if in_progress {
            Verdict::FailureInProgress
        } else {
            Verdict::FailureDone
        };
    }

    match (in_progress, tally.finished_runs_passing_enough(minimum_passing)) {
        (false, true) => Verdict::AllPassing,
        (true, true) => Verdict::InProgressEnoughPassingNoErrors,
        (_, false) => Verdict::InProgressNotEnoughPassingNoErrors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(passed: usize, failed: usize, pending: usize) -> RunTally {
        RunTally {
            passed,
            failed,
            pending,
        }
    }

    fn job(runs: Vec<RunTally>) -> JobTally {
        JobTally { runs }
    }

    #[test]
    fn test_all_runs_done_and_passing() {
        let tally = job(vec![run(3, 0, 0), run(2, 0, 0)]);
        assert_eq!(classify(&tally, 2), Verdict::AllPassing);
    }

    #[test]
    fn test_done_with_failure() {
        let tally = job(vec![run(3, 0, 0), run(2, 1, 0)]);
        assert_eq!(classify(&tally, 2), Verdict::FailureDone);
    }

    #[test]
    fn test_in_progress_with_failure() {
        let tally = job(vec![run(0, 0, 4), run(0, 1, 2)]);
        assert_eq!(classify(&tally, 1), Verdict::FailureInProgress);
    }

    #[test]
    fn test_in_progress_enough_passing() {
        let tally = job(vec![run(3, 0, 0), run(2, 0, 1)]);
        assert_eq!(classify(&tally, 2), Verdict::InProgressEnoughPassingNoErrors);
    }

    #[test]
    fn test_in_progress_not_enough_passing() {
        let tally = job(vec![run(3, 0, 0), run(1, 0, 0), run(0, 0, 3)]);
        assert_eq!(classify(&tally, 2), Verdict::InProgressNotEnoughPassingNoErrors);
    }

    #[test]
    fn test_unfinished_run_is_not_judged_yet() {
        let tally = job(vec![run(3, 0, 0), run(0, 0, 3)]);
        let verdict = classify(&tally, 2);
        assert_eq!(verdict, Verdict::InProgressEnoughPassingNoErrors);
        assert!(verdict.is_success());

        // Partly run, still below the minimum
        let tally = job(vec![run(3, 0, 0), run(1, 0, 2)]);
        assert_eq!(classify(&tally, 2), Verdict::InProgressEnoughPassingNoErrors);
    }

    #[test]
    fn test_nothing_finished_yet() {
        let tally = job(vec![run(0, 0, 3), run(0, 0, 3)]);
        assert_eq!(classify(&tally, 1), Verdict::InProgressEnoughPassingNoErrors);
    }

    #[test]
    fn test_done_but_not_enough_passing_is_never_all_passing() {
        let tally = job(vec![run(3, 0, 0), run(1, 0, 0)]);
        let verdict = classify(&tally, 2);
        assert_ne!(verdict, Verdict::AllPassing);
        assert_eq!(verdict, Verdict::InProgressNotEnoughPassingNoErrors);
        assert!(!verdict.is_success());
    }

    #[test]
    fn test_single_failure_flips_to_failure_family() {
        let mut runs = vec![run(5, 0, 0), run(5, 0, 0), run(5, 0, 0)];
        assert_eq!(classify(&job(runs.clone()), 1), Verdict::AllPassing);

        runs[1].failed = 1;
        assert_eq!(classify(&job(runs.clone()), 1), Verdict::FailureDone);

        runs[2].pending = 1;
        assert_eq!(classify(&job(runs), 1), Verdict::FailureInProgress);
    }

    #[test]
    fn test_empty_job_is_unknown() {
        assert_eq!(classify(&JobTally::default(), 0), Verdict::Unknown);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let tally = job(vec![run(2, 0, 1), run(1, 0, 0)]);
        assert_eq!(classify(&tally, 1), classify(&tally, 1));
    }

    #[test]
    fn test_tally_excludes_new_and_unknown_statuses() {
        let json = r#"{"job": {"runs": [{
            "info": {"name": "core", "url": "http://x/core"},
            "uaRuns": {
                "a": {"runStatus": "new"},
                "b": {"runStatus": "passed"},
                "c": {"runStatus": "failed"},
                "d": {"runStatus": "error"},
                "e": {"runStatus": "new"}
            }
        }]}}"#;
        let doc: JobStatusDocument = serde_json::from_str(json).unwrap();
        let tally = JobTally::from_document(&doc);

        assert_eq!(tally.runs, vec![run(1, 1, 2)]);
        assert!(tally.is_in_progress());
        assert!(tally.has_errors());
    }

    #[test]
    fn test_success_mapping() {
        assert!(Verdict::AllPassing.is_success());
        assert!(Verdict::InProgressEnoughPassingNoErrors.is_success());
        assert!(!Verdict::InProgressNotEnoughPassingNoErrors.is_success());
        assert!(!Verdict::TimeoutNotEnoughPassingNoErrors.is_success());
        assert!(!Verdict::FailureInProgress.is_success());
        assert!(!Verdict::FailureDone.is_success());
        assert!(!Verdict::Unknown.is_success());
    }

    #[test]
    fn test_at_deadline() {
        assert_eq!(
            Verdict::InProgressNotEnoughPassingNoErrors.at_deadline(),
            Verdict::TimeoutNotEnoughPassingNoErrors
        );
        assert_eq!(
            Verdict::Unknown.at_deadline(),
            Verdict::TimeoutNotEnoughPassingNoErrors
        );
        assert_eq!(
            Verdict::FailureInProgress.at_deadline(),
            Verdict::FailureInProgress
        );
        assert_eq!(
            Verdict::InProgressEnoughPassingNoErrors.at_deadline(),
            Verdict::InProgressEnoughPassingNoErrors
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Verdict::AllPassing.to_string(), "ALL_PASSING");
        assert_eq!(
            Verdict::TimeoutNotEnoughPassingNoErrors.to_string(),
            "TIMEOUT_NOT_ENOUGH_PASSING_NO_ERRORS"
        );
    }
}
