//! Report service
//!
//! Writes the TAP report of an execution to a fixed file in the build
//! workspace, where the CI server picks it up.

use std::path::{Path, PathBuf};
use swarmgate_core::domain::report::Report;
use tracing::debug;

/// File name of the report, relative to the workspace root
pub const REPORT_FILE: &str = "testswarm.tap";

/// Persists reports into a workspace
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(workspace: &Path) -> Self {
        Self {
            path: workspace.join(REPORT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the report, replacing any previous one
    pub async fn write(&self, report: &Report) -> std::io::Result<&Path> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        debug!("Writing TAP results to {}", self.path.display());
        tokio::fs::write(&self.path, report.to_string()).await?;

        Ok(&self.path)
    }
}
