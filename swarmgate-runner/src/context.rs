//! Invocation context
//!
//! Everything the surrounding build hands to one execution:
//! - Console for the human-facing narrative
//! - Workspace root where the report is written
//! - Slot for the final build result

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Line-oriented build console
pub trait Console: Send + Sync {
    /// Writes an informational line
    fn line(&self, message: &str);

    /// Writes an error line
    fn error(&self, message: &str);
}

/// Console writing to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn line(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "ERROR:".red().bold(), message);
    }
}

/// Final result recorded for the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Success,
    Failure,
    /// The build was cancelled while the job was being watched
    Aborted,
}

impl BuildResult {
    /// Process exit code for the result
    pub fn exit_code(self) -> u8 {
        match self {
            BuildResult::Success => 0,
            BuildResult::Failure => 1,
            BuildResult::Aborted => 2,
        }
    }
}

/// Context shared by the stages of one execution
pub struct BuildContext {
    workspace: PathBuf,
    console: Arc<dyn Console>,
    result: Mutex<Option<BuildResult>>,
}

impl BuildContext {
    /// Creates a new invocation context
    ///
    /// # Arguments
    /// * `workspace` - Root directory of the build workspace
    /// * `console` - Sink for the build narrative
    pub fn new(workspace: PathBuf, console: Arc<dyn Console>) -> Arc<Self> {
        Arc::new(Self {
            workspace,
            console,
            result: Mutex::new(None),
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    pub fn set_result(&self, result: BuildResult) {
        *self.result.lock().unwrap() = Some(result);
    }

    pub fn result(&self) -> Option<BuildResult> {
        *self.result.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BufferedConsole;

    #[test]
    fn test_context_result() {
        let context = BuildContext::new(PathBuf::from("/tmp/ws"), Arc::new(BufferedConsole::new()));
        assert_eq!(context.result(), None);

        context.set_result(BuildResult::Aborted);
        assert_eq!(context.result(), Some(BuildResult::Aborted));
        assert_eq!(BuildResult::Aborted.exit_code(), 2);
        assert_eq!(context.workspace(), Path::new("/tmp/ws"));
    }
}
