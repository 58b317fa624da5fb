//! Outcome of a batch command

use serde::Serialize;

/// A file that was skipped or failed, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssue {
    pub path: String,
    pub message: String,
}

impl FileIssue {
    pub fn new(path: impl Into<String>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Report from a pull or push
///
/// Per-file failures land in `errors` instead of aborting the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Nothing needed to be done
    pub up_to_date: bool,
    /// Actions taken, in order
    pub actions: Vec<String>,
    /// Files deliberately left alone
    pub skipped: Vec<FileIssue>,
    /// Files that failed to synchronize
    pub errors: Vec<FileIssue>,
}

impl SyncReport {
    pub fn up_to_date() -> Self {
        Self {
            up_to_date: true,
            ..Self::default()
        }
    }

    pub fn action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    pub fn skip(&mut self, path: impl Into<String>, message: impl ToString) {
        self.skipped.push(FileIssue::new(path, message));
    }

    pub fn fail(&mut self, path: impl Into<String>, message: impl ToString) {
        self.errors.push(FileIssue::new(path, message));
    }

    /// Whether every file synchronized
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
