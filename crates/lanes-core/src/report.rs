//! Error and summary reporting collaborator

use std::sync::Mutex;

/// Receives user-facing output from the configuration layer.
///
/// Rows handed to [`Reporter::summary`] are already redacted.
pub trait Reporter {
    /// A mistake by the person running the tool
    fn user_error(&self, message: &str);

    /// A mistake in the code declaring the options
    fn fatal(&self, message: &str);

    /// A titled key/value table
    fn summary(&self, title: &str, rows: &[(String, String)]);
}

/// A captured reporter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    UserError(String),
    Fatal(String),
    Summary {
        title: String,
        rows: Vec<(String, String)>,
    },
}

/// Reporter that keeps every call in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, report: Report) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report);
        }
    }
}

impl Reporter for RecordingReporter {
    fn user_error(&self, message: &str) {
        self.record(Report::UserError(message.to_string()));
    }

    fn fatal(&self, message: &str) {
        self.record(Report::Fatal(message.to_string()));
    }

    fn summary(&self, title: &str, rows: &[(String, String)]) {
        self.record(Report::Summary {
            title: title.to_string(),
            rows: rows.to_vec(),
        });
    }
}
