use pdm_sbom::prelude::*;
use std::sync::{Arc, Mutex};

/// MockProgressReporter recording every message for assertions
///
/// Clones share the same message buffer, so a handle kept before
/// moving the reporter into a pipeline still sees every message.
#[derive(Clone)]
pub struct MockProgressReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    fn record(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

impl Default for MockProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.record(message);
    }

    fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}

    fn report_error(&self, message: &str) {
        self.record(message);
    }

    fn report_completion(&self, message: &str) {
        self.record(message);
    }
}
