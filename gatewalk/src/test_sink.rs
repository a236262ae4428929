//! Submission sink for testing runs without a remote endpoint.
//!
//! `RecordingSink` keeps every payload it receives and can be told to fail
//! a number of submissions first, to exercise the retry path.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatewalk::{Navigator, RecordingSink};
//!
//! let sink = RecordingSink::failing(1);
//! let mut nav = Navigator::new(&document, &sink);
//! // ... answer and go_next until the run ends ...
//! assert!(nav.retry_submission().is_ok());
//! assert_eq!(sink.count(), 1);
//! ```

use std::cell::{Cell, RefCell};

use crate::{SubmissionPayload, SubmissionSink};

/// A sink that records payloads in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    submissions: RefCell<Vec<SubmissionPayload>>,
    failures_left: Cell<usize>,
    attempts: Cell<usize>,
}

/// Error type for RecordingSink.
#[derive(Debug, thiserror::Error)]
pub enum RecordingSinkError {
    #[error("Simulated submission failure (attempt {0})")]
    Simulated(usize),
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose first `failures` submissions fail.
    pub fn failing(failures: usize) -> Self {
        let sink = Self::new();
        sink.failures_left.set(failures);
        sink
    }

    /// Successfully delivered payloads, oldest first.
    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.submissions.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.submissions.borrow().len()
    }

    pub fn last(&self) -> Option<SubmissionPayload> {
        self.submissions.borrow().last().cloned()
    }

    /// Calls to `submit`, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl SubmissionSink for RecordingSink {
    type Error = RecordingSinkError;

    fn submit(&self, payload: &SubmissionPayload) -> Result<(), Self::Error> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);

        let failures = self.failures_left.get();
        if failures > 0 {
            self.failures_left.set(failures - 1);
            return Err(RecordingSinkError::Simulated(attempt));
        }

        self.submissions.borrow_mut().push(payload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fails_then_records() {
        let sink = RecordingSink::failing(1);
        let mut payload = SubmissionPayload::new();
        payload.insert("Q1", "A");

        assert!(sink.submit(&payload).is_err());
        assert_eq!(sink.count(), 0);
        sink.submit(&payload).unwrap();
        assert_eq!(sink.count(), 1);
        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.last(), Some(payload));
    }
}
