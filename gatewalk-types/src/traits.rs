use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key suffix for the free-text companion of an "Other" selection.
/// For question `Q4` the text is submitted as `Q4_other`.
pub const OTHER_SUFFIX: &str = "_other";

/// The flattened answers of a finished run: one scalar string per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionPayload(BTreeMap<String, String>);

impl SubmissionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Trait for the collaborator that receives a finished run's answers.
///
/// The navigator calls `submit` exactly once when a run ends; an error is
/// surfaced to the caller and the answers are kept so the submission can be
/// retried by hand.
pub trait SubmissionSink {
    /// The error type for this sink.
    type Error: Into<anyhow::Error>;

    /// Deliver the flattened answers.
    fn submit(&self, payload: &SubmissionPayload) -> Result<(), Self::Error>;
}

impl<S: SubmissionSink + ?Sized> SubmissionSink for &S {
    type Error = S::Error;

    fn submit(&self, payload: &SubmissionPayload) -> Result<(), Self::Error> {
        (**self).submit(payload)
    }
}
