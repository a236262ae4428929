use std::collections::BTreeMap;

use crate::{QuestionId, ResponseValue};

/// Error type for typed response access.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Missing response for question: {0}")]
    Missing(QuestionId),

    #[error("Type mismatch for question '{id}': expected {expected}, got {actual}")]
    TypeMismatch {
        id: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Answers collected during one run, keyed by question id.
///
/// "Other" free-text companions are kept alongside, keyed by the id of the
/// question they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Responses {
    values: BTreeMap<QuestionId, ResponseValue>,
    other_text: BTreeMap<QuestionId, String>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<QuestionId>, value: impl Into<ResponseValue>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &QuestionId) -> Option<&ResponseValue> {
        self.values.get(id)
    }

    pub fn get_mut(&mut self, id: &QuestionId) -> Option<&mut ResponseValue> {
        self.values.get_mut(id)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.values.contains_key(id)
    }

    pub fn remove(&mut self, id: &QuestionId) -> Option<ResponseValue> {
        self.values.remove(id)
    }

    /// Record the free-text companion of an "Other" selection.
    pub fn set_other_text(&mut self, id: impl Into<QuestionId>, text: impl Into<String>) {
        self.other_text.insert(id.into(), text.into());
    }

    pub fn other_text(&self, id: &QuestionId) -> Option<&str> {
        self.other_text.get(id).map(String::as_str)
    }

    pub fn clear_other_text(&mut self, id: &QuestionId) -> Option<String> {
        self.other_text.remove(id)
    }

    /// Iterate over all answers in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &ResponseValue)> {
        self.values.iter()
    }

    /// Iterate over all "Other" companions in id order.
    pub fn other_texts(&self) -> impl Iterator<Item = (&QuestionId, &str)> {
        self.other_text.iter().map(|(id, text)| (id, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // === Convenience accessors ===

    /// Get a scalar text answer.
    pub fn get_text(&self, id: &QuestionId) -> Result<&str, ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Text(s)) => Ok(s),
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Text",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::Missing(id.clone())),
        }
    }

    /// Get multi-choice selections.
    pub fn get_choices(&self, id: &QuestionId) -> Result<&[String], ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Choices(c)) => Ok(c),
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Choices",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::Missing(id.clone())),
        }
    }

    /// Get a ranking.
    pub fn get_ranking(&self, id: &QuestionId) -> Result<&BTreeMap<String, u32>, ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Ranking(r)) => Ok(r),
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Ranking",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::Missing(id.clone())),
        }
    }

    /// Check if a response exists and is non-empty.
    pub fn has_value(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(|v| !v.is_empty())
    }
}

impl<'a> IntoIterator for &'a Responses {
    type Item = (&'a QuestionId, &'a ResponseValue);
    type IntoIter = std::collections::btree_map::Iter<'a, QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
