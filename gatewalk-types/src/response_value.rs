use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single answer stored in `Responses`.
///
/// The shape depends on the question type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// ShortText, SingleChoice, GateChoice (selected label) and RatingScale answers.
    Text(String),

    /// MultiChoice selections, in the order they were picked, without duplicates.
    Choices(Vec<String>),

    /// RankedChoice answers: option label to rank.
    Ranking(BTreeMap<String, u32>),
}

impl ResponseValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_ranking(&self) -> Option<&BTreeMap<String, u32>> {
        match self {
            Self::Ranking(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this value counts as an answer at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Choices(c) => c.is_empty(),
            Self::Ranking(r) => r.is_empty(),
        }
    }

    /// Check whether a text or choice value includes `label`.
    pub fn contains(&self, label: &str) -> bool {
        match self {
            Self::Text(s) => s == label,
            Self::Choices(c) => c.iter().any(|x| x == label),
            Self::Ranking(r) => r.contains_key(label),
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Choices(_) => "Choices",
            Self::Ranking(_) => "Ranking",
        }
    }
}

impl From<String> for ResponseValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ResponseValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<String>> for ResponseValue {
    fn from(choices: Vec<String>) -> Self {
        Self::Choices(choices)
    }
}

impl From<BTreeMap<String, u32>> for ResponseValue {
    fn from(ranking: BTreeMap<String, u32>) -> Self {
        Self::Ranking(ranking)
    }
}
