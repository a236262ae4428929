use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of editor-generated question ids, e.g. `Q12`.
pub const QUESTION_ID_PREFIX: &str = "Q";

/// Prefix of editor-generated page ids, e.g. `p3`.
pub const PAGE_ID_PREFIX: &str = "p";

/// Sentinel jump target that ends the survey.
pub const END_SENTINEL: &str = "END";

/// Identifier of a question, unique across the whole document.
///
/// Editor-generated ids look like `Q{n}`; loaded documents may carry
/// arbitrary ids (e.g. the welcome page's `email` question).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Create a question id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create the editor-style id `Q{n}`.
    pub fn numbered(n: u64) -> Self {
        Self(format!("{QUESTION_ID_PREFIX}{n}"))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric suffix of an editor-style id, if this is one.
    pub fn number(&self) -> Option<u64> {
        numeric_suffix(&self.0, QUESTION_ID_PREFIX)
    }
}

/// Identifier of a content page.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Create a page id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create the editor-style id `p{n}`.
    pub fn numbered(n: u64) -> Self {
        Self(format!("{PAGE_ID_PREFIX}{n}"))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric suffix of an editor-style id, if this is one.
    pub fn number(&self) -> Option<u64> {
        numeric_suffix(&self.0, PAGE_ID_PREFIX)
    }
}

fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Where a `Jump` action leads: another page, or the end of the survey.
///
/// Serialized as a plain string; the literal `"END"` is the sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JumpTarget {
    Page(PageId),
    End,
}

impl JumpTarget {
    /// The target page, unless this is the end sentinel.
    pub fn page(&self) -> Option<&PageId> {
        match self {
            Self::Page(id) => Some(id),
            Self::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl From<String> for JumpTarget {
    fn from(s: String) -> Self {
        if s == END_SENTINEL {
            Self::End
        } else {
            Self::Page(PageId(s))
        }
    }
}

impl From<JumpTarget> for String {
    fn from(target: JumpTarget) -> Self {
        match target {
            JumpTarget::Page(id) => id.0,
            JumpTarget::End => END_SENTINEL.to_string(),
        }
    }
}

impl From<PageId> for JumpTarget {
    fn from(id: PageId) -> Self {
        Self::Page(id)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(id) => write!(f, "{id}"),
            Self::End => write!(f, "{END_SENTINEL}"),
        }
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for JumpTarget {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_ids() {
        assert_eq!(QuestionId::numbered(7).as_str(), "Q7");
        assert_eq!(PageId::numbered(2).as_str(), "p2");
    }

    #[test]
    fn numeric_suffix_only_for_editor_ids() {
        assert_eq!(QuestionId::new("Q42").number(), Some(42));
        assert_eq!(QuestionId::new("email").number(), None);
        assert_eq!(QuestionId::new("Q").number(), None);
        assert_eq!(QuestionId::new("Q1a").number(), None);
        assert_eq!(PageId::new("p10").number(), Some(10));
        assert_eq!(PageId::new("BRANCH_A").number(), None);
    }

    #[test]
    fn jump_target_sentinel() {
        assert_eq!(JumpTarget::from("END"), JumpTarget::End);
        assert_eq!(
            JumpTarget::from("p3"),
            JumpTarget::Page(PageId::new("p3"))
        );
        assert_eq!(String::from(JumpTarget::End), "END");
    }

    #[test]
    fn jump_target_serializes_as_string() {
        let json = serde_json::to_string(&JumpTarget::Page(PageId::new("p2"))).unwrap();
        assert_eq!(json, "\"p2\"");
        let back: JumpTarget = serde_json::from_str("\"END\"").unwrap();
        assert!(back.is_end());
    }
}
