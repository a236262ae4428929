use std::fmt;

use crate::{PageId, QuestionId};

/// Something an editor operation referred to that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Page(PageId),
    Question(QuestionId),
    Option { question: QuestionId, label: String },
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(id) => write!(f, "page '{id}'"),
            Self::Question(id) => write!(f, "question '{id}'"),
            Self::Option { question, label } => {
                write!(f, "option '{label}' of question '{question}'")
            }
        }
    }
}

/// A structural violation found while checking a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentProblem {
    #[error("could not parse document: {0}")]
    Unparseable(String),

    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(QuestionId),

    #[error("duplicate page id '{0}'")]
    DuplicatePageId(PageId),

    #[error("gate '{gate}' option '{option}' jumps to missing page '{target}'")]
    DanglingJump {
        gate: QuestionId,
        option: String,
        target: PageId,
    },

    #[error("gate '{gate}' option '{option}' reveals missing question '{target}'")]
    DanglingReveal {
        gate: QuestionId,
        option: String,
        target: QuestionId,
    },

    #[error("page '{page}' points to missing next page '{target}'")]
    DanglingNextPage { page: PageId, target: PageId },

    #[error("question '{question}' names missing parent '{parent}'")]
    DanglingParent {
        question: QuestionId,
        parent: QuestionId,
    },

    #[error("question '{question}' names parent '{parent}', which does not reveal it")]
    UnpairedParent {
        question: QuestionId,
        parent: QuestionId,
    },

    #[error("gate '{gate}' reveals '{target}', whose parent is not the gate")]
    UnpairedReveal { gate: QuestionId, target: QuestionId },

    #[error("question '{question}' is part of a reveal cycle")]
    RevealCycle { question: QuestionId },

    #[error("gate '{gate}' reveals '{target}', which is on a different page")]
    RevealOffPage { gate: QuestionId, target: QuestionId },

    #[error("gate '{gate}' has an action for '{option}' that does not match its gate kind")]
    ActionKindMismatch { gate: QuestionId, option: String },

    #[error("gate '{gate}' has an action for unknown option '{option}'")]
    ActionForUnknownOption { gate: QuestionId, option: String },

    #[error("required question '{0}' has nothing to choose from")]
    Unanswerable(QuestionId),

    #[error("question '{0}' lists an option named \"Other\" while also allowing Other")]
    OtherOptionClash(QuestionId),

    #[error("page id '{0}' is reserved for ending the survey")]
    ReservedPageId(PageId),

    #[error("rating '{question}' has {labels} labels for {points} points")]
    LabelCountMismatch {
        question: QuestionId,
        points: u32,
        labels: usize,
    },
}

/// Error type for editor operations and document loading.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Invalid reference: {0}")]
    InvalidReference(Reference),

    #[error("Question '{id}' is a {actual}, expected {expected}")]
    KindMismatch {
        id: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Malformed document: {}", join_problems(.0))]
    MalformedDocument(Vec<DocumentProblem>),

    /// The highest numbered id leaves no room for a fresh one.
    #[error("No {0} ids left after the highest numbered one")]
    IdsExhausted(&'static str),

    /// "Other" is taken by the free-text choice while it is allowed.
    #[error("Question '{0}' allows Other, so no option may be named \"Other\"")]
    ReservedOption(QuestionId),
}

impl EditorError {
    pub fn unknown_page(id: &PageId) -> Self {
        Self::InvalidReference(Reference::Page(id.clone()))
    }

    pub fn unknown_question(id: &QuestionId) -> Self {
        Self::InvalidReference(Reference::Question(id.clone()))
    }

    pub fn unknown_option(question: &QuestionId, label: impl Into<String>) -> Self {
        Self::InvalidReference(Reference::Option {
            question: question.clone(),
            label: label.into(),
        })
    }

    /// The problems behind a `MalformedDocument`, empty otherwise.
    pub fn problems(&self) -> &[DocumentProblem] {
        match self {
            Self::MalformedDocument(problems) => problems,
            _ => &[],
        }
    }
}

fn join_problems(problems: &[DocumentProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A branch target that does not exist in the document being run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokenBranch {
    #[error("page '{from}' leads to missing page '{target}'")]
    MissingPage { from: PageId, target: PageId },

    #[error("gate '{gate}' reveals missing question '{target}'")]
    MissingQuestion { gate: QuestionId, target: QuestionId },
}

/// Error type for the branching resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Broken branch: {0}")]
    BrokenBranch(#[from] BrokenBranch),

    #[error("Unknown page: {0}")]
    UnknownPage(PageId),
}

/// Error type for navigator operations.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),

    #[error("Question '{0}' is not on the current page")]
    NotOnCurrentPage(QuestionId),

    #[error("Question '{0}' is hidden")]
    QuestionHidden(QuestionId),

    #[error("Question '{id}' expects {expected} answers, got {actual}")]
    TypeMismatch {
        id: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Question '{id}' has no option '{option}'")]
    UnknownOption { id: QuestionId, option: String },

    #[error("Required questions unanswered: {}", join_ids(.0))]
    ValidationFailed(Vec<QuestionId>),

    #[error("Broken branch: {0}")]
    BrokenBranch(BrokenBranch),

    #[error("No earlier page to go back to")]
    HistoryEmpty,

    #[error("The survey is finished")]
    Finished,

    #[error("The survey is not finished yet")]
    NotFinished,

    #[error("Responses were already submitted")]
    AlreadySubmitted,

    #[error("Submission failed: {0}")]
    SubmissionFailed(anyhow::Error),
}

impl NavigationError {
    /// The unmet questions of a `ValidationFailed`, empty otherwise.
    pub fn unmet(&self) -> &[QuestionId] {
        match self {
            Self::ValidationFailed(ids) => ids,
            _ => &[],
        }
    }
}

impl From<ResolveError> for NavigationError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::BrokenBranch(branch) => Self::BrokenBranch(branch),
            ResolveError::UnknownPage(page) => Self::BrokenBranch(BrokenBranch::MissingPage {
                from: page.clone(),
                target: page,
            }),
        }
    }
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Umbrella error for callers that drive both the editor and a run.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Backend-specific failure (I/O, terminal, etc.)
    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl SurveyError {
    /// Create a backend error from any error type.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failed_lists_ids() {
        let err = NavigationError::ValidationFailed(vec![
            QuestionId::new("Q1"),
            QuestionId::new("Q4"),
        ]);
        assert_eq!(err.to_string(), "Required questions unanswered: Q1, Q4");
        assert_eq!(err.unmet().len(), 2);
    }

    #[test]
    fn malformed_document_joins_problems() {
        let err = EditorError::MalformedDocument(vec![
            DocumentProblem::DuplicateQuestionId(QuestionId::new("Q1")),
            DocumentProblem::DanglingJump {
                gate: QuestionId::new("Q2"),
                option: "A".into(),
                target: PageId::new("p99"),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Malformed document: duplicate question id 'Q1'; gate 'Q2' option 'A' jumps to missing page 'p99'"
        );
    }

    #[test]
    fn resolve_error_becomes_broken_branch() {
        let err: NavigationError = ResolveError::BrokenBranch(BrokenBranch::MissingPage {
            from: PageId::new("p1"),
            target: PageId::new("p9"),
        })
        .into();
        assert!(matches!(err, NavigationError::BrokenBranch(_)));
    }
}
