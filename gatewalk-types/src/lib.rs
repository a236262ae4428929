//! Core types for the gatewalk crate.
//!
//! This crate provides the foundational types for survey documents:
//! - `Document`, `Page`, `WelcomePage`, `ThankYouPage` - The document structure
//! - `Question` and `QuestionKind` - Individual questions and their types
//! - `Action` and `JumpTarget` - Gate branching (page jumps and inline reveals)
//! - `Responses` and `ResponseValue` - Answers collected during a run
//! - `SubmissionSink` - The collaborator that receives finished runs

mod ids;
pub use ids::{END_SENTINEL, JumpTarget, PAGE_ID_PREFIX, PageId, QUESTION_ID_PREFIX, QuestionId};

mod question;
pub use question::{
    Action, ChoiceVariant, GateKind, GateQuestion, MultiChoiceQuestion, OTHER_OPTION, Question,
    QuestionKind, QuestionType, RankedChoiceQuestion, RatingKind, RatingScaleQuestion,
    SingleChoiceQuestion,
};

mod document;
pub use document::{
    Document, Page, QuestionLocation, ThankYouPage, WELCOME_QUESTION_ID, WelcomePage,
};

mod response_value;
pub use response_value::ResponseValue;

mod responses;
pub use responses::{ResponseError, Responses};

mod error;
pub use error::{
    BrokenBranch, DocumentProblem, EditorError, NavigationError, Reference, ResolveError,
    SurveyError,
};

mod traits;
pub use traits::{OTHER_SUFFIX, SubmissionPayload, SubmissionSink};
