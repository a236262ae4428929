//! # gatewalk
//!
//! Multi-page surveys with conditional branching. Backend-agnostic.
//!
//! A survey is a [`Document`]: a welcome page with a contact question,
//! ordered content pages and a thank-you page. Gate questions branch in two
//! ways: a `Jump` action sends the respondent to another page (or the end),
//! a `Reveal` action shows sub-questions inline on the same page.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatewalk::{Answer, Editor, GateKind, JumpTarget, Navigator, QuestionType, RecordingSink};
//!
//! // Build a document
//! let mut editor = Editor::new();
//! let page = editor.document().pages[0].id.clone();
//! let gate = editor.add_question(&page, QuestionType::GateChoice)?;
//! editor.set_jump(&gate, "A", JumpTarget::End)?;
//! let document = editor.into_document();
//!
//! // Run it
//! let sink = RecordingSink::new();
//! let mut nav = Navigator::new(&document, &sink);
//! nav.answer(&"email".into(), Answer::text("me@example.com"))?;
//! nav.go_next()?;
//! nav.answer(&gate, Answer::select("A"))?;
//! nav.go_next()?; // ends the run and submits
//! ```
//!
//! ## Components
//!
//! - [`Editor`] - checked mutations, id allocation, subtree copies
//! - [`resolve_next`] - the pure branching decision for a "next" action
//! - [`Navigator`] - one run: answers, validation, history, submission
//! - [`load`] / [`save`] - the JSON document blob
//!
//! ## Backends
//!
//! Renderers are separate crates that drive a `Navigator`:
//! - `gatewalk-dialoguer` - CLI prompts via dialoguer

// Re-export all types from gatewalk-types
pub use gatewalk_types::*;

mod check;
pub use check::problems;

mod codec;
pub use codec::{load, save};

mod editor;
pub use editor::{
    DeleteMode, Editor, MoveDirection, NEW_PAGE_TITLE, NEW_QUESTION_TEXT, parse_option_list,
};

mod resolver;
pub use resolver::{NextStep, gate_jump, resolve_next, resolve_start};

mod visibility;
pub use visibility::{RevealState, check_reveal_targets};

mod validation;
pub use validation::{IDENTITY_MARKER, is_answered, unmet_required};

mod submission;
pub use submission::{LIST_SEPARATOR, flatten};

mod navigator;
pub use navigator::{Answer, Navigator, Stage, SubmissionStatus, View};

// Sink for testing runs without a remote endpoint
mod test_sink;
pub use test_sink::{RecordingSink, RecordingSinkError};
