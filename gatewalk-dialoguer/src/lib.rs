//! # gatewalk-dialoguer
//!
//! Terminal runner for gatewalk survey documents.
//!
//! This crate runs a survey document in the terminal using the `dialoguer`
//! library. Pages are presented one after another; gate answers decide which
//! page comes next and which follow-up questions appear.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatewalk::load;
//! use gatewalk_dialoguer::{DialoguerRunner, JsonSink};
//!
//! fn main() -> anyhow::Result<()> {
//!     let document = load(&std::fs::read_to_string("survey.json")?)?;
//!     let responses = DialoguerRunner::new().run(&document, JsonSink::Stdout)?;
//!     println!("{} answers", responses.len());
//!     Ok(())
//! }
//! ```

mod backend;
mod sink;

pub use backend::{DialoguerError, DialoguerRunner, choice_items, rating_items};
pub use sink::{JsonSink, JsonSinkError};
