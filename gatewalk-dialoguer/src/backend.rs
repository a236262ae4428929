//! Dialoguer runner: drives a `Navigator` with terminal prompts.

use std::collections::HashSet;

use dialoguer::{
    Confirm, FuzzySelect, Input, MultiSelect, Select,
    theme::{ColorfulTheme, SimpleTheme, Theme},
};
use gatewalk::{
    Answer, Document, NavigationError, Navigator, OTHER_OPTION, Question, QuestionId,
    QuestionKind, RatingKind, RatingScaleQuestion, ResponseValue, Responses, SubmissionSink, View,
};
use thiserror::Error;
use tracing::debug;

/// Error type for the Dialoguer runner.
#[derive(Debug, Error)]
pub enum DialoguerError {
    /// User cancelled the survey (e.g., pressed Ctrl+C or Escape).
    #[error("Survey cancelled by user")]
    Cancelled,

    /// An I/O error occurred during prompting.
    #[error("Dialoguer error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// The run could not continue.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// A required question blocks the page but offers nothing to answer.
    #[error("Question '{0}' is required but has nothing to choose from")]
    Unanswerable(QuestionId),
}

/// Helper to check if a dialoguer error is a cancellation (Ctrl+C / Escape)
fn is_cancelled(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::Interrupted)
}

fn prompt_error(err: dialoguer::Error) -> DialoguerError {
    if is_cancelled(&err) {
        DialoguerError::Cancelled
    } else {
        DialoguerError::Dialoguer(err)
    }
}

/// Runs a survey document page by page in the terminal.
///
/// Each page's visible questions are asked in order; questions revealed by
/// a gate answer are asked right after it. After a page the respondent can
/// continue or go back.
#[derive(Debug, Clone)]
pub struct DialoguerRunner {
    /// Use colorful theme for prompts.
    colorful: bool,
}

impl Default for DialoguerRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl DialoguerRunner {
    /// Create a runner with the colorful theme.
    pub fn new() -> Self {
        Self { colorful: true }
    }

    /// Create a runner with plain (no color) prompts.
    pub fn plain() -> Self {
        Self { colorful: false }
    }

    /// Run `document` to the thank-you page and return the answers.
    ///
    /// The flattened answers are handed to `sink` when the run ends. A failed
    /// submission can be retried from the prompt.
    pub fn run<S: SubmissionSink>(
        &self,
        document: &Document,
        sink: S,
    ) -> Result<Responses, DialoguerError> {
        let mut nav = Navigator::new(document, sink);

        loop {
            match nav.view() {
                View::Welcome { page } => {
                    println!("{}", page.title);
                    if !page.description.is_empty() {
                        println!("{}", page.description);
                    }
                    println!();
                    self.ask(&mut nav, &page.question)?;
                }
                View::Page {
                    page,
                    number,
                    total,
                    ..
                } => {
                    println!();
                    println!("[{number}/{total}] {}", page.title);
                    if !page.description.is_empty() {
                        println!("{}", page.description);
                    }
                    self.ask_page(&mut nav)?;
                }
                View::ThankYou { page } => {
                    println!();
                    println!("{}", page.title);
                    if !page.note.is_empty() {
                        println!("{}", page.note);
                    }
                    if !page.redirect_url.is_empty() {
                        println!("Continue at: {}", page.redirect_url);
                    }
                    return Ok(nav.into_responses());
                }
            }

            self.advance(&mut nav)?;
        }
    }

    /// Ask every visible question of the current page once, picking up
    /// questions that become visible along the way.
    fn ask_page<S: SubmissionSink>(&self, nav: &mut Navigator<'_, S>) -> Result<(), DialoguerError> {
        let mut asked: HashSet<QuestionId> = HashSet::new();
        loop {
            let next = match nav.view() {
                View::Page { questions, .. } => {
                    questions.into_iter().find(|q| !asked.contains(q.id()))
                }
                _ => None,
            };
            let Some(question) = next else {
                return Ok(());
            };
            asked.insert(question.id().clone());
            self.ask(nav, question)?;
        }
    }

    fn advance<S: SubmissionSink>(&self, nav: &mut Navigator<'_, S>) -> Result<(), DialoguerError> {
        if nav.can_go_back() {
            let choice = self.select("Continue?", &["Next".to_string(), "Back".to_string()], 0)?;
            if choice == 1 {
                nav.go_back()?;
                return Ok(());
            }
        }

        loop {
            match nav.go_next() {
                Ok(stage) => {
                    debug!(?stage, "advanced");
                    return Ok(());
                }
                Err(NavigationError::ValidationFailed(unmet)) => {
                    let document = nav.document();
                    if let Some(stuck) = first_unanswerable(document, &unmet) {
                        return Err(DialoguerError::Unanswerable(stuck.clone()));
                    }
                    println!("Error: Please answer all required questions");
                    for id in &unmet {
                        if let Some(question) = document.question(id) {
                            self.ask(nav, question)?;
                        }
                    }
                }
                Err(NavigationError::SubmissionFailed(err)) => {
                    return self.retry_submission(nav, err);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn retry_submission<S: SubmissionSink>(
        &self,
        nav: &mut Navigator<'_, S>,
        mut err: anyhow::Error,
    ) -> Result<(), DialoguerError> {
        loop {
            println!("Error: Submission failed: {err:#}");
            if !self.confirm("Retry submission?", true)? {
                return Err(NavigationError::SubmissionFailed(err).into());
            }
            match nav.retry_submission() {
                Ok(()) => return Ok(()),
                Err(NavigationError::SubmissionFailed(next)) => err = next,
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Ask a single question and record the answer.
    fn ask<S: SubmissionSink>(
        &self,
        nav: &mut Navigator<'_, S>,
        question: &Question,
    ) -> Result<(), DialoguerError> {
        let id = question.id();
        let prompt = question.text();
        if let Some(description) = question.description() {
            println!("  {description}");
        }
        let current = nav.responses().get(id).cloned();

        if !question.kind().is_answerable() {
            println!("{prompt} (nothing to choose from)");
            return Ok(());
        }

        match question.kind() {
            QuestionKind::InfoDisplay => {
                println!("{prompt}");
            }

            QuestionKind::ShortText => {
                let initial = current.as_ref().and_then(ResponseValue::as_str).map(str::to_string);
                let text = self.input(prompt, initial, question.is_required())?;
                if text.trim().is_empty() {
                    nav.clear(id)?;
                } else {
                    nav.answer(id, Answer::Text(text))?;
                }
            }

            QuestionKind::SingleChoice(body) => {
                let items = choice_items(question.kind());
                let default = current
                    .as_ref()
                    .and_then(ResponseValue::as_str)
                    .and_then(|label| items.iter().position(|i| i == label))
                    .unwrap_or(0);
                let index = if body.is_dropdown {
                    self.fuzzy_select(prompt, &items, default)?
                } else {
                    self.select(prompt, &items, default)?
                };
                let label = &items[index];
                nav.answer(id, Answer::select(label))?;
                if label == OTHER_OPTION {
                    self.ask_other(nav, id)?;
                }
            }

            QuestionKind::MultiChoice(_) => {
                let items = choice_items(question.kind());
                let defaults: Vec<bool> = items
                    .iter()
                    .map(|item| current.as_ref().is_some_and(|v| v.contains(item)))
                    .collect();
                let picked = self.multi_select(prompt, &items, &defaults)?;
                for (index, item) in items.iter().enumerate() {
                    if picked.contains(&index) != defaults[index] {
                        nav.answer(id, Answer::select(item))?;
                    }
                }
                if picked.iter().any(|&index| items[index] == OTHER_OPTION) {
                    self.ask_other(nav, id)?;
                }
            }

            QuestionKind::RankedChoice(body) => {
                println!("{prompt}");
                let count = body.options.len();
                for option in &body.options {
                    let existing = current
                        .as_ref()
                        .and_then(ResponseValue::as_ranking)
                        .and_then(|ranks| ranks.get(option))
                        .map(|&rank| i64::from(rank));
                    let rank = self.input_rank(&format!("  {option} (1-{count})"), existing)?;
                    nav.answer(id, Answer::rank(option, rank))?;
                }
            }

            QuestionKind::GateChoice(body) => {
                let default = current
                    .as_ref()
                    .and_then(ResponseValue::as_str)
                    .and_then(|label| body.options.iter().position(|o| o == label))
                    .unwrap_or(0);
                let index = self.select(prompt, &body.options, default)?;
                nav.answer(id, Answer::select(&body.options[index]))?;
            }

            QuestionKind::RatingScale(rating) => {
                let items = rating_items(rating);
                let default = current
                    .as_ref()
                    .and_then(ResponseValue::as_str)
                    .and_then(|point| items.iter().position(|i| i == point))
                    .unwrap_or(0);
                let index = self.select(prompt, &items, default)?;
                nav.answer(id, Answer::select(&items[index]))?;
            }
        }

        Ok(())
    }

    fn ask_other<S: SubmissionSink>(
        &self,
        nav: &mut Navigator<'_, S>,
        id: &QuestionId,
    ) -> Result<(), DialoguerError> {
        let initial = nav.responses().other_text(id).map(str::to_string);
        let text = self.input("  Please specify", initial, true)?;
        nav.answer_other(id, text)?;
        Ok(())
    }

    // === Prompt builders ===

    fn theme(&self) -> Box<dyn Theme> {
        if self.colorful {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        }
    }

    fn input(
        &self,
        prompt: &str,
        initial: Option<String>,
        required: bool,
    ) -> Result<String, DialoguerError> {
        let theme = self.theme();
        let mut builder = Input::<String>::with_theme(theme.as_ref())
            .with_prompt(prompt)
            .allow_empty(!required);
        if let Some(initial) = initial {
            builder = builder.default(initial);
        }
        builder.interact_text().map_err(prompt_error)
    }

    fn input_rank(&self, prompt: &str, initial: Option<i64>) -> Result<i64, DialoguerError> {
        let theme = self.theme();
        let mut builder = Input::<i64>::with_theme(theme.as_ref()).with_prompt(prompt);
        if let Some(initial) = initial {
            builder = builder.default(initial);
        }
        builder.interact_text().map_err(prompt_error)
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize, DialoguerError> {
        let theme = self.theme();
        Select::with_theme(theme.as_ref())
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn fuzzy_select(
        &self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<usize, DialoguerError> {
        let theme = self.theme();
        FuzzySelect::with_theme(theme.as_ref())
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn multi_select(
        &self,
        prompt: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Vec<usize>, DialoguerError> {
        let theme = self.theme();
        MultiSelect::with_theme(theme.as_ref())
            .with_prompt(prompt)
            .items(items)
            .defaults(defaults)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, DialoguerError> {
        let theme = self.theme();
        Confirm::with_theme(theme.as_ref())
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }
}

/// The first of `unmet` that no prompt could ever satisfy.
fn first_unanswerable<'d>(document: &Document, unmet: &'d [QuestionId]) -> Option<&'d QuestionId> {
    unmet.iter().find(|id| {
        document
            .question(id)
            .is_some_and(|question| !question.kind().is_answerable())
    })
}

/// The labels offered for a choice question, "Other" last when allowed.
pub fn choice_items(kind: &QuestionKind) -> Vec<String> {
    let mut items = kind.options().to_vec();
    if kind.allows_other() && !items.iter().any(|item| item == OTHER_OPTION) {
        items.push(OTHER_OPTION.to_string());
    }
    items
}

/// The answers offered for a rating scale: custom labels on a labeled
/// scale, point numbers otherwise.
pub fn rating_items(rating: &RatingScaleQuestion) -> Vec<String> {
    match (&rating.rating_kind, &rating.custom_labels) {
        (RatingKind::Labeled, Some(labels)) => labels.clone(),
        _ => (1..=rating.points_on_scale).map(|p| p.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewalk::{MultiChoiceQuestion, QuestionType, RankedChoiceQuestion};

    #[test]
    fn runner_creation() {
        let _runner = DialoguerRunner::new();
        let _plain = DialoguerRunner::plain();
        assert!(DialoguerRunner::default().colorful);
    }

    #[test]
    fn error_types() {
        let err = DialoguerError::Cancelled;
        assert_eq!(err.to_string(), "Survey cancelled by user");

        let err = DialoguerError::from(NavigationError::HistoryEmpty);
        assert_eq!(err.to_string(), "No earlier page to go back to");
    }

    #[test]
    fn other_is_offered_last() {
        let mut body = MultiChoiceQuestion::new(vec!["Red".into(), "Blue".into()]);
        assert_eq!(choice_items(&QuestionKind::MultiChoice(body.clone())), vec!["Red", "Blue"]);
        body.allow_other = true;
        assert_eq!(
            choice_items(&QuestionKind::MultiChoice(body)),
            vec!["Red", "Blue", "Other"]
        );
        assert!(choice_items(&QuestionKind::default_for(QuestionType::ShortText)).is_empty());
    }

    #[test]
    fn literal_other_option_is_listed_once() {
        let mut body = MultiChoiceQuestion::new(vec!["Red".into(), OTHER_OPTION.into()]);
        body.allow_other = true;
        assert_eq!(
            choice_items(&QuestionKind::MultiChoice(body)),
            vec!["Red", "Other"]
        );
    }

    #[test]
    fn unanswerable_question_stops_the_retry_loop() {
        let mut document = Document::default();
        let empty = QuestionKind::RankedChoice(RankedChoiceQuestion::new(Vec::new()));
        document.pages[0]
            .questions
            .push(Question::new("Q1", "Rank", empty).required());
        document.pages[0].questions.push(
            Question::new("Q2", "Name", QuestionKind::default_for(QuestionType::ShortText))
                .required(),
        );

        let unmet = [QuestionId::new("Q2"), QuestionId::new("Q1")];
        assert_eq!(first_unanswerable(&document, &unmet), Some(&QuestionId::new("Q1")));
        assert_eq!(first_unanswerable(&document, &unmet[..1]), None);

        let err = DialoguerError::Unanswerable(QuestionId::new("Q1"));
        assert_eq!(
            err.to_string(),
            "Question 'Q1' is required but has nothing to choose from"
        );
    }

    #[test]
    fn rating_items_follow_scale_kind() {
        assert_eq!(rating_items(&RatingScaleQuestion::numeric(3)), vec!["1", "2", "3"]);
        let labeled = RatingScaleQuestion::labeled(vec!["Low".into(), "High".into()]);
        assert_eq!(rating_items(&labeled), vec!["Low", "High"]);
    }
}
