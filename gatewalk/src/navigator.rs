//! The runtime navigator: one run of a respondent through a document.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::{
    Document, JumpTarget, NavigationError, NextStep, OTHER_OPTION, Page, Question, QuestionId,
    QuestionKind, Responses, RevealState, SubmissionSink, ThankYouPage, WelcomePage, check_reveal_targets,
    flatten, gate_jump, resolve_next, resolve_start, unmet_required,
};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Welcome,
    /// A content page, by index into the document's page list.
    Survey(usize),
    ThankYou,
}

/// A respondent's input for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Free text for a `ShortText` question.
    Text(String),
    /// An option label: replaces the answer of single-choice, gate and
    /// rating questions, toggles membership for multi-choice.
    Select(String),
    /// A rank for one option of a ranked-choice question.
    Rank { option: String, rank: i64 },
}

impl Answer {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn select(label: impl Into<String>) -> Self {
        Self::Select(label.into())
    }

    pub fn rank(option: impl Into<String>, rank: i64) -> Self {
        Self::Rank {
            option: option.into(),
            rank,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Select(_) => "Select",
            Self::Rank { .. } => "Rank",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// The run has not ended yet.
    Pending,
    Submitted,
    /// The last attempt failed; see [`Navigator::retry_submission`].
    Failed,
}

/// What the current stage shows, independent of how it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    Welcome {
        page: &'a WelcomePage,
    },
    Page {
        page: &'a Page,
        /// The page's questions that are currently visible, in order.
        questions: Vec<&'a Question>,
        /// 1-based position of the page in the document.
        number: usize,
        total: usize,
    },
    ThankYou {
        page: &'a ThankYouPage,
    },
}

/// Walks a read-only document, collecting and validating answers.
///
/// A run goes `Welcome → Survey(..) → ThankYou`. Reaching the thank-you page
/// hands the flattened answers to the sink exactly once; the thank-you page
/// has no way out, a new run needs a new navigator.
#[derive(Debug)]
pub struct Navigator<'a, S: SubmissionSink> {
    document: &'a Document,
    sink: S,
    stage: Stage,
    history: Vec<(Stage, RevealState)>,
    responses: Responses,
    reveal: RevealState,
    submission: SubmissionStatus,
}

impl<'a, S: SubmissionSink> Navigator<'a, S> {
    pub fn new(document: &'a Document, sink: S) -> Self {
        info!(title = %document.title, pages = document.pages.len(), "starting run");
        Self {
            document,
            sink,
            stage: Stage::Welcome,
            history: Vec::new(),
            responses: Responses::new(),
            reveal: RevealState::new(),
            submission: SubmissionStatus::Pending,
        }
    }

    // === Answering ===

    /// Record an answer for a visible question on the current stage.
    ///
    /// Gate answers take effect immediately: the questions they reveal
    /// become visible (and subject to validation) before `go_next`.
    pub fn answer(&mut self, id: &QuestionId, answer: Answer) -> Result<(), NavigationError> {
        let question = self.current_question(id)?;
        let kind = question.kind();

        match (kind, answer) {
            (QuestionKind::ShortText, Answer::Text(text)) => {
                self.responses.insert(id.clone(), text);
            }
            (QuestionKind::SingleChoice(_), Answer::Select(label)) => {
                ensure_option(question, &label)?;
                self.responses.insert(id.clone(), label);
            }
            (QuestionKind::MultiChoice(_), Answer::Select(label)) => {
                ensure_option(question, &label)?;
                let mut choices = self
                    .responses
                    .get(id)
                    .and_then(|v| v.as_choices())
                    .map(<[String]>::to_vec)
                    .unwrap_or_default();
                match choices.iter().position(|c| *c == label) {
                    Some(index) => {
                        choices.remove(index);
                    }
                    None => choices.push(label),
                }
                self.responses.insert(id.clone(), choices);
            }
            (QuestionKind::RankedChoice(body), Answer::Rank { option, rank }) => {
                ensure_option(question, &option)?;
                let max = i64::try_from(body.options.len()).unwrap_or(i64::MAX);
                let clamped = u32::try_from(rank.clamp(1, max)).unwrap_or(u32::MAX);
                if clamped as i64 != rank {
                    debug!(question = %id, %option, rank, clamped, "clamped rank");
                }
                let mut ranks: BTreeMap<String, u32> = self
                    .responses
                    .get(id)
                    .and_then(|v| v.as_ranking())
                    .cloned()
                    .unwrap_or_default();
                ranks.insert(option, clamped);
                self.responses.insert(id.clone(), ranks);
            }
            (QuestionKind::GateChoice(_), Answer::Select(label)) => {
                ensure_option(question, &label)?;
                check_reveal_targets(self.document, question, &label).map_err(|branch| {
                    warn!(question = %id, %branch, "gate answer reveals a missing question");
                    NavigationError::BrokenBranch(branch)
                })?;
                self.responses.insert(id.clone(), label);
            }
            (QuestionKind::RatingScale(rating), Answer::Select(point)) => {
                if !rating.accepts(&point) {
                    return Err(NavigationError::UnknownOption {
                        id: id.clone(),
                        option: point,
                    });
                }
                self.responses.insert(id.clone(), point.trim());
            }
            (kind, answer) => {
                return Err(NavigationError::TypeMismatch {
                    id: id.clone(),
                    expected: expected_answer(kind),
                    actual: answer.kind_name(),
                });
            }
        }

        self.reveal.refresh(self.document, &self.responses);
        debug!(question = %id, revealed = self.reveal.len(), "recorded answer");
        Ok(())
    }

    /// Record the free text that goes with an "Other" selection.
    pub fn answer_other(&mut self, id: &QuestionId, text: impl Into<String>) -> Result<(), NavigationError> {
        let question = self.current_question(id)?;
        if !question.kind().allows_other() {
            return Err(NavigationError::UnknownOption {
                id: id.clone(),
                option: OTHER_OPTION.to_string(),
            });
        }
        self.responses.set_other_text(id.clone(), text);
        debug!(question = %id, "recorded other text");
        Ok(())
    }

    /// Forget the answer to a question on the current stage.
    pub fn clear(&mut self, id: &QuestionId) -> Result<(), NavigationError> {
        self.current_question(id)?;
        self.responses.remove(id);
        self.responses.clear_other_text(id);
        self.reveal.refresh(self.document, &self.responses);
        debug!(question = %id, "cleared answer");
        Ok(())
    }

    // === Moving ===

    /// Validate the current stage and move on.
    ///
    /// Nothing changes when validation fails or the next step is a broken
    /// branch. Moving past the last page ends the run and submits; if that
    /// submission fails the run still ends, the error is returned and the
    /// answers are kept for [`Navigator::retry_submission`].
    pub fn go_next(&mut self) -> Result<Stage, NavigationError> {
        let next = match self.stage {
            Stage::Welcome => {
                let welcome = &self.document.welcome_page.question;
                self.validate([welcome], true)?;
                self.step_to(resolve_start(self.document))
            }
            Stage::Survey(index) => {
                let page = &self.document.pages[index];
                self.validate(&page.questions, false)?;
                let step = resolve_next(self.document, &page.id, &self.responses, &self.reveal)
                    .map_err(|err| {
                        warn!(page = %page.id, error = %err, "cannot leave page");
                        NavigationError::from(err)
                    })?;
                self.step_to(step)
            }
            Stage::ThankYou => return Err(NavigationError::Finished),
        };

        self.history.push((self.stage, self.reveal.clone()));
        self.stage = next;
        self.reveal.refresh(self.document, &self.responses);
        debug!(stage = ?next, history = self.history.len(), "moved forward");

        if next == Stage::ThankYou {
            info!(answers = self.responses.len(), "run finished");
            self.submit()?;
        }
        Ok(next)
    }

    /// Return to the previously visited stage, restoring its visibility.
    pub fn go_back(&mut self) -> Result<Stage, NavigationError> {
        if self.stage == Stage::ThankYou {
            return Err(NavigationError::Finished);
        }
        let (stage, reveal) = self.history.pop().ok_or(NavigationError::HistoryEmpty)?;
        self.stage = stage;
        self.reveal = reveal;
        debug!(stage = ?stage, history = self.history.len(), "moved back");
        Ok(stage)
    }

    /// Send the retained answers again after a failed submission.
    pub fn retry_submission(&mut self) -> Result<(), NavigationError> {
        match (self.stage, self.submission) {
            (Stage::ThankYou, SubmissionStatus::Submitted) => Err(NavigationError::AlreadySubmitted),
            (Stage::ThankYou, _) => self.submit(),
            _ => Err(NavigationError::NotFinished),
        }
    }

    // === Accessors ===

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn into_responses(self) -> Responses {
        self.responses
    }

    pub fn reveal_state(&self) -> &RevealState {
        &self.reveal
    }

    pub fn can_go_back(&self) -> bool {
        self.stage != Stage::ThankYou && !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.submission
    }

    /// The content page being shown, if any.
    pub fn current_page(&self) -> Option<&'a Page> {
        match self.stage {
            Stage::Survey(index) => self.document.pages.get(index),
            Stage::Welcome | Stage::ThankYou => None,
        }
    }

    pub fn view(&self) -> View<'a> {
        let document = self.document;
        match self.stage {
            Stage::Welcome => View::Welcome {
                page: &document.welcome_page,
            },
            Stage::Survey(index) => {
                let page = &document.pages[index];
                View::Page {
                    page,
                    questions: page
                        .questions
                        .iter()
                        .filter(|q| self.reveal.is_visible(q))
                        .collect(),
                    number: index + 1,
                    total: document.pages.len(),
                }
            }
            Stage::ThankYou => View::ThankYou {
                page: &document.thank_you_page,
            },
        }
    }

    /// Whether `id` is currently shown. Unknown ids are not.
    pub fn is_visible(&self, id: &QuestionId) -> bool {
        self.document
            .question(id)
            .is_some_and(|q| self.reveal.is_visible(q))
    }

    /// The jump the current page's gates have selected so far.
    pub fn pending_jump(&self) -> Option<&'a JumpTarget> {
        let page = self.current_page()?;
        gate_jump(page, &self.responses, &self.reveal).map(|(_, target)| target)
    }

    // === Internals ===

    fn current_question(&self, id: &QuestionId) -> Result<&'a Question, NavigationError> {
        let document = self.document;
        let found = match self.stage {
            Stage::Welcome => {
                Some(&document.welcome_page.question).filter(|q| q.id() == id)
            }
            Stage::Survey(index) => document.pages.get(index).and_then(|p| p.question(id)),
            Stage::ThankYou => return Err(NavigationError::Finished),
        };

        match found {
            Some(question) if self.reveal.is_visible(question) => Ok(question),
            Some(_) => Err(NavigationError::QuestionHidden(id.clone())),
            None if document.question(id).is_some() => {
                Err(NavigationError::NotOnCurrentPage(id.clone()))
            }
            None => Err(NavigationError::UnknownQuestion(id.clone())),
        }
    }

    fn validate<'q>(
        &self,
        questions: impl IntoIterator<Item = &'q Question>,
        identity: bool,
    ) -> Result<(), NavigationError> {
        let unmet = unmet_required(questions, &self.responses, &self.reveal, identity);
        if unmet.is_empty() {
            Ok(())
        } else {
            debug!(unmet = unmet.len(), "validation failed");
            Err(NavigationError::ValidationFailed(unmet))
        }
    }

    fn step_to(&self, step: NextStep) -> Stage {
        match step {
            NextStep::AdvanceTo(page) => match self.document.page_index(&page) {
                Some(index) => Stage::Survey(index),
                None => Stage::ThankYou,
            },
            NextStep::End => Stage::ThankYou,
        }
    }

    fn submit(&mut self) -> Result<(), NavigationError> {
        let payload = flatten(self.document, &self.responses, &self.reveal);
        match self.sink.submit(&payload) {
            Ok(()) => {
                self.submission = SubmissionStatus::Submitted;
                info!(fields = payload.len(), "submitted responses");
                Ok(())
            }
            Err(err) => {
                let err: anyhow::Error = err.into();
                self.submission = SubmissionStatus::Failed;
                warn!(error = %err, "submission failed, responses kept");
                Err(NavigationError::SubmissionFailed(err))
            }
        }
    }
}

fn ensure_option(question: &Question, label: &str) -> Result<(), NavigationError> {
    if question.kind().accepts_option(label) {
        Ok(())
    } else {
        Err(NavigationError::UnknownOption {
            id: question.id().clone(),
            option: label.to_string(),
        })
    }
}

fn expected_answer(kind: &QuestionKind) -> &'static str {
    match kind {
        QuestionKind::ShortText => "Text",
        QuestionKind::RankedChoice(_) => "Rank",
        QuestionKind::SingleChoice(_)
        | QuestionKind::MultiChoice(_)
        | QuestionKind::GateChoice(_)
        | QuestionKind::RatingScale(_) => "Select",
        QuestionKind::InfoDisplay => "no",
    }
}
