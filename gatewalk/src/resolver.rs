//! The branching resolver: which page comes after the current one.
//!
//! Resolution order for a content page:
//! 1. the last visible gate (in question order) whose selected option carries a `Jump`,
//! 2. the page's explicit `nextPage`,
//! 3. the following page in document order, or the end of the survey.
//!
//! `Reveal` actions never change the page; see [`crate::RevealState`].

use crate::{
    BrokenBranch, Document, JumpTarget, Page, PageId, QuestionId, ResolveError, Responses,
    RevealState,
};

/// The navigation decision for a "next" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    AdvanceTo(PageId),
    End,
}

/// Decide where to go after the welcome page.
pub fn resolve_start(document: &Document) -> NextStep {
    match document.pages.first() {
        Some(page) => NextStep::AdvanceTo(page.id.clone()),
        None => NextStep::End,
    }
}

/// Decide where to go after `current`.
///
/// Pure: identical inputs always produce the same step. A target that does
/// not exist in `document` is reported as [`BrokenBranch`].
pub fn resolve_next(
    document: &Document,
    current: &PageId,
    responses: &Responses,
    reveal: &RevealState,
) -> Result<NextStep, ResolveError> {
    let index = document
        .page_index(current)
        .ok_or_else(|| ResolveError::UnknownPage(current.clone()))?;
    let page = &document.pages[index];

    if let Some((_, target)) = gate_jump(page, responses, reveal) {
        return match target {
            JumpTarget::End => Ok(NextStep::End),
            JumpTarget::Page(target) => existing(document, current, target),
        };
    }

    if let Some(target) = &page.next_page {
        return existing(document, current, target);
    }

    Ok(match document.pages.get(index + 1) {
        Some(next) => NextStep::AdvanceTo(next.id.clone()),
        None => NextStep::End,
    })
}

/// The jump selected on `page`, together with the gate that selected it.
///
/// When several visible gates have a jump selected, the last one wins.
pub fn gate_jump<'a>(
    page: &'a Page,
    responses: &Responses,
    reveal: &RevealState,
) -> Option<(&'a QuestionId, &'a JumpTarget)> {
    page.questions
        .iter()
        .filter(|q| reveal.is_visible(q))
        .filter_map(|q| {
            let gate = q.as_gate()?;
            let label = responses.get(q.id())?.as_str()?;
            gate.jump_for(label).map(|target| (q.id(), target))
        })
        .last()
}

fn existing(document: &Document, from: &PageId, target: &PageId) -> Result<NextStep, ResolveError> {
    if document.page(target).is_some() {
        Ok(NextStep::AdvanceTo(target.clone()))
    } else {
        Err(BrokenBranch::MissingPage {
            from: from.clone(),
            target: target.clone(),
        }
        .into())
    }
}
