//! Structural checks over a whole document.
//!
//! The same checks gate [`crate::load`] and back [`crate::Editor::problems`].

use std::collections::{HashMap, HashSet};

use crate::{
    Action, Document, DocumentProblem, END_SENTINEL, JumpTarget, OTHER_OPTION, PageId, Question,
    QuestionId, QuestionKind, QuestionLocation,
};

/// Collect every structural problem of `document`, in document order.
///
/// An empty result means ids are unique and every jump, reveal, parent and
/// next-page reference resolves inside the document.
pub fn problems(document: &Document) -> Vec<DocumentProblem> {
    let mut problems = Vec::new();

    let mut seen_questions = HashSet::new();
    for question in document.questions() {
        if !seen_questions.insert(question.id()) {
            problems.push(DocumentProblem::DuplicateQuestionId(question.id().clone()));
        }
    }

    let mut seen_pages = HashSet::new();
    for page in &document.pages {
        if !seen_pages.insert(&page.id) {
            problems.push(DocumentProblem::DuplicatePageId(page.id.clone()));
        }
        if page.id.as_str() == END_SENTINEL {
            problems.push(DocumentProblem::ReservedPageId(page.id.clone()));
        }
    }

    for page in &document.pages {
        if let Some(target) = &page.next_page
            && !seen_pages.contains(target)
        {
            problems.push(DocumentProblem::DanglingNextPage {
                page: page.id.clone(),
                target: target.clone(),
            });
        }
    }

    let locations: HashMap<&QuestionId, QuestionLocation> = document
        .questions()
        .filter_map(|q| document.locate(q.id()).map(|loc| (q.id(), loc)))
        .collect();

    for question in document.questions() {
        check_gate(document, question, &seen_pages, &locations, &mut problems);
        check_parent(document, question, &mut problems);

        if question.is_required() && !question.kind().is_answerable() {
            problems.push(DocumentProblem::Unanswerable(question.id().clone()));
        }

        let kind = question.kind();
        if kind.allows_other() && kind.options().iter().any(|o| o == OTHER_OPTION) {
            problems.push(DocumentProblem::OtherOptionClash(question.id().clone()));
        }

        if let QuestionKind::RatingScale(rating) = question.kind()
            && !rating.labels_consistent()
        {
            problems.push(DocumentProblem::LabelCountMismatch {
                question: question.id().clone(),
                points: rating.points_on_scale,
                labels: rating.custom_labels.as_ref().map_or(0, Vec::len),
            });
        }
    }

    problems
}

fn check_gate(
    document: &Document,
    question: &Question,
    pages: &HashSet<&PageId>,
    locations: &HashMap<&QuestionId, QuestionLocation>,
    problems: &mut Vec<DocumentProblem>,
) {
    let Some(gate) = question.as_gate() else {
        return;
    };
    let gate_id = question.id();

    for (option, action) in &gate.actions {
        if !gate.options.contains(option) {
            problems.push(DocumentProblem::ActionForUnknownOption {
                gate: gate_id.clone(),
                option: option.clone(),
            });
        }
        if !action.matches_kind(gate.gate_kind) {
            problems.push(DocumentProblem::ActionKindMismatch {
                gate: gate_id.clone(),
                option: option.clone(),
            });
        }

        match action {
            Action::Jump {
                target: JumpTarget::Page(target),
            } if !pages.contains(target) => {
                problems.push(DocumentProblem::DanglingJump {
                    gate: gate_id.clone(),
                    option: option.clone(),
                    target: target.clone(),
                });
            }
            Action::Jump { .. } => {}
            Action::Reveal { targets } => {
                for target in targets {
                    let Some(child) = document.question(target) else {
                        problems.push(DocumentProblem::DanglingReveal {
                            gate: gate_id.clone(),
                            option: option.clone(),
                            target: target.clone(),
                        });
                        continue;
                    };
                    if child.parent_id() != Some(gate_id) {
                        problems.push(DocumentProblem::UnpairedReveal {
                            gate: gate_id.clone(),
                            target: target.clone(),
                        });
                    }
                    if !same_page(locations.get(gate_id), locations.get(target)) {
                        problems.push(DocumentProblem::RevealOffPage {
                            gate: gate_id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn same_page(a: Option<&QuestionLocation>, b: Option<&QuestionLocation>) -> bool {
    match (a, b) {
        (Some(QuestionLocation::Page { page: pa, .. }), Some(QuestionLocation::Page { page: pb, .. })) => {
            pa == pb
        }
        _ => false,
    }
}

fn check_parent(document: &Document, question: &Question, problems: &mut Vec<DocumentProblem>) {
    let Some(parent_id) = question.parent_id() else {
        return;
    };
    let Some(parent) = document.question(parent_id) else {
        problems.push(DocumentProblem::DanglingParent {
            question: question.id().clone(),
            parent: parent_id.clone(),
        });
        return;
    };

    let revealed_by_parent = parent
        .as_gate()
        .is_some_and(|gate| gate.all_reveal_targets().any(|t| t == question.id()));
    if !revealed_by_parent {
        problems.push(DocumentProblem::UnpairedParent {
            question: question.id().clone(),
            parent: parent_id.clone(),
        });
    }

    if in_parent_cycle(document, question) {
        problems.push(DocumentProblem::RevealCycle {
            question: question.id().clone(),
        });
    }
}

/// Follow parent links upwards; a cycle brings us back to the start.
fn in_parent_cycle(document: &Document, question: &Question) -> bool {
    let start = question.id();
    let mut visited = HashSet::new();
    let mut current = question.parent_id();
    while let Some(id) = current {
        if id == start {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = document.question(id).and_then(Question::parent_id);
    }
    false
}
