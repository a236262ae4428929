use std::collections::BTreeSet;

use crate::{BrokenBranch, Document, Question, QuestionId, Responses};

/// Which reveal-children are currently shown.
///
/// Top-level questions (no `parentId`) are always visible. A reveal-child
/// is visible while its gate is visible and the gate's selected option
/// reveals it. The set is rebuilt from the answers whenever a gate answer
/// changes, so nested reveals settle regardless of question order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealState {
    revealed: BTreeSet<QuestionId>,
}

impl RevealState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the revealed set from the current answers.
    pub fn from_responses(document: &Document, responses: &Responses) -> Self {
        let mut state = Self::new();
        state.refresh(document, responses);
        state
    }

    /// Rebuild the revealed set in place.
    pub fn refresh(&mut self, document: &Document, responses: &Responses) {
        self.revealed.clear();
        loop {
            let mut changed = false;
            for question in document.questions() {
                if !self.is_visible(question) {
                    continue;
                }
                let Some(gate) = question.as_gate() else {
                    continue;
                };
                let Some(label) = responses.get(question.id()).and_then(|v| v.as_str()) else {
                    continue;
                };
                for target in gate.reveal_targets(label) {
                    changed |= self.revealed.insert(target.clone());
                }
            }
            if !changed {
                break;
            }
        }
    }

    pub fn is_visible(&self, question: &Question) -> bool {
        question.parent_id().is_none() || self.revealed.contains(question.id())
    }

    pub fn is_revealed(&self, id: &QuestionId) -> bool {
        self.revealed.contains(id)
    }

    /// The revealed reveal-children, in id order.
    pub fn revealed(&self) -> impl Iterator<Item = &QuestionId> {
        self.revealed.iter()
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }
}

/// Check that every question `label` would reveal exists.
pub fn check_reveal_targets(
    document: &Document,
    gate: &Question,
    label: &str,
) -> Result<(), BrokenBranch> {
    let Some(body) = gate.as_gate() else {
        return Ok(());
    };
    match body
        .reveal_targets(label)
        .iter()
        .find(|target| document.question(target).is_none())
    {
        Some(missing) => Err(BrokenBranch::MissingQuestion {
            gate: gate.id().clone(),
            target: missing.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, GateKind, GateQuestion, QuestionKind};

    fn reveal_gate(id: &str, parent: Option<&str>, child: &str) -> Question {
        let mut body = GateQuestion::new(vec!["Yes".into(), "No".into()]);
        body.gate_kind = GateKind::Reveal;
        body.actions
            .insert("Yes".into(), Action::reveal(vec![QuestionId::new(child)]));
        let mut q = Question::new(id, "Gate", QuestionKind::GateChoice(body));
        q.set_parent_id(parent.map(QuestionId::new));
        q
    }

    fn nested() -> Document {
        let mut doc = Document::default();
        let mut leaf = Question::new("Q3", "Leaf", QuestionKind::ShortText);
        leaf.set_parent_id(Some(QuestionId::new("Q2")));
        // Leaf listed first to exercise the fixpoint.
        doc.pages[0].questions.push(leaf);
        doc.pages[0].questions.push(reveal_gate("Q2", Some("Q1"), "Q3"));
        doc.pages[0].questions.push(reveal_gate("Q1", None, "Q2"));
        doc
    }

    #[test]
    fn nothing_revealed_without_answers() {
        let doc = nested();
        let state = RevealState::from_responses(&doc, &Responses::new());
        assert!(state.is_empty());
        assert!(state.is_visible(&doc.pages[0].questions[2]));
        assert!(!state.is_visible(&doc.pages[0].questions[1]));
    }

    #[test]
    fn nested_reveals_settle() {
        let doc = nested();
        let mut responses = Responses::new();
        responses.insert("Q1", "Yes");
        responses.insert("Q2", "Yes");

        let state = RevealState::from_responses(&doc, &responses);
        assert!(state.is_revealed(&QuestionId::new("Q2")));
        assert!(state.is_revealed(&QuestionId::new("Q3")));
    }

    #[test]
    fn hidden_gate_reveals_nothing() {
        let doc = nested();
        let mut responses = Responses::new();
        responses.insert("Q1", "No");
        responses.insert("Q2", "Yes");

        let state = RevealState::from_responses(&doc, &responses);
        assert!(state.is_empty());
    }

    #[test]
    fn missing_reveal_target_is_broken() {
        let doc = Document::default();
        let gate = reveal_gate("Q1", None, "Q42");
        assert_eq!(
            check_reveal_targets(&doc, &gate, "Yes"),
            Err(BrokenBranch::MissingQuestion {
                gate: QuestionId::new("Q1"),
                target: QuestionId::new("Q42"),
            })
        );
        assert!(check_reveal_targets(&doc, &gate, "No").is_ok());
    }
}
