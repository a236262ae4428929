use crate::{OTHER_OPTION, Question, QuestionId, QuestionKind, ResponseValue, Responses, RevealState};

/// Character an identity answer on the welcome page must contain.
pub const IDENTITY_MARKER: char = '@';

/// Check whether `question` has an acceptable answer in `responses`.
///
/// `identity` marks the welcome page's contact question, whose text
/// answer must also contain [`IDENTITY_MARKER`].
pub fn is_answered(question: &Question, responses: &Responses, identity: bool) -> bool {
    let value = responses.get(question.id());
    let answered = match question.kind() {
        QuestionKind::InfoDisplay => return true,
        QuestionKind::ShortText => match value {
            Some(ResponseValue::Text(text)) => {
                let text = text.trim();
                !text.is_empty() && (!identity || text.contains(IDENTITY_MARKER))
            }
            _ => false,
        },
        QuestionKind::MultiChoice(_) => {
            matches!(value, Some(ResponseValue::Choices(choices)) if !choices.is_empty())
        }
        QuestionKind::RankedChoice(_) => {
            matches!(value, Some(ResponseValue::Ranking(ranks)) if !ranks.is_empty())
        }
        QuestionKind::SingleChoice(_) | QuestionKind::GateChoice(_) | QuestionKind::RatingScale(_) => {
            value.is_some_and(|v| !v.is_empty())
        }
    };

    answered && other_companion_present(question, value, responses)
}

fn other_companion_present(
    question: &Question,
    value: Option<&ResponseValue>,
    responses: &Responses,
) -> bool {
    let picked_other = question.kind().allows_other()
        && value.is_some_and(|v| v.contains(OTHER_OPTION));
    !picked_other
        || responses
            .other_text(question.id())
            .is_some_and(|text| !text.trim().is_empty())
}

/// The required, visible, unanswered questions among `questions`, in order.
///
/// Hidden reveal-children never block progression, and neither do
/// questions with nothing to choose from.
pub fn unmet_required<'a>(
    questions: impl IntoIterator<Item = &'a Question>,
    responses: &Responses,
    reveal: &RevealState,
    identity: bool,
) -> Vec<QuestionId> {
    questions
        .into_iter()
        .filter(|q| q.is_required() && q.kind().is_answerable() && reveal.is_visible(q))
        .filter(|q| !is_answered(q, responses, identity))
        .map(|q| q.id().clone())
        .collect()
}
