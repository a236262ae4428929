use tracing::debug;

use crate::{
    Document, OTHER_OPTION, OTHER_SUFFIX, ResponseValue, Responses, RevealState, SubmissionPayload,
};

/// Separator used when a collection answer is flattened to one string.
pub const LIST_SEPARATOR: &str = ", ";

/// Flatten a run's answers into one scalar string per key.
///
/// Choices are joined with [`LIST_SEPARATOR`]; rankings become
/// `label=rank` pairs in option order. "Other" companions are emitted
/// under `{id}_other`. Answers to reveal-children that are hidden are
/// left out, but stay in `responses`.
pub fn flatten(document: &Document, responses: &Responses, reveal: &RevealState) -> SubmissionPayload {
    let mut payload = SubmissionPayload::new();

    for (id, value) in responses {
        let question = document.question(id);
        if let Some(question) = question
            && !reveal.is_visible(question)
        {
            debug!(question = %id, "leaving hidden answer out of submission");
            continue;
        }

        let flat = match value {
            ResponseValue::Text(text) => text.clone(),
            ResponseValue::Choices(choices) => choices.join(LIST_SEPARATOR),
            ResponseValue::Ranking(ranks) => {
                let order = question.map(|q| q.kind().options()).unwrap_or_default();
                let mut pairs: Vec<(&String, &u32)> = ranks.iter().collect();
                pairs.sort_by_key(|(label, _)| {
                    order.iter().position(|o| o == *label).unwrap_or(usize::MAX)
                });
                pairs
                    .into_iter()
                    .map(|(label, rank)| format!("{label}={rank}"))
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR)
            }
        };
        payload.insert(id.as_str(), flat);

        let picked_other = question.is_some_and(|q| q.kind().allows_other())
            && value.contains(OTHER_OPTION);
        if picked_other && let Some(text) = responses.other_text(id) {
            payload.insert(format!("{id}{OTHER_SUFFIX}"), text);
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MultiChoiceQuestion, Question, QuestionKind, QuestionType, RankedChoiceQuestion};

    fn document() -> Document {
        let mut doc = Document::default();
        let mut multi = MultiChoiceQuestion::new(vec!["Red".into(), "Blue".into()]);
        multi.allow_other = true;
        doc.pages[0]
            .questions
            .push(Question::new("Q1", "Colours", QuestionKind::MultiChoice(multi)));
        doc.pages[0].questions.push(Question::new(
            "Q2",
            "Rank",
            QuestionKind::RankedChoice(RankedChoiceQuestion::new(vec![
                "Zeta".into(),
                "Alpha".into(),
            ])),
        ));
        let mut hidden = Question::new("Q3", "Hidden", QuestionKind::default_for(QuestionType::ShortText));
        hidden.set_parent_id(Some("Q9".into()));
        doc.pages[0].questions.push(hidden);
        doc
    }

    #[test]
    fn flattens_collections_and_other() {
        let doc = document();
        let mut responses = Responses::new();
        responses.insert("email", "a@b.c");
        responses.insert("Q1", vec!["Blue".to_string(), "Other".to_string()]);
        responses.set_other_text("Q1", "Green");
        let mut ranks: BTreeMap<String, u32> = BTreeMap::new();
        ranks.insert("Alpha".to_string(), 1);
        ranks.insert("Zeta".to_string(), 2);
        responses.insert("Q2", ranks);

        let payload = flatten(&doc, &responses, &RevealState::new());
        let expected: BTreeMap<String, String> = [
            ("email", "a@b.c"),
            ("Q1", "Blue, Other"),
            ("Q1_other", "Green"),
            ("Q2", "Zeta=2, Alpha=1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(payload.into_inner(), expected);
    }

    #[test]
    fn hidden_answers_are_left_out() {
        let doc = document();
        let mut responses = Responses::new();
        responses.insert("Q3", "stale");
        let payload = flatten(&doc, &responses, &RevealState::new());
        assert!(payload.is_empty());
        assert!(responses.contains(&"Q3".into()));
    }
}
