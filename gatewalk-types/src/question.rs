use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{JumpTarget, QuestionId};

/// Reserved option label for the free-text "Other" choice.
pub const OTHER_OPTION: &str = "Other";

/// A single question in a survey document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Globally unique id; also the key of this question's response.
    id: QuestionId,

    /// The prompt text shown to the respondent.
    text: String,

    /// Optional help text shown below the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default)]
    required: bool,

    /// Weak back-reference to the gate that reveals this question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<QuestionId>,

    /// The kind of question (determines the answer shape).
    #[serde(flatten)]
    kind: QuestionKind,
}

impl Question {
    /// Create a new, optional, top-level question.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            description: None,
            required: false,
            parent_id: None,
            kind,
        }
    }

    /// Builder-style: mark the question as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Builder-style: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn set_id(&mut self, id: QuestionId) {
        self.id = id;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// The gate that reveals this question, if any.
    pub fn parent_id(&self) -> Option<&QuestionId> {
        self.parent_id.as_ref()
    }

    pub fn set_parent_id(&mut self, parent: Option<QuestionId>) {
        self.parent_id = parent;
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut QuestionKind {
        &mut self.kind
    }

    /// Shorthand for the gate body, if this is a gate question.
    pub fn as_gate(&self) -> Option<&GateQuestion> {
        match &self.kind {
            QuestionKind::GateChoice(gate) => Some(gate),
            _ => None,
        }
    }

    pub fn as_gate_mut(&mut self) -> Option<&mut GateQuestion> {
        match &mut self.kind {
            QuestionKind::GateChoice(gate) => Some(gate),
            _ => None,
        }
    }
}

/// The closed set of question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    ShortText,
    SingleChoice,
    MultiChoice,
    RankedChoice,
    GateChoice,
    RatingScale,
    InfoDisplay,
}

impl QuestionType {
    pub const ALL: [QuestionType; 7] = [
        Self::ShortText,
        Self::SingleChoice,
        Self::MultiChoice,
        Self::RankedChoice,
        Self::GateChoice,
        Self::RatingScale,
        Self::InfoDisplay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ShortText => "ShortText",
            Self::SingleChoice => "SingleChoice",
            Self::MultiChoice => "MultiChoice",
            Self::RankedChoice => "RankedChoice",
            Self::GateChoice => "GateChoice",
            Self::RatingScale => "RatingScale",
            Self::InfoDisplay => "InfoDisplay",
        }
    }
}

/// The kind of question together with its type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    /// Single-line free text.
    ShortText,

    /// Pick exactly one option.
    SingleChoice(SingleChoiceQuestion),

    /// Pick any number of options.
    MultiChoice(MultiChoiceQuestion),

    /// Assign a rank to options.
    RankedChoice(RankedChoiceQuestion),

    /// Pick one option; the option may jump to a page or reveal sub-questions.
    GateChoice(GateQuestion),

    /// Pick a point on a scale.
    RatingScale(RatingScaleQuestion),

    /// Static content, never answered.
    InfoDisplay,
}

impl QuestionKind {
    /// The body a freshly added question of the given type starts with.
    pub fn default_for(question_type: QuestionType) -> Self {
        let choice_options = || vec!["Option A".to_string(), "Option B".to_string()];
        match question_type {
            QuestionType::ShortText => Self::ShortText,
            QuestionType::SingleChoice => {
                Self::SingleChoice(SingleChoiceQuestion::new(choice_options()))
            }
            QuestionType::MultiChoice => {
                Self::MultiChoice(MultiChoiceQuestion::new(choice_options()))
            }
            QuestionType::RankedChoice => {
                Self::RankedChoice(RankedChoiceQuestion::new(choice_options()))
            }
            QuestionType::GateChoice => Self::GateChoice(GateQuestion::new(vec![
                "A".to_string(),
                "B".to_string(),
            ])),
            QuestionType::RatingScale => Self::RatingScale(RatingScaleQuestion::numeric(5)),
            QuestionType::InfoDisplay => Self::InfoDisplay,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::ShortText => QuestionType::ShortText,
            Self::SingleChoice(_) => QuestionType::SingleChoice,
            Self::MultiChoice(_) => QuestionType::MultiChoice,
            Self::RankedChoice(_) => QuestionType::RankedChoice,
            Self::GateChoice(_) => QuestionType::GateChoice,
            Self::RatingScale(_) => QuestionType::RatingScale,
            Self::InfoDisplay => QuestionType::InfoDisplay,
        }
    }

    /// Check if this kind carries an option list.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::SingleChoice(_) | Self::MultiChoice(_) | Self::RankedChoice(_) | Self::GateChoice(_)
        )
    }

    /// The option labels; empty for kinds without options.
    pub fn options(&self) -> &[String] {
        match self {
            Self::SingleChoice(q) => &q.options,
            Self::MultiChoice(q) => &q.options,
            Self::RankedChoice(q) => &q.options,
            Self::GateChoice(q) => &q.options,
            Self::ShortText | Self::RatingScale(_) | Self::InfoDisplay => &[],
        }
    }

    /// The editor-maintained option count (not authoritative).
    pub fn option_quantity(&self) -> Option<usize> {
        match self {
            Self::SingleChoice(q) => Some(q.option_quantity),
            Self::MultiChoice(q) => Some(q.option_quantity),
            Self::RankedChoice(q) => Some(q.option_quantity),
            Self::GateChoice(q) => Some(q.option_quantity),
            Self::ShortText | Self::RatingScale(_) | Self::InfoDisplay => None,
        }
    }

    /// Replace the option list and resync the quantity.
    ///
    /// Returns `false` (and changes nothing) for kinds without options.
    /// Gate actions are not touched here; see [`GateQuestion::set_options`].
    pub fn set_options(&mut self, options: Vec<String>) -> bool {
        let (slot, quantity) = match self {
            Self::SingleChoice(q) => (&mut q.options, &mut q.option_quantity),
            Self::MultiChoice(q) => (&mut q.options, &mut q.option_quantity),
            Self::RankedChoice(q) => (&mut q.options, &mut q.option_quantity),
            Self::GateChoice(q) => {
                q.set_options(options);
                return true;
            }
            Self::ShortText | Self::RatingScale(_) | Self::InfoDisplay => return false,
        };
        *quantity = options.len();
        *slot = options;
        true
    }

    /// Whether the free-text "Other" option is enabled.
    pub fn allows_other(&self) -> bool {
        match self {
            Self::SingleChoice(q) => q.allow_other,
            Self::MultiChoice(q) => q.allow_other,
            _ => false,
        }
    }

    /// Check whether `label` is a selectable option of this question.
    pub fn accepts_option(&self, label: &str) -> bool {
        self.options().iter().any(|o| o == label) || (self.allows_other() && label == OTHER_OPTION)
    }

    /// Whether a respondent has anything to pick or type.
    ///
    /// False for choice questions without options (and without "Other")
    /// and for rating scales without points.
    pub fn is_answerable(&self) -> bool {
        match self {
            Self::RatingScale(rating) => rating.points_on_scale > 0,
            kind if kind.is_choice() => !kind.options().is_empty() || kind.allows_other(),
            _ => true,
        }
    }
}

/// Configuration for a single-choice question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoiceQuestion {
    pub options: Vec<String>,
    pub option_quantity: usize,

    /// Render as a dropdown instead of radio buttons.
    #[serde(default)]
    pub is_dropdown: bool,

    /// Offer an extra "Other" option with a free-text companion.
    #[serde(default)]
    pub allow_other: bool,
}

impl SingleChoiceQuestion {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            option_quantity: options.len(),
            options,
            is_dropdown: false,
            allow_other: false,
        }
    }
}

/// Presentation style of a multi-choice question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceVariant {
    #[default]
    Standard,
    Bubble,
}

/// Configuration for a multi-choice question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceQuestion {
    pub options: Vec<String>,
    pub option_quantity: usize,

    #[serde(default)]
    pub variant: ChoiceVariant,

    #[serde(default)]
    pub allow_other: bool,
}

impl MultiChoiceQuestion {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            option_quantity: options.len(),
            options,
            variant: ChoiceVariant::Standard,
            allow_other: false,
        }
    }
}

/// Configuration for a ranked-choice question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedChoiceQuestion {
    pub options: Vec<String>,
    pub option_quantity: usize,
}

impl RankedChoiceQuestion {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            option_quantity: options.len(),
            options,
        }
    }
}

/// Whether a gate's options jump to pages or reveal sub-questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateKind {
    #[default]
    Jump,
    Reveal,
}

/// What choosing a gate option does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    /// Continue at another page (or end the survey) after this page.
    Jump { target: JumpTarget },

    /// Show these sub-questions inline on the same page.
    Reveal { targets: Vec<QuestionId> },
}

impl Action {
    pub fn jump(target: impl Into<JumpTarget>) -> Self {
        Self::Jump {
            target: target.into(),
        }
    }

    pub fn reveal(targets: Vec<QuestionId>) -> Self {
        Self::Reveal { targets }
    }

    /// Check if this action matches the gate kind.
    pub fn matches_kind(&self, kind: GateKind) -> bool {
        matches!(
            (self, kind),
            (Self::Jump { .. }, GateKind::Jump) | (Self::Reveal { .. }, GateKind::Reveal)
        )
    }
}

/// Configuration for a gate question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateQuestion {
    pub options: Vec<String>,
    pub option_quantity: usize,

    #[serde(default)]
    pub gate_kind: GateKind,

    /// At most one action per option label, keyed in option order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub actions: IndexMap<String, Action>,
}

impl GateQuestion {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            option_quantity: options.len(),
            options,
            gate_kind: GateKind::Jump,
            actions: IndexMap::new(),
        }
    }

    /// Replace the options, keeping actions of surviving labels and
    /// dropping actions of removed ones.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.actions.retain(|label, _| options.contains(label));
        self.option_quantity = options.len();
        self.options = options;
    }

    pub fn action(&self, label: &str) -> Option<&Action> {
        self.actions.get(label)
    }

    /// The jump target bound to `label`, if it carries a `Jump`.
    pub fn jump_for(&self, label: &str) -> Option<&JumpTarget> {
        match self.actions.get(label) {
            Some(Action::Jump { target }) => Some(target),
            _ => None,
        }
    }

    /// The sub-questions revealed by `label`.
    pub fn reveal_targets(&self, label: &str) -> &[QuestionId] {
        match self.actions.get(label) {
            Some(Action::Reveal { targets }) => targets,
            _ => &[],
        }
    }

    /// All reveal targets across every option, in option order.
    pub fn all_reveal_targets(&self) -> impl Iterator<Item = &QuestionId> {
        self.actions.values().flat_map(|action| match action {
            Action::Reveal { targets } => targets.as_slice(),
            Action::Jump { .. } => &[],
        })
    }
}

/// How a rating scale labels its points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingKind {
    #[default]
    Numeric,
    Labeled,
}

/// Configuration for a rating-scale question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingScaleQuestion {
    pub points_on_scale: u32,

    #[serde(default)]
    pub rating_kind: RatingKind,

    /// One label per point when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_labels: Option<Vec<String>>,
}

impl RatingScaleQuestion {
    /// A numeric scale `1..=points`.
    pub fn numeric(points: u32) -> Self {
        Self {
            points_on_scale: points,
            rating_kind: RatingKind::Numeric,
            custom_labels: None,
        }
    }

    /// A labeled scale with one point per label.
    pub fn labeled(labels: Vec<String>) -> Self {
        Self {
            points_on_scale: u32::try_from(labels.len()).unwrap_or(u32::MAX),
            rating_kind: RatingKind::Labeled,
            custom_labels: Some(labels),
        }
    }

    /// Check the `customLabels` length invariant.
    pub fn labels_consistent(&self) -> bool {
        self.custom_labels
            .as_ref()
            .is_none_or(|labels| labels.len() == self.points_on_scale as usize)
    }

    /// Check whether `answer` names a point on this scale.
    pub fn accepts(&self, answer: &str) -> bool {
        if let Ok(point) = answer.trim().parse::<u32>()
            && (1..=self.points_on_scale).contains(&point)
        {
            return true;
        }
        self.rating_kind == RatingKind::Labeled
            && self
                .custom_labels
                .as_ref()
                .is_some_and(|labels| labels.iter().any(|l| l == answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_set_options_drops_removed_actions() {
        let mut gate = GateQuestion::new(vec!["A".into(), "B".into()]);
        gate.actions.insert("A".into(), Action::jump("p2"));
        gate.actions.insert("B".into(), Action::jump(JumpTarget::End));

        gate.set_options(vec!["B".into(), "C".into()]);

        assert_eq!(gate.option_quantity, 2);
        assert!(gate.action("A").is_none());
        assert_eq!(gate.jump_for("B"), Some(&JumpTarget::End));
    }

    #[test]
    fn set_options_rejected_for_text() {
        let mut kind = QuestionKind::ShortText;
        assert!(!kind.set_options(vec!["x".into()]));
    }

    #[test]
    fn rating_accepts_points_and_labels() {
        let numeric = RatingScaleQuestion::numeric(5);
        assert!(numeric.accepts("1"));
        assert!(numeric.accepts("5"));
        assert!(!numeric.accepts("0"));
        assert!(!numeric.accepts("6"));

        let labeled = RatingScaleQuestion::labeled(vec!["Bad".into(), "Good".into()]);
        assert!(labeled.accepts("Good"));
        assert!(labeled.accepts("2"));
        assert!(!labeled.accepts("Great"));
        assert!(labeled.labels_consistent());
    }

    #[test]
    fn other_option_only_when_enabled() {
        let mut single = SingleChoiceQuestion::new(vec!["Red".into()]);
        assert!(!QuestionKind::SingleChoice(single.clone()).accepts_option(OTHER_OPTION));
        single.allow_other = true;
        assert!(QuestionKind::SingleChoice(single).accepts_option(OTHER_OPTION));
    }

    #[test]
    fn empty_choice_lists_are_unanswerable() {
        let mut ranked = QuestionKind::RankedChoice(RankedChoiceQuestion::new(Vec::new()));
        assert!(!ranked.is_answerable());
        ranked.set_options(vec!["Speed".into()]);
        assert!(ranked.is_answerable());

        let mut single = SingleChoiceQuestion::new(Vec::new());
        assert!(!QuestionKind::SingleChoice(single.clone()).is_answerable());
        single.allow_other = true;
        assert!(QuestionKind::SingleChoice(single).is_answerable());

        assert!(QuestionKind::ShortText.is_answerable());
        let mut rating = RatingScaleQuestion::numeric(3);
        rating.points_on_scale = 0;
        assert!(!QuestionKind::RatingScale(rating).is_answerable());
    }

    #[test]
    fn question_serializes_with_type_tag() {
        let question = Question::new(
            "Q1",
            "Pick one",
            QuestionKind::default_for(QuestionType::GateChoice),
        )
        .required();
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "GateChoice");
        assert_eq!(json["optionQuantity"], 2);
        assert_eq!(json["gateKind"], "Jump");
        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, question);
    }
}
