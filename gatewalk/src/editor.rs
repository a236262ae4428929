//! The document editor: every structural change to a [`Document`] goes
//! through here so ids stay unique and gate/child links stay paired.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::{
    Action, ChoiceVariant, Document, DocumentProblem, EditorError, GateKind, GateQuestion,
    JumpTarget, OTHER_OPTION, Page, PageId, Question, QuestionId, QuestionKind, QuestionLocation,
    QuestionType, RatingKind, RatingScaleQuestion, check, codec,
};

/// Text given to freshly added questions.
pub const NEW_QUESTION_TEXT: &str = "New Question";

/// Title given to freshly added pages.
pub const NEW_PAGE_TITLE: &str = "New Page";

/// What happens to the reveal-children of a deleted question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Delete the question and every question it reveals, recursively.
    Cascade,
    /// Delete only the question; its direct children become top-level.
    Promote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Owns a document and applies checked mutations to it.
///
/// ```rust,ignore
/// use gatewalk::{Editor, QuestionType, GateKind, JumpTarget};
///
/// let mut editor = Editor::new();
/// let page = editor.add_page()?;
/// let gate = editor.add_question(&page, QuestionType::GateChoice)?;
/// editor.set_jump(&gate, "A", JumpTarget::End)?;
/// let blob = editor.save()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    document: Document,
}

impl Editor {
    /// Start from the default document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and check a saved blob; see [`crate::load`].
    pub fn load(blob: &str) -> Result<Self, EditorError> {
        codec::load(blob).map(Self::from_document)
    }

    /// Wrap an existing document without checking it.
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    pub fn save(&self) -> serde_json::Result<String> {
        codec::save(&self.document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Structural problems of the current document, without rejecting it.
    pub fn problems(&self) -> Vec<DocumentProblem> {
        check::problems(&self.document)
    }

    // === Metadata ===

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
        debug!(title = %self.document.title, "set document title");
    }

    pub fn set_welcome_title(&mut self, title: impl Into<String>) {
        self.document.welcome_page.title = title.into();
        debug!("set welcome title");
    }

    pub fn set_welcome_description(&mut self, description: impl Into<String>) {
        self.document.welcome_page.description = description.into();
        debug!("set welcome description");
    }

    pub fn set_welcome_question_text(&mut self, text: impl Into<String>) {
        self.document.welcome_page.question.set_text(text);
        debug!("set welcome question text");
    }

    pub fn set_thank_you_title(&mut self, title: impl Into<String>) {
        self.document.thank_you_page.title = title.into();
        debug!("set thank-you title");
    }

    pub fn set_thank_you_note(&mut self, note: impl Into<String>) {
        self.document.thank_you_page.note = note.into();
        debug!("set thank-you note");
    }

    pub fn set_redirect_url(&mut self, url: impl Into<String>) {
        self.document.thank_you_page.redirect_url = url.into();
        debug!(url = %self.document.thank_you_page.redirect_url, "set redirect url");
    }

    // === Pages ===

    /// Append a page whose number is greater than every existing page's.
    pub fn add_page(&mut self) -> Result<PageId, EditorError> {
        let id = PageId::numbered(fresh_number(self.document.max_page_number(), 1, "page")?);
        self.document.pages.push(Page::new(id.clone(), NEW_PAGE_TITLE));
        debug!(page = %id, "added page");
        Ok(id)
    }

    /// Remove a page together with its questions.
    ///
    /// Jumps and `nextPage` pointers elsewhere that named the page are left
    /// dangling; running into one surfaces as a broken branch.
    pub fn delete_page(&mut self, id: &PageId) -> Result<Page, EditorError> {
        let index = self
            .document
            .page_index(id)
            .ok_or_else(|| EditorError::unknown_page(id))?;
        let page = self.document.pages.remove(index);

        let removed: HashSet<&QuestionId> = page.questions.iter().map(Question::id).collect();
        prune_references(&mut self.document, &removed);

        let dangling = self.references_to(id);
        if dangling > 0 {
            warn!(page = %id, references = dangling, "deleted page is still a branch target");
        }
        debug!(page = %id, questions = page.questions.len(), "deleted page");
        Ok(page)
    }

    pub fn set_page_title(&mut self, id: &PageId, title: impl Into<String>) -> Result<(), EditorError> {
        self.page_mut(id)?.title = title.into();
        debug!(page = %id, "set page title");
        Ok(())
    }

    pub fn set_page_description(
        &mut self,
        id: &PageId,
        description: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.page_mut(id)?.description = description.into();
        debug!(page = %id, "set page description");
        Ok(())
    }

    /// Set or clear the page's explicit successor. The target must exist.
    pub fn set_next_page(&mut self, id: &PageId, next: Option<PageId>) -> Result<(), EditorError> {
        if let Some(target) = &next
            && self.document.page(target).is_none()
        {
            return Err(EditorError::unknown_page(target));
        }
        self.page_mut(id)?.next_page = next;
        debug!(page = %id, "set next page");
        Ok(())
    }

    // === Questions ===

    /// Append a question of the given type with a fresh document-wide id.
    pub fn add_question(
        &mut self,
        page: &PageId,
        question_type: QuestionType,
    ) -> Result<QuestionId, EditorError> {
        let id = self.next_question_id()?;
        self.page_mut(page)?
            .questions
            .push(new_question(id.clone(), question_type));
        debug!(page = %page, question = %id, kind = question_type.name(), "added question");
        Ok(id)
    }

    pub fn set_question_text(&mut self, id: &QuestionId, text: impl Into<String>) -> Result<(), EditorError> {
        self.question_mut(id)?.set_text(text);
        debug!(question = %id, "set question text");
        Ok(())
    }

    pub fn set_question_description(
        &mut self,
        id: &QuestionId,
        description: Option<String>,
    ) -> Result<(), EditorError> {
        self.question_mut(id)?.set_description(description);
        debug!(question = %id, "set question description");
        Ok(())
    }

    pub fn set_required(&mut self, id: &QuestionId, required: bool) -> Result<(), EditorError> {
        self.question_mut(id)?.set_required(required);
        debug!(question = %id, required, "set required");
        Ok(())
    }

    /// Replace the options of a choice-family question.
    ///
    /// Duplicate labels are dropped. On a gate, actions of surviving labels
    /// are kept; children revealed by a removed label become top-level.
    pub fn update_question_options(
        &mut self,
        id: &QuestionId,
        options: Vec<String>,
    ) -> Result<(), EditorError> {
        let options: Vec<String> = options.into_iter().collect::<IndexSet<_>>().into_iter().collect();

        let question = self.question_mut(id)?;
        if !question.kind().is_choice() {
            return Err(kind_mismatch(question, "choice question"));
        }
        if question.kind().allows_other() && options.iter().any(|o| o == OTHER_OPTION) {
            return Err(EditorError::ReservedOption(id.clone()));
        }
        let orphans: Vec<QuestionId> = question
            .as_gate()
            .map(|gate| {
                gate.actions
                    .iter()
                    .filter(|(label, _)| !options.contains(label))
                    .flat_map(|(_, action)| match action {
                        Action::Reveal { targets } => targets.clone(),
                        Action::Jump { .. } => Vec::new(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let count = options.len();
        question.kind_mut().set_options(options);
        self.detach(id, &orphans);
        debug!(question = %id, options = count, orphans = orphans.len(), "updated options");
        Ok(())
    }

    /// Grow or shrink the option list to `quantity` entries.
    ///
    /// New entries are placeholders `"Option {k}"`, skipping labels
    /// already in use.
    pub fn set_option_quantity(&mut self, id: &QuestionId, quantity: usize) -> Result<(), EditorError> {
        let question = self.question(id)?;
        if !question.kind().is_choice() {
            return Err(kind_mismatch(question, "choice question"));
        }

        let mut options = question.kind().options().to_vec();
        options.truncate(quantity);
        let mut k = options.len() + 1;
        while options.len() < quantity {
            let label = format!("Option {k}");
            if !options.contains(&label) {
                options.push(label);
            }
            k += 1;
        }
        self.update_question_options(id, options)
    }

    // === Type-specific fields ===

    pub fn set_dropdown(&mut self, id: &QuestionId, dropdown: bool) -> Result<(), EditorError> {
        let question = self.question_mut(id)?;
        match question.kind_mut() {
            QuestionKind::SingleChoice(body) => body.is_dropdown = dropdown,
            _ => return Err(kind_mismatch(question, QuestionType::SingleChoice.name())),
        }
        debug!(question = %id, dropdown, "set dropdown");
        Ok(())
    }

    pub fn set_allow_other(&mut self, id: &QuestionId, allow: bool) -> Result<(), EditorError> {
        let question = self.question_mut(id)?;
        if allow && question.kind().options().iter().any(|o| o == OTHER_OPTION) {
            return Err(EditorError::ReservedOption(id.clone()));
        }
        match question.kind_mut() {
            QuestionKind::SingleChoice(body) => body.allow_other = allow,
            QuestionKind::MultiChoice(body) => body.allow_other = allow,
            _ => return Err(kind_mismatch(question, "SingleChoice or MultiChoice")),
        }
        debug!(question = %id, allow, "set allow other");
        Ok(())
    }

    pub fn set_choice_variant(&mut self, id: &QuestionId, variant: ChoiceVariant) -> Result<(), EditorError> {
        let question = self.question_mut(id)?;
        match question.kind_mut() {
            QuestionKind::MultiChoice(body) => body.variant = variant,
            _ => return Err(kind_mismatch(question, QuestionType::MultiChoice.name())),
        }
        debug!(question = %id, ?variant, "set choice variant");
        Ok(())
    }

    /// Resize a rating scale. Custom labels follow: new points are labelled
    /// with their number, removed points lose their label. At least one
    /// point is kept.
    pub fn set_points_on_scale(&mut self, id: &QuestionId, points: u32) -> Result<(), EditorError> {
        let points = points.max(1);
        let rating = self.rating_mut(id)?;
        rating.points_on_scale = points;
        if let Some(labels) = rating.custom_labels.as_mut() {
            let wanted = points as usize;
            labels.truncate(wanted);
            for point in labels.len() + 1..=wanted {
                labels.push(point.to_string());
            }
        }
        debug!(question = %id, points, "set points on scale");
        Ok(())
    }

    pub fn set_rating_kind(&mut self, id: &QuestionId, kind: RatingKind) -> Result<(), EditorError> {
        self.rating_mut(id)?.rating_kind = kind;
        debug!(question = %id, ?kind, "set rating kind");
        Ok(())
    }

    /// Label every point of a rating scale; the scale is resized to the
    /// number of labels and becomes `Labeled`. `None` or an empty list
    /// removes the labels and makes the scale `Numeric`.
    pub fn set_custom_labels(
        &mut self,
        id: &QuestionId,
        labels: Option<Vec<String>>,
    ) -> Result<(), EditorError> {
        let rating = self.rating_mut(id)?;
        match labels.filter(|labels| !labels.is_empty()) {
            Some(labels) => {
                rating.points_on_scale = u32::try_from(labels.len()).unwrap_or(u32::MAX);
                rating.rating_kind = RatingKind::Labeled;
                rating.custom_labels = Some(labels);
            }
            None => {
                rating.rating_kind = RatingKind::Numeric;
                rating.custom_labels = None;
            }
        }
        debug!(question = %id, "set custom labels");
        Ok(())
    }

    // === Gates ===

    /// Switch a gate between jumping and revealing.
    ///
    /// All actions of the old kind are discarded; questions the gate used to
    /// reveal stay on the page as top-level questions.
    pub fn set_gate_kind(&mut self, id: &QuestionId, kind: GateKind) -> Result<(), EditorError> {
        let gate = self.gate_mut(id)?;
        if gate.gate_kind == kind {
            return Ok(());
        }
        let orphans: Vec<QuestionId> = gate.all_reveal_targets().cloned().collect();
        gate.actions.clear();
        gate.gate_kind = kind;
        self.detach(id, &orphans);
        debug!(question = %id, ?kind, orphans = orphans.len(), "set gate kind");
        Ok(())
    }

    /// Make `option` of a jump gate lead to `target`.
    pub fn set_jump(
        &mut self,
        id: &QuestionId,
        option: &str,
        target: JumpTarget,
    ) -> Result<(), EditorError> {
        let gate = self.gate(id)?;
        if gate.gate_kind != GateKind::Jump {
            return Err(gate_kind_mismatch(id, GateKind::Jump));
        }
        if !gate.options.iter().any(|o| o == option) {
            return Err(EditorError::unknown_option(id, option));
        }
        if let JumpTarget::Page(page) = &target
            && self.document.page(page).is_none()
        {
            return Err(EditorError::unknown_page(page));
        }

        debug!(question = %id, option, target = %target, "set jump");
        self.gate_mut(id)?
            .actions
            .insert(option.to_string(), Action::jump(target));
        Ok(())
    }

    /// Remove the action of `option`, returning it. Questions a removed
    /// reveal showed become top-level.
    pub fn clear_action(&mut self, id: &QuestionId, option: &str) -> Result<Option<Action>, EditorError> {
        let removed = self.gate_mut(id)?.actions.shift_remove(option);
        if let Some(Action::Reveal { targets }) = &removed {
            self.detach(id, targets);
        }
        debug!(question = %id, option, cleared = removed.is_some(), "cleared action");
        Ok(removed)
    }

    /// Add a question revealed by `option` of a reveal gate.
    ///
    /// The child is placed on the gate's page right after the gate and the
    /// questions it already reveals.
    pub fn add_reveal_sub_question(
        &mut self,
        gate_id: &QuestionId,
        option: &str,
        question_type: QuestionType,
    ) -> Result<QuestionId, EditorError> {
        let gate_question = self.question(gate_id)?;
        let gate = gate_question
            .as_gate()
            .ok_or_else(|| kind_mismatch(gate_question, QuestionType::GateChoice.name()))?;
        if gate.gate_kind != GateKind::Reveal {
            return Err(gate_kind_mismatch(gate_id, GateKind::Reveal));
        }
        if !gate.options.iter().any(|o| o == option) {
            return Err(EditorError::unknown_option(gate_id, option));
        }
        let Some(QuestionLocation::Page { page, .. }) = self.document.locate(gate_id) else {
            return Err(EditorError::unknown_question(gate_id));
        };

        let subtree: HashSet<&QuestionId> = reveal_subtree(&self.document, gate_question)
            .into_iter()
            .map(|(q, _)| q.id())
            .collect();
        let questions = &self.document.pages[page].questions;
        let insert_at = questions
            .iter()
            .rposition(|q| subtree.contains(q.id()))
            .map_or(questions.len(), |i| i + 1);

        let id = self.next_question_id()?;
        let mut child = new_question(id.clone(), question_type);
        child.set_parent_id(Some(gate_id.clone()));
        self.document.pages[page].questions.insert(insert_at, child);

        let action = self
            .gate_mut(gate_id)?
            .actions
            .entry(option.to_string())
            .or_insert_with(|| Action::reveal(Vec::new()));
        match action {
            Action::Reveal { targets } => targets.push(id.clone()),
            Action::Jump { .. } => *action = Action::reveal(vec![id.clone()]),
        }

        debug!(gate = %gate_id, option, question = %id, "added reveal sub-question");
        Ok(id)
    }

    // === Structure ===

    /// Delete a question from `page`, returning the ids actually removed.
    ///
    /// Reveal actions anywhere that listed a removed id are pruned, and
    /// reveal actions left without targets are dropped.
    pub fn delete_question(
        &mut self,
        page: &PageId,
        id: &QuestionId,
        mode: DeleteMode,
    ) -> Result<Vec<QuestionId>, EditorError> {
        let page_index = self
            .document
            .page_index(page)
            .ok_or_else(|| EditorError::unknown_page(page))?;
        let Some(question) = self.document.pages[page_index].question(id) else {
            return Err(EditorError::unknown_question(id));
        };

        let removed: Vec<QuestionId> = match mode {
            DeleteMode::Cascade => reveal_subtree(&self.document, question)
                .into_iter()
                .map(|(q, _)| q.id().clone())
                .collect(),
            DeleteMode::Promote => {
                let children: Vec<QuestionId> =
                    self.document.children_of(id).map(|q| q.id().clone()).collect();
                self.detach(id, &children);
                vec![id.clone()]
            }
        };

        let removed_set: HashSet<&QuestionId> = removed.iter().collect();
        for page in &mut self.document.pages {
            page.questions.retain(|q| !removed_set.contains(q.id()));
        }
        prune_references(&mut self.document, &removed_set);

        debug!(page = %page, question = %id, ?mode, removed = removed.len(), "deleted question");
        Ok(removed)
    }

    /// Copy a question and everything it reveals, transitively, onto
    /// `destination`. Returns the id of the copied root.
    ///
    /// With `M` the current highest question number and `k` questions in
    /// the subtree, the copies get `Q{M+1}..Q{M+k}` in preorder and are
    /// appended in that order. Parent links and reveal targets are rewritten
    /// to the copies; jump targets are kept as they are.
    pub fn copy_question_subtree(
        &mut self,
        source: &QuestionId,
        destination: &PageId,
    ) -> Result<QuestionId, EditorError> {
        let root = self.question(source)?;
        let dest_index = self
            .document
            .page_index(destination)
            .ok_or_else(|| EditorError::unknown_page(destination))?;

        let subtree = reveal_subtree(&self.document, root);
        let base = self.document.max_question_number();
        let needed = u64::try_from(subtree.len()).unwrap_or(u64::MAX);
        fresh_number(base, needed, "question")?;
        let remap: HashMap<&QuestionId, QuestionId> = subtree
            .iter()
            .zip(1..)
            .map(|((question, _), offset)| (question.id(), QuestionId::numbered(base + offset)))
            .collect();

        let copies: Vec<Question> = subtree
            .iter()
            .map(|&(question, parent)| {
                let mut copy = question.clone();
                copy.set_id(remap[question.id()].clone());
                copy.set_parent_id(parent.and_then(|p| remap.get(p)).cloned());
                if let Some(gate) = copy.as_gate_mut() {
                    remap_reveals(gate, &remap);
                }
                copy
            })
            .collect();

        let count = copies.len();
        self.document.pages[dest_index].questions.extend(copies);

        let new_root = QuestionId::numbered(base + 1);
        debug!(source = %source, page = %destination, root = %new_root, count, "copied question subtree");
        Ok(new_root)
    }

    /// Swap the question at `index` with its neighbour.
    ///
    /// Returns `false` without changing anything when there is no
    /// neighbour in that direction.
    pub fn move_question(
        &mut self,
        page: &PageId,
        index: usize,
        direction: MoveDirection,
    ) -> Result<bool, EditorError> {
        let questions = &mut self.page_mut(page)?.questions;
        let other = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        let Some(other) = other.filter(|&o| o < questions.len() && index < questions.len()) else {
            return Ok(false);
        };
        questions.swap(index, other);
        debug!(page = %page, from = index, to = other, "moved question");
        Ok(true)
    }

    // === Helpers ===

    fn next_question_id(&self) -> Result<QuestionId, EditorError> {
        fresh_number(self.document.max_question_number(), 1, "question").map(QuestionId::numbered)
    }

    fn page_mut(&mut self, id: &PageId) -> Result<&mut Page, EditorError> {
        self.document
            .pages
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| EditorError::unknown_page(id))
    }

    fn question(&self, id: &QuestionId) -> Result<&Question, EditorError> {
        self.document
            .question(id)
            .ok_or_else(|| EditorError::unknown_question(id))
    }

    fn question_mut(&mut self, id: &QuestionId) -> Result<&mut Question, EditorError> {
        self.document
            .question_mut(id)
            .ok_or_else(|| EditorError::unknown_question(id))
    }

    fn gate(&self, id: &QuestionId) -> Result<&GateQuestion, EditorError> {
        let question = self.question(id)?;
        question
            .as_gate()
            .ok_or_else(|| kind_mismatch(question, QuestionType::GateChoice.name()))
    }

    fn gate_mut(&mut self, id: &QuestionId) -> Result<&mut GateQuestion, EditorError> {
        let question = self.question_mut(id)?;
        let actual = question.kind().question_type().name();
        question.as_gate_mut().ok_or_else(|| EditorError::KindMismatch {
            id: id.clone(),
            expected: QuestionType::GateChoice.name(),
            actual,
        })
    }

    fn rating_mut(&mut self, id: &QuestionId) -> Result<&mut RatingScaleQuestion, EditorError> {
        let question = self.question_mut(id)?;
        let actual = question.kind().question_type().name();
        match question.kind_mut() {
            QuestionKind::RatingScale(rating) => Ok(rating),
            _ => Err(EditorError::KindMismatch {
                id: id.clone(),
                expected: QuestionType::RatingScale.name(),
                actual,
            }),
        }
    }

    /// Clear the parent link of each of `children` that points at `parent`.
    fn detach(&mut self, parent: &QuestionId, children: &[QuestionId]) {
        for child in children {
            if let Some(question) = self.document.question_mut(child)
                && question.parent_id() == Some(parent)
            {
                question.set_parent_id(None);
                debug!(question = %child, former_parent = %parent, "promoted to top-level");
            }
        }
    }

    fn references_to(&self, page: &PageId) -> usize {
        let jumps = self
            .document
            .questions()
            .filter_map(Question::as_gate)
            .flat_map(|gate| gate.actions.values())
            .filter(|action| matches!(action, Action::Jump { target } if target.page() == Some(page)))
            .count();
        let next_pages = self
            .document
            .pages
            .iter()
            .filter(|p| p.next_page.as_ref() == Some(page))
            .count();
        jumps + next_pages
    }
}

/// Split the bracketed option syntax `"(Option A),(Option B)"` into labels.
///
/// Each label is the text between an opening parenthesis and the next
/// closing one, trimmed; empty labels and text outside brackets are skipped.
pub fn parse_option_list(raw: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(')') else {
            break;
        };
        let label = after[..close].trim();
        if !label.is_empty() {
            labels.push(label.to_string());
        }
        rest = &after[close + 1..];
    }
    labels
}

/// `max + offset`, unless that runs past the largest representable id.
fn fresh_number(max: u64, offset: u64, kind: &'static str) -> Result<u64, EditorError> {
    max.checked_add(offset).ok_or(EditorError::IdsExhausted(kind))
}

fn new_question(id: QuestionId, question_type: QuestionType) -> Question {
    let question = Question::new(id, NEW_QUESTION_TEXT, QuestionKind::default_for(question_type));
    if question_type == QuestionType::InfoDisplay {
        question
    } else {
        question.required()
    }
}

fn kind_mismatch(question: &Question, expected: &'static str) -> EditorError {
    EditorError::KindMismatch {
        id: question.id().clone(),
        expected,
        actual: question.kind().question_type().name(),
    }
}

fn gate_kind_mismatch(id: &QuestionId, expected: GateKind) -> EditorError {
    let name = |kind| match kind {
        GateKind::Jump => "Jump gate",
        GateKind::Reveal => "Reveal gate",
    };
    let actual = match expected {
        GateKind::Jump => GateKind::Reveal,
        GateKind::Reveal => GateKind::Jump,
    };
    EditorError::KindMismatch {
        id: id.clone(),
        expected: name(expected),
        actual: name(actual),
    }
}

/// `root` and every question it reveals, transitively, in preorder, each
/// paired with the question that reached it.
///
/// Children are taken from reveal targets in action order, then from any
/// remaining questions whose `parentId` names the node. Missing targets are
/// skipped.
fn reveal_subtree<'a>(
    document: &'a Document,
    root: &'a Question,
) -> Vec<(&'a Question, Option<&'a QuestionId>)> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(root, None)];

    while let Some((question, parent)) = stack.pop() {
        if !seen.insert(question.id()) {
            continue;
        }
        order.push((question, parent));

        let mut children: Vec<&Question> = question
            .as_gate()
            .map(|gate| {
                gate.all_reveal_targets()
                    .filter_map(|target| document.question(target))
                    .collect()
            })
            .unwrap_or_default();
        for child in document.children_of(question.id()) {
            if !children.iter().any(|c| c.id() == child.id()) {
                children.push(child);
            }
        }
        for child in children.into_iter().rev() {
            stack.push((child, Some(question.id())));
        }
    }

    order
}

fn remap_reveals(gate: &mut GateQuestion, remap: &HashMap<&QuestionId, QuestionId>) {
    for action in gate.actions.values_mut() {
        if let Action::Reveal { targets } = action {
            *targets = targets.iter().filter_map(|t| remap.get(t).cloned()).collect();
        }
    }
    gate.actions
        .retain(|_, action| !matches!(action, Action::Reveal { targets } if targets.is_empty()));
}

/// Drop reveal targets naming `removed` questions, drop reveal actions left
/// empty, and clear parent links pointing at `removed` questions.
fn prune_references(document: &mut Document, removed: &HashSet<&QuestionId>) {
    let questions = std::iter::once(&mut document.welcome_page.question)
        .chain(document.pages.iter_mut().flat_map(|p| p.questions.iter_mut()));

    for question in questions {
        if question.parent_id().is_some_and(|p| removed.contains(p)) {
            question.set_parent_id(None);
        }
        if let Some(gate) = question.as_gate_mut() {
            for action in gate.actions.values_mut() {
                if let Action::Reveal { targets } = action {
                    targets.retain(|t| !removed.contains(t));
                }
            }
            gate.actions
                .retain(|_, action| !matches!(action, Action::Reveal { targets } if targets.is_empty()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    fn p1() -> PageId {
        PageId::new("p1")
    }

    /// p1: Q1 (reveal gate, "A" reveals Q2 and Q3), Q4 (text).
    fn reveal_editor() -> Editor {
        let mut editor = Editor::new();
        let gate = editor.add_question(&p1(), QuestionType::GateChoice).unwrap();
        editor.set_gate_kind(&gate, GateKind::Reveal).unwrap();
        editor.add_reveal_sub_question(&gate, "A", QuestionType::ShortText).unwrap();
        editor.add_reveal_sub_question(&gate, "A", QuestionType::ShortText).unwrap();
        editor.add_question(&p1(), QuestionType::ShortText).unwrap();
        editor
    }

    fn ids(page: &Page) -> Vec<&str> {
        page.questions.iter().map(|q| q.id().as_str()).collect()
    }

    #[test]
    fn fresh_editor_holds_default_document() {
        let editor = Editor::new();
        let doc = editor.document();
        assert_eq!(doc.title, "New Project");
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].id, p1());
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn ids_are_global_and_increasing() {
        let mut editor = Editor::new();
        let p2 = editor.add_page().unwrap();
        assert_eq!(p2.as_str(), "p2");

        let a = editor.add_question(&p1(), QuestionType::ShortText).unwrap();
        let b = editor.add_question(&p2, QuestionType::ShortText).unwrap();
        let c = editor.add_question(&p1(), QuestionType::InfoDisplay).unwrap();
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("Q1", "Q2", "Q3"));

        assert!(editor.document().question(&a).unwrap().is_required());
        assert!(!editor.document().question(&c).unwrap().is_required());
    }

    #[test]
    fn other_label_is_reserved_while_other_is_allowed() {
        let mut editor = Editor::new();
        let colour = editor.add_question(&p1(), QuestionType::SingleChoice).unwrap();
        editor
            .update_question_options(&colour, vec!["Red".into(), OTHER_OPTION.into()])
            .unwrap();
        assert!(matches!(
            editor.set_allow_other(&colour, true),
            Err(EditorError::ReservedOption(id)) if id == colour
        ));

        editor.update_question_options(&colour, vec!["Red".into()]).unwrap();
        editor.set_allow_other(&colour, true).unwrap();
        assert!(matches!(
            editor.update_question_options(&colour, vec!["Red".into(), OTHER_OPTION.into()]),
            Err(EditorError::ReservedOption(_))
        ));

        let kind = editor.document().question(&colour).unwrap().kind();
        assert_eq!(kind.options(), ["Red".to_string()]);
        assert!(kind.allows_other());
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn ids_at_the_numeric_ceiling_are_exhausted() {
        let mut editor = reveal_editor();
        editor.add_page().unwrap();
        let blob = editor
            .save()
            .unwrap()
            .replace("\"Q4\"", &format!("\"Q{}\"", u64::MAX - 1))
            .replace("\"p2\"", &format!("\"p{}\"", u64::MAX));
        let mut editor = Editor::load(&blob).unwrap();
        let last_page = PageId::numbered(u64::MAX);

        // One id left: a single question still fits, a three-question copy does not.
        assert!(matches!(
            editor.copy_question_subtree(&qid("Q1"), &last_page),
            Err(EditorError::IdsExhausted("question"))
        ));
        let last = editor.add_question(&p1(), QuestionType::ShortText).unwrap();
        assert_eq!(last.number(), Some(u64::MAX));

        let err = editor.add_question(&p1(), QuestionType::ShortText).unwrap_err();
        assert!(matches!(err, EditorError::IdsExhausted("question")));
        assert!(matches!(
            editor.add_reveal_sub_question(&qid("Q1"), "B", QuestionType::ShortText),
            Err(EditorError::IdsExhausted("question"))
        ));
        assert!(matches!(editor.add_page(), Err(EditorError::IdsExhausted("page"))));
        assert_eq!(editor.document().pages.len(), 2);
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut editor = Editor::new();
        assert!(matches!(
            editor.add_question(&PageId::new("p9"), QuestionType::ShortText),
            Err(EditorError::InvalidReference(_))
        ));
        assert!(matches!(
            editor.set_question_text(&qid("Q9"), "x"),
            Err(EditorError::InvalidReference(_))
        ));
        assert!(matches!(
            editor.set_next_page(&p1(), Some(PageId::new("p9"))),
            Err(EditorError::InvalidReference(_))
        ));
    }

    #[test]
    fn kind_mismatch_names_both_types() {
        let mut editor = Editor::new();
        let text = editor.add_question(&p1(), QuestionType::ShortText).unwrap();
        let err = editor.set_dropdown(&text, true).unwrap_err();
        assert!(matches!(
            err,
            EditorError::KindMismatch { expected: "SingleChoice", actual: "ShortText", .. }
        ));
        assert!(editor.update_question_options(&text, vec!["x".into()]).is_err());
    }

    #[test]
    fn gate_options_keep_surviving_actions() {
        let mut editor = Editor::new();
        let p2 = editor.add_page().unwrap();
        let gate = editor.add_question(&p1(), QuestionType::GateChoice).unwrap();
        editor.set_jump(&gate, "A", JumpTarget::End).unwrap();
        editor.set_jump(&gate, "B", p2.clone().into()).unwrap();

        editor
            .update_question_options(&gate, vec!["B".into(), "C".into(), "B".into()])
            .unwrap();
        let body = editor.document().question(&gate).unwrap().as_gate().unwrap();
        assert_eq!(body.options, vec!["B", "C"]);
        assert_eq!(body.option_quantity, 2);
        assert_eq!(body.action("A"), None);
        assert_eq!(body.jump_for("B"), Some(&JumpTarget::Page(p2)));
    }

    #[test]
    fn removing_reveal_label_promotes_its_children() {
        let mut editor = reveal_editor();
        editor.update_question_options(&qid("Q1"), vec!["B".into()]).unwrap();
        let doc = editor.document();
        assert_eq!(doc.question(&qid("Q2")).unwrap().parent_id(), None);
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn option_quantity_pads_and_truncates() {
        let mut editor = Editor::new();
        let q = editor.add_question(&p1(), QuestionType::MultiChoice).unwrap();
        editor
            .update_question_options(&q, vec!["Option 3".into(), "Red".into()])
            .unwrap();
        editor.set_option_quantity(&q, 4).unwrap();
        let options = editor.document().question(&q).unwrap().kind().options().to_vec();
        assert_eq!(options, vec!["Option 3", "Red", "Option 4", "Option 5"]);

        editor.set_option_quantity(&q, 0).unwrap();
        assert!(editor.document().question(&q).unwrap().kind().options().is_empty());
    }

    #[test]
    fn reveal_children_are_placed_after_gate_subtree() {
        let editor = reveal_editor();
        let doc = editor.document();
        assert_eq!(ids(&doc.pages[0]), vec!["Q1", "Q2", "Q3", "Q4"]);
        let gate = doc.question(&qid("Q1")).unwrap().as_gate().unwrap();
        assert_eq!(gate.reveal_targets("A"), &[qid("Q2"), qid("Q3")]);
        assert_eq!(doc.question(&qid("Q3")).unwrap().parent_id(), Some(&qid("Q1")));
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn reveal_child_needs_reveal_gate() {
        let mut editor = Editor::new();
        let gate = editor.add_question(&p1(), QuestionType::GateChoice).unwrap();
        let err = editor
            .add_reveal_sub_question(&gate, "A", QuestionType::ShortText)
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::KindMismatch { expected: "Reveal gate", actual: "Jump gate", .. }
        ));

        editor.set_gate_kind(&gate, GateKind::Reveal).unwrap();
        assert!(matches!(
            editor.add_reveal_sub_question(&gate, "Z", QuestionType::ShortText),
            Err(EditorError::InvalidReference(_))
        ));
        assert!(matches!(
            editor.set_jump(&gate, "A", JumpTarget::End),
            Err(EditorError::KindMismatch { .. })
        ));
    }

    #[test]
    fn delete_promote_keeps_children_in_order() {
        let mut editor = reveal_editor();
        let removed = editor
            .delete_question(&p1(), &qid("Q1"), DeleteMode::Promote)
            .unwrap();
        assert_eq!(removed, vec![qid("Q1")]);

        let doc = editor.document();
        assert_eq!(ids(&doc.pages[0]), vec!["Q2", "Q3", "Q4"]);
        assert!(doc.pages[0].questions.iter().all(|q| q.parent_id().is_none()));
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn delete_cascade_removes_nested_children() {
        let mut editor = reveal_editor();
        // "B" reveals a nested reveal gate with its own child.
        let nested = editor
            .add_reveal_sub_question(&qid("Q1"), "B", QuestionType::GateChoice)
            .unwrap();
        editor.set_gate_kind(&nested, GateKind::Reveal).unwrap();
        let leaf = editor
            .add_reveal_sub_question(&nested, "A", QuestionType::ShortText)
            .unwrap();

        let removed = editor
            .delete_question(&p1(), &qid("Q1"), DeleteMode::Cascade)
            .unwrap();
        assert_eq!(removed, vec![qid("Q1"), qid("Q2"), qid("Q3"), nested, leaf]);
        assert_eq!(ids(&editor.document().pages[0]), vec!["Q4"]);
    }

    #[test]
    fn deleting_a_child_prunes_the_reveal() {
        let mut editor = reveal_editor();
        editor.delete_question(&p1(), &qid("Q2"), DeleteMode::Cascade).unwrap();
        editor.delete_question(&p1(), &qid("Q3"), DeleteMode::Cascade).unwrap();
        let gate = editor.document().question(&qid("Q1")).unwrap().as_gate().unwrap();
        assert!(gate.actions.is_empty());
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn delete_question_must_be_on_page() {
        let mut editor = reveal_editor();
        let p2 = editor.add_page().unwrap();
        assert!(matches!(
            editor.delete_question(&p2, &qid("Q1"), DeleteMode::Cascade),
            Err(EditorError::InvalidReference(_))
        ));
    }

    #[test]
    fn copy_subtree_remaps_internal_references() {
        let mut editor = reveal_editor();
        let p2 = editor.add_page().unwrap();
        let root = editor.copy_question_subtree(&qid("Q1"), &p2).unwrap();
        assert_eq!(root, qid("Q5"));

        let doc = editor.document();
        let page = doc.page(&p2).unwrap();
        assert_eq!(ids(page), vec!["Q5", "Q6", "Q7"]);
        let gate = page.questions[0].as_gate().unwrap();
        assert_eq!(gate.reveal_targets("A"), &[qid("Q6"), qid("Q7")]);
        assert_eq!(page.questions[0].parent_id(), None);
        assert_eq!(page.questions[1].parent_id(), Some(&qid("Q5")));
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn copy_keeps_jump_targets() {
        let mut editor = Editor::new();
        let p2 = editor.add_page().unwrap();
        let gate = editor.add_question(&p1(), QuestionType::GateChoice).unwrap();
        editor.set_jump(&gate, "B", p2.clone().into()).unwrap();
        let copy = editor.copy_question_subtree(&gate, &p2).unwrap();
        let body = editor.document().question(&copy).unwrap().as_gate().unwrap();
        assert_eq!(body.jump_for("B"), Some(&JumpTarget::Page(p2)));
    }

    #[test]
    fn move_is_noop_at_bounds() {
        let mut editor = Editor::new();
        editor.add_question(&p1(), QuestionType::ShortText).unwrap();
        editor.add_question(&p1(), QuestionType::ShortText).unwrap();

        assert!(!editor.move_question(&p1(), 0, MoveDirection::Up).unwrap());
        assert!(!editor.move_question(&p1(), 1, MoveDirection::Down).unwrap());
        assert!(!editor.move_question(&p1(), 7, MoveDirection::Up).unwrap());
        assert!(editor.move_question(&p1(), 0, MoveDirection::Down).unwrap());
        assert_eq!(ids(&editor.document().pages[0]), vec!["Q2", "Q1"]);
    }

    #[test]
    fn switching_to_jump_promotes_reveal_children() {
        let mut editor = reveal_editor();
        editor.set_gate_kind(&qid("Q1"), GateKind::Jump).unwrap();
        let doc = editor.document();
        assert!(doc.question(&qid("Q1")).unwrap().as_gate().unwrap().actions.is_empty());
        assert_eq!(doc.question(&qid("Q2")).unwrap().parent_id(), None);
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn clear_reveal_action_detaches() {
        let mut editor = reveal_editor();
        let cleared = editor.clear_action(&qid("Q1"), "A").unwrap();
        assert!(matches!(cleared, Some(Action::Reveal { .. })));
        assert_eq!(editor.document().question(&qid("Q3")).unwrap().parent_id(), None);
        assert_eq!(editor.clear_action(&qid("Q1"), "A").unwrap(), None);
    }

    #[test]
    fn delete_page_leaves_jump_dangling() {
        let mut editor = Editor::new();
        let p2 = editor.add_page().unwrap();
        let gate = editor.add_question(&p1(), QuestionType::GateChoice).unwrap();
        editor.set_jump(&gate, "A", p2.clone().into()).unwrap();

        let page = editor.delete_page(&p2).unwrap();
        assert_eq!(page.id, p2);
        assert!(matches!(
            editor.problems().as_slice(),
            [DocumentProblem::DanglingJump { .. }]
        ));
    }

    #[test]
    fn rating_labels_track_points() {
        let mut editor = Editor::new();
        let q = editor.add_question(&p1(), QuestionType::RatingScale).unwrap();
        editor
            .set_custom_labels(&q, Some(vec!["Bad".into(), "Good".into()]))
            .unwrap();
        editor.set_points_on_scale(&q, 4).unwrap();
        let rating = match editor.document().question(&q).unwrap().kind() {
            QuestionKind::RatingScale(r) => r.clone(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(rating.points_on_scale, 4);
        assert_eq!(rating.rating_kind, RatingKind::Labeled);
        assert_eq!(
            rating.custom_labels,
            Some(vec!["Bad".into(), "Good".into(), "3".into(), "4".into()])
        );

        editor.set_custom_labels(&q, None).unwrap();
        editor.set_points_on_scale(&q, 0).unwrap();
        assert!(editor.problems().is_empty());
    }

    #[test]
    fn parses_bracketed_options() {
        assert_eq!(
            parse_option_list("(Option A),(Option B), ( Spaced ) ,(),(Last"),
            vec!["Option A", "Option B", "Spaced"]
        );
        assert!(parse_option_list("no brackets").is_empty());
    }

    #[test]
    fn load_save_through_editor() {
        let editor = reveal_editor();
        let blob = editor.save().unwrap();
        let loaded = Editor::load(&blob).unwrap();
        assert_eq!(loaded, editor);
    }
}
