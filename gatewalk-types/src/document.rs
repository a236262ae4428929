use serde::{Deserialize, Serialize};

use crate::{PageId, Question, QuestionId, QuestionKind};

/// Id of the identity question on a freshly created welcome page.
pub const WELCOME_QUESTION_ID: &str = "email";

/// The leading page of a survey: a greeting plus a single identity question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomePage {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub question: Question,
}

impl Default for WelcomePage {
    fn default() -> Self {
        Self {
            title: "Welcome".to_string(),
            description: "Enter survey description here...".to_string(),
            question: Question::new(WELCOME_QUESTION_ID, "Enter email", QuestionKind::ShortText)
                .required(),
        }
    }
}

/// The terminal page shown after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouPage {
    pub title: String,
    #[serde(default)]
    pub note: String,

    /// Where the respondent is sent afterwards; empty means stay.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub redirect_url: String,
}

impl Default for ThankYouPage {
    fn default() -> Self {
        Self {
            title: "Thank You".to_string(),
            note: "Thank you for participating.".to_string(),
            redirect_url: String::new(),
        }
    }
}

/// A content page with an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,

    /// Explicit successor; absent means the following page in document order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<PageId>,
}

impl Page {
    pub fn new(id: impl Into<PageId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            questions: Vec::new(),
            next_page: None,
        }
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    pub fn position_of(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id() == id)
    }
}

/// Where a question lives inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionLocation {
    Welcome,
    Page { page: usize, index: usize },
}

/// The top-level survey document.
///
/// Ownership flows strictly document → page → question; gate/sub-question
/// links are plain ids resolved through lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub welcome_page: WelcomePage,
    #[serde(default)]
    pub pages: Vec<Page>,
    pub thank_you_page: ThankYouPage,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            title: "New Project".to_string(),
            welcome_page: WelcomePage::default(),
            pages: vec![Page::new(PageId::numbered(1), "Page 1")],
            thank_you_page: ThankYouPage::default(),
        }
    }
}

impl Document {
    /// Create an empty document with the given title and no content pages.
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            ..Self::default()
        }
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    pub fn page_index(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| &p.id == id)
    }

    /// Every question in document order, welcome question first.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        std::iter::once(&self.welcome_page.question)
            .chain(self.pages.iter().flat_map(|p| p.questions.iter()))
    }

    pub fn locate(&self, id: &QuestionId) -> Option<QuestionLocation> {
        if self.welcome_page.question.id() == id {
            return Some(QuestionLocation::Welcome);
        }
        self.pages.iter().enumerate().find_map(|(page, p)| {
            p.position_of(id)
                .map(|index| QuestionLocation::Page { page, index })
        })
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        match self.locate(id)? {
            QuestionLocation::Welcome => Some(&self.welcome_page.question),
            QuestionLocation::Page { page, index } => self.pages[page].questions.get(index),
        }
    }

    pub fn question_mut(&mut self, id: &QuestionId) -> Option<&mut Question> {
        match self.locate(id)? {
            QuestionLocation::Welcome => Some(&mut self.welcome_page.question),
            QuestionLocation::Page { page, index } => self.pages[page].questions.get_mut(index),
        }
    }

    /// Questions whose `parentId` is `parent`, in document order.
    pub fn children_of<'a>(
        &'a self,
        parent: &'a QuestionId,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions()
            .filter(move |q| q.parent_id() == Some(parent))
    }

    /// Highest numeric suffix among `Q{n}` question ids (0 if none).
    pub fn max_question_number(&self) -> u64 {
        self.questions()
            .filter_map(|q| q.id().number())
            .max()
            .unwrap_or(0)
    }

    /// Highest numeric suffix among `p{n}` page ids (0 if none).
    pub fn max_page_number(&self) -> u64 {
        self.pages
            .iter()
            .filter_map(|p| p.id.number())
            .max()
            .unwrap_or(0)
    }
}
