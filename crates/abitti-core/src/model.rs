//! Exam object model: questions, choices and answer options.
//!
//! Every entity owns its children in a plain `Vec`, so the graph is a strict
//! tree. Ids and display numbers are positional: they are recomputed from the
//! current order by [`Identifiable::assign_ids`] and
//! [`Question::assign_display_number`].
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Entities carrying a numeric id that is reassigned in pre-order.
pub trait Identifiable {
    fn id(&self) -> u32;

    /// Gives `start` to `self`, then consecutive ids to owned children in
    /// sequence order. Returns the next free id.
    fn assign_ids(&mut self, start: u32) -> u32;
}

/// One selectable answer within a [`Choice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: u32,
    pub text: String,
    pub correct: bool,
}

impl Identifiable for AnswerOption {
    fn id(&self) -> u32 {
        self.id
    }
    fn assign_ids(&mut self, start: u32) -> u32 {
        self.id = start;
        start + 1
    }
}

/// Type marker of a choice record; the only accepted value is `"choice"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceType {
    #[serde(rename = "choice")]
    Choice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub display_number: String,
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ChoiceType,
    pub text: String,
    pub break_after: bool,
    pub options: Vec<AnswerOption>,
}

impl Identifiable for Choice {
    fn id(&self) -> u32 {
        self.id
    }
    fn assign_ids(&mut self, start: u32) -> u32 {
        self.id = start;
        self.options
            .iter_mut()
            .fold(start + 1, |next, opt| opt.assign_ids(next))
    }
}

/// Fields shared by every question kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBase {
    pub display_number: String,
    pub id: u32,
    pub level: i64,
    pub max_score: serde_json::Number,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextQuestion {
    #[serde(flatten)]
    pub base: QuestionBase,
    pub screenshot_expected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceGroupQuestion {
    #[serde(flatten)]
    pub base: QuestionBase,
    pub choices: Vec<Choice>,
}

impl ChoiceGroupQuestion {
    fn assign_ids(&mut self, start: u32) -> u32 {
        self.base.id = start;
        self.choices
            .iter_mut()
            .fold(start + 1, |next, choice| choice.assign_ids(next))
    }

    fn assign_display_number(&mut self, label: &str) {
        self.base.display_number = label.to_string();
        for (k, choice) in self.choices.iter_mut().enumerate() {
            choice.display_number = format!("{}.{}", label, k + 1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    ChoiceGroup,
}

impl QuestionKind {
    /// Wire value of the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::ChoiceGroup => "choicegroup",
        }
    }
}

impl core::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graded item. Serializes with the variant tag in the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Question {
    Text(TextQuestion),
    ChoiceGroup(ChoiceGroupQuestion),
}

impl Question {
    /// Builds a question from its raw JSON record, dispatching on `type`.
    ///
    /// Unknown types fail with [`Error::UnsupportedQuestionType`]; missing or
    /// mistyped fields fail with [`Error::Json`]. Nothing is defaulted.
    pub fn from_record(record: serde_json::Value) -> Result<Self> {
        let kind: String = match record.get("type") {
            Some(tag) => serde_json::from_value(tag.clone())?,
            None => return Err(Error::MissingField("type")),
        };
        match kind.as_str() {
            "text" => Ok(Question::Text(serde_json::from_value(record)?)),
            "choicegroup" => Ok(Question::ChoiceGroup(serde_json::from_value(record)?)),
            _ => Err(Error::UnsupportedQuestionType(kind)),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Text(_) => QuestionKind::Text,
            Question::ChoiceGroup(_) => QuestionKind::ChoiceGroup,
        }
    }

    pub fn base(&self) -> &QuestionBase {
        match self {
            Question::Text(q) => &q.base,
            Question::ChoiceGroup(q) => &q.base,
        }
    }

    pub fn display_number(&self) -> &str {
        &self.base().display_number
    }

    /// Choices of a choice group; empty for text questions.
    pub fn choices(&self) -> &[Choice] {
        match self {
            Question::Text(_) => &[],
            Question::ChoiceGroup(q) => &q.choices,
        }
    }

    /// Sets this question's label; choice groups also relabel their choices
    /// as `<label>.<k>`.
    pub fn assign_display_number(&mut self, label: &str) {
        match self {
            Question::Text(q) => q.base.display_number = label.to_string(),
            Question::ChoiceGroup(q) => q.assign_display_number(label),
        }
    }

    /// Number of entities in this subtree, the question itself included.
    pub fn entity_count(&self) -> usize {
        1 + self
            .choices()
            .iter()
            .map(|c| 1 + c.options.len())
            .sum::<usize>()
    }

    /// Canonical JSON record of this question.
    pub fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Identifiable for Question {
    fn id(&self) -> u32 {
        self.base().id
    }
    fn assign_ids(&mut self, start: u32) -> u32 {
        match self {
            Question::Text(q) => {
                q.base.id = start;
                start + 1
            }
            Question::ChoiceGroup(q) => q.assign_ids(start),
        }
    }
}
