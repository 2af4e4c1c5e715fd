//! abitti-core: Exam archive object model, normalization and load/save
//!
//! This crate focuses on a small surface:
//! - Question/choice/option tree with positional id and display-number passes
//! - Question factory dispatching on the record's `type` tag
//! - Zip load/save of `exam-content.json`, optional `attachments.zip` on load
//! - JSON dump of an archive's content record for CLI use
//!
pub mod archive;
pub mod error;
pub mod exam;
pub mod json;
pub mod model;

pub use error::{Error, Result};
pub use exam::{ATTACHMENTS_ENTRY, Attachments, CONTENT_ENTRY, Exam, SCHEMA_VERSION};
pub use json::{DumpOpts, dump_file_json};
pub use model::{
    AnswerOption, Choice, ChoiceGroupQuestion, ChoiceType, Identifiable, Question, QuestionBase,
    QuestionKind, TextQuestion,
};
