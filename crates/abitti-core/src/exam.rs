//! Exam root entity and archive load/save orchestration.
//!
//! # Invariants
//! - `exam-content.json` is mandatory; any failure reading it fails the load.
//! - `attachments.zip` is optional; a missing or broken entry leaves
//!   `attachments` as `None` and the load continues.
//! - Saving renumbers ids and display numbers of the live tree first. Those
//!   mutations stay in place even if the write then fails.
//! - Attachments are not written back on save.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::archive;
use crate::error::{Error, Result};
use crate::json::DumpOpts;
use crate::model::{Identifiable, Question};

pub const CONTENT_ENTRY: &str = "exam-content.json";
pub const ATTACHMENTS_ENTRY: &str = "attachments.zip";
pub const SCHEMA_VERSION: &str = "1.0";

/// Attachment file name -> raw contents.
pub type Attachments = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Exam {
    pub title: String,
    pub instruction: String,
    pub cas_forbidden: bool,
    pub questions: Vec<Question>,
    pub attachments: Option<Attachments>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentRecord {
    title: String,
    instruction: String,
    cas_forbidden: bool,
    sections: Vec<SectionRecord>,
}

#[derive(Deserialize)]
struct SectionRecord {
    questions: Vec<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentOut<'a> {
    title: &'a str,
    instruction: &'a str,
    cas_forbidden: bool,
    schema_version: &'static str,
    sections: [SectionOut<'a>; 1],
}

#[derive(Serialize)]
struct SectionOut<'a> {
    questions: &'a [Question],
}

impl Exam {
    pub fn load(path: &Path) -> Result<Self> {
        let _span = tracing::debug_span!("load", path = %path.display()).entered();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads an exam archive from any seekable source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let content = archive::read_entry(&mut zip, CONTENT_ENTRY)?;
        let mut exam = Self::from_content_json(&content)?;
        exam.attachments = match archive::read_entry(&mut zip, ATTACHMENTS_ENTRY)
            .and_then(archive::read_nested)
        {
            Ok(files) => {
                debug!(count = files.len(), "attachments loaded");
                Some(files)
            }
            Err(Error::MissingEntry(_)) => {
                warn!("no attachments in exam");
                None
            }
            Err(e) => {
                warn!(error = %e, "attachments unreadable, continuing without");
                None
            }
        };
        Ok(exam)
    }

    /// Decodes the canonical `exam-content.json` record. Only the first
    /// section is consulted. Attachments are left empty.
    pub fn from_content_json(data: &[u8]) -> Result<Self> {
        let record: ContentRecord = serde_json::from_slice(data)?;
        let section = record
            .sections
            .into_iter()
            .next()
            .ok_or(Error::NoSections)?;
        let questions = section
            .questions
            .into_iter()
            .map(Question::from_record)
            .collect::<Result<Vec<_>>>()?;
        debug!(questions = questions.len(), "exam content decoded");
        Ok(Self {
            title: record.title,
            instruction: record.instruction,
            cas_forbidden: record.cas_forbidden,
            questions,
            attachments: None,
        })
    }

    /// Renumbers every entity in pre-order starting at 0. Returns the entity count.
    pub fn normalize_ids(&mut self) -> u32 {
        self.questions
            .iter_mut()
            .fold(0, |next, q| q.assign_ids(next))
    }

    /// Labels questions "1", "2", ... in order.
    pub fn normalize_display_numbers(&mut self) {
        for (i, q) in self.questions.iter_mut().enumerate() {
            q.assign_display_number(&(i + 1).to_string());
        }
    }

    /// Runs both numbering passes in place.
    pub fn normalize(&mut self) {
        let next = self.normalize_ids();
        self.normalize_display_numbers();
        debug!(entities = next, "exam normalized");
    }

    /// Normalized copy; `self` is left untouched.
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.normalize();
        copy
    }

    /// Questions, choices and options in the tree.
    pub fn entity_count(&self) -> usize {
        self.questions.iter().map(Question::entity_count).sum()
    }

    fn content_record(&self) -> ContentOut<'_> {
        ContentOut {
            title: &self.title,
            instruction: &self.instruction,
            cas_forbidden: self.cas_forbidden,
            schema_version: SCHEMA_VERSION,
            sections: [SectionOut {
                questions: &self.questions,
            }],
        }
    }

    /// Canonical export record as it would be written, without normalizing.
    pub fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.content_record())?)
    }

    pub fn to_content_json(&self, opts: DumpOpts) -> Result<Vec<u8>> {
        let record = self.content_record();
        let data = if opts.pretty {
            serde_json::to_vec_pretty(&record)?
        } else {
            serde_json::to_vec(&record)?
        };
        Ok(data)
    }

    /// Normalizes the tree, then writes it as a fresh archive to `writer`.
    pub fn write_to<W: Write + Seek>(&mut self, writer: W) -> Result<W> {
        self.normalize();
        self.write_archive(writer)
    }

    /// Normalizes the tree in place and writes it to `path`.
    ///
    /// Callers observe the renumbered ids and display numbers afterwards,
    /// even when creating or writing the file fails.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let _span = tracing::debug_span!("save", path = %path.display()).entered();
        self.normalize();
        let file = File::create(path)?;
        let mut out = self.write_archive(BufWriter::new(file))?;
        out.flush()?;
        if self.attachments.as_ref().is_some_and(|a| !a.is_empty()) {
            warn!("attachments are not saved");
        }
        Ok(())
    }

    fn write_archive<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let data = self.to_content_json(DumpOpts::default())?;
        archive::write_single_entry(writer, CONTENT_ENTRY, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exam_json(questions: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "title": "T", "instruction": "I", "casForbidden": true,
            "sections": [{"questions": questions}]
        }))
        .unwrap()
    }

    #[test]
    fn empty_exam_leaves_counter_at_zero() {
        let mut exam = Exam::from_content_json(&exam_json(json!([]))).unwrap();
        assert_eq!(exam.normalize_ids(), 0);
        assert_eq!(exam.entity_count(), 0);
    }

    #[test]
    fn missing_sections_is_structural_error() {
        let data = br#"{"title":"T","instruction":"I","casForbidden":false,"sections":[]}"#;
        assert!(matches!(Exam::from_content_json(data), Err(Error::NoSections)));
    }

    #[test]
    fn missing_required_key_fails() {
        let data = br#"{"title":"T","casForbidden":false,"sections":[{"questions":[]}]}"#;
        assert!(matches!(Exam::from_content_json(data), Err(Error::Json(_))));
    }

    #[test]
    fn normalized_copy_keeps_original() {
        let exam = Exam::from_content_json(&exam_json(json!([
            {"displayNumber": "7", "id": 12, "level": 1, "maxScore": 3, "type": "text",
             "text": "q", "screenshotExpected": true}
        ])))
        .unwrap();
        let copy = exam.normalized();
        assert_eq!(exam.questions[0].display_number(), "7");
        assert_eq!(copy.questions[0].display_number(), "1");
        assert_eq!(copy.questions[0].id(), 0);
    }

    #[test]
    fn export_carries_schema_version() {
        let exam = Exam::from_content_json(&exam_json(json!([]))).unwrap();
        let out = exam.export().unwrap();
        assert_eq!(out["schemaVersion"], "1.0");
        assert_eq!(out["casForbidden"], true);
        assert_eq!(out["sections"][0]["questions"], json!([]));
    }
}
