//! Single-pass document streams read from JSON lines.
//!
//! Records are expected to be cleaned already (no markup); `published_date` is kept
//! as opaque text. Ids are assigned in the order documents are produced.

use serde::Deserialize;
use std::io::{BufRead, Lines};

use crate::error::IndexError;
use crate::{DocId, Document};

/// One line of input before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Older dumps name the body `content_str`; `content` wins when both are present.
    #[serde(default)]
    pub content_str: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_date: Option<serde_json::Value>,
}

/// Parses records from a reader line by line. Blank lines are skipped.
pub struct JsonLines<R> {
    lines: Lines<R>,
    source: String,
    line_no: usize,
}

impl<R: BufRead> JsonLines<R> {
    pub fn new(reader: R) -> Self { Self::with_source(reader, "input") }

    /// `source` names the input in error messages, typically a file path.
    pub fn with_source(reader: R, source: impl Into<String>) -> Self {
        Self { lines: reader.lines(), source: source.into(), line_no: 0 }
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = Result<(String, DocumentRecord), IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let location = format!("{}:{}", self.source, self.line_no);
            return Some(match serde_json::from_str(&line) {
                Ok(record) => Ok((location, record)),
                Err(err) => Err(IndexError::malformed(location, err.to_string())),
            });
        }
    }
}

/// Turns located records into [`Document`]s, numbering them from zero.
pub struct Documents<I> {
    records: I,
    next_id: DocId,
}

impl<I> Documents<I>
where
    I: Iterator<Item = Result<(String, DocumentRecord), IndexError>>,
{
    pub fn new(records: I) -> Self { Self { records, next_id: 0 } }
}

impl<I> Iterator for Documents<I>
where
    I: Iterator<Item = Result<(String, DocumentRecord), IndexError>>,
{
    type Item = Result<Document, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (location, record) = match self.records.next()? {
            Ok(located) => located,
            Err(err) => return Some(Err(err)),
        };
        let Some(content) = record.content.or(record.content_str) else {
            return Some(Err(IndexError::malformed(location, "missing required field `content`")));
        };
        let published_date = record.published_date.and_then(|value| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });
        let doc = Document {
            id: self.next_id,
            title: record.title,
            content,
            author: record.author,
            published_date,
        };
        self.next_id += 1;
        Some(Ok(doc))
    }
}

/// Documents from a single JSON-lines reader.
pub fn read_documents<R: BufRead>(reader: R) -> Documents<JsonLines<R>> { Documents::new(JsonLines::new(reader)) }
