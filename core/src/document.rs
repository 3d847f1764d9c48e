use serde::{Deserialize, Serialize};

use crate::DocId;

const PREVIEW_CHARS: usize = 150;

/// A document as handed over by ingestion. Ids follow ingestion order from 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub published_date: Option<String>,
}

/// What is kept about a document for displaying hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    /// Leading characters of the content.
    pub preview: String,
}

impl From<&Document> for DocMeta {
    fn from(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            author: doc.author.clone(),
            published_date: doc.published_date.clone(),
            preview: doc.content.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_truncated_on_char_boundaries() {
        let doc = Document {
            id: 0,
            title: Some("t".into()),
            content: "é".repeat(200),
            author: None,
            published_date: None,
        };
        let meta = DocMeta::from(&doc);
        assert_eq!(meta.preview.chars().count(), 150);
        assert_eq!(meta.title.as_deref(), Some("t"));
    }
}
