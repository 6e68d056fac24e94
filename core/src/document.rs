use serde::{Deserialize, Serialize};

use crate::DocId;

/// A document handed to the engine for indexing. Only `text` is indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(alias = "body")]
    pub text: String,
    #[serde(default, alias = "timestamp")]
    pub date: Option<String>,
}

impl Document {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), title: None, text: text.into(), date: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_accepted_for_text() {
        let doc: Document = serde_json::from_str(r#"{"id": "a", "body": "hello"}"#).unwrap();
        assert_eq!(doc, Document::new("a", "hello"));
    }

    #[test]
    fn optional_fields() {
        let doc: Document =
            serde_json::from_str(r#"{"id": "a", "title": "T", "text": "x", "date": "2002-01-01"}"#).unwrap();
        assert_eq!(doc.title.as_deref(), Some("T"));
        assert_eq!(doc.date.as_deref(), Some("2002-01-01"));
    }
}
