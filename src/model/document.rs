//! Document model structures.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// Document metadata extracted from docProps/core.xml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl Metadata {
    /// Check if no metadata field is set.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

/// A parsed word-processing document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,

    /// Body paragraphs in document order
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,

    /// Top-level tables in document order
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paragraph to the document.
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.paragraphs.push(para);
    }

    /// Add a table to the document.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Check if the document has neither paragraphs nor tables.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty()
    }

    /// Extract all text content as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for para in &self.paragraphs {
            text.push_str(&para.text);
            text.push('\n');
        }
        for table in &self.tables {
            text.push_str(&table.plain_text());
            text.push('\n');
        }
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    #[test]
    fn test_document_creation() {
        let mut doc = Document::new();
        assert!(doc.is_empty());

        doc.add_paragraph(Paragraph::with_text("Hello, World!"));
        assert!(!doc.is_empty());
        assert_eq!(doc.paragraphs.len(), 1);
    }

    #[test]
    fn test_plain_text_extraction() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::styled("Intro", "Heading 1"));
        doc.add_paragraph(Paragraph::with_text("Body text."));

        let mut table = Table::new();
        table.add_row(Row::from_texts(["a", "b"]));
        doc.add_table(table);

        assert_eq!(doc.plain_text(), "Intro\nBody text.\na\tb");
    }

    #[test]
    fn test_metadata_serialization() {
        let meta = Metadata {
            title: Some("Test Document".to_string()),
            author: Some("Test Author".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("Test Document"));
        assert!(json.contains("Test Author"));
        // Empty fields should not be serialized
        assert!(!json.contains("subject"));
    }

    #[test]
    fn test_empty_metadata_skipped() {
        let doc = Document::new();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("metadata"));
    }
}
