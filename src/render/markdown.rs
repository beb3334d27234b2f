//! Markdown renderer implementation.
//!
//! Output is a list of lines joined by a blank line. All body paragraphs
//! come first, in document order, followed by every table. A table is
//! framed by two empty lines, so it ends up separated from its neighbours
//! by extra blank lines while its own rows stay two newlines apart.

use super::options::RenderOptions;
use super::style_mapping::classify_style;
use crate::model::{Document, Paragraph, Row, Table};

/// Render a document to Markdown.
///
/// # Example
///
/// ```
/// use docdown::render::{to_markdown, RenderOptions};
/// use docdown::{Document, Paragraph};
///
/// let mut doc = Document::new();
/// doc.add_paragraph(Paragraph::styled("Intro", "Heading 1"));
/// doc.add_paragraph(Paragraph::with_text("Hello."));
///
/// assert_eq!(to_markdown(&doc, &RenderOptions::default()), "# Intro\n\nHello.");
/// ```
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> String {
    let mut lines: Vec<String> = doc
        .paragraphs
        .iter()
        .filter_map(|para| render_paragraph(para, options))
        .collect();

    for table in &doc.tables {
        lines.extend(render_table(table));
    }

    lines.join("\n\n")
}

/// Render one paragraph, or `None` when it has no visible text.
fn render_paragraph(para: &Paragraph, options: &RenderOptions) -> Option<String> {
    let text = para.text.trim();
    if text.is_empty() {
        return None;
    }

    let level = classify_style(para.style())
        .level()
        .min(options.max_heading_level);
    if level == 0 {
        return Some(text.to_string());
    }

    let marker = options.heading_marker.to_string().repeat(level as usize);
    Some(format!("{} {}", marker, text))
}

/// Render a table to its block of lines.
///
/// The separator row follows the first row only when there is more than one
/// row, and its width comes from the first row. Later rows are neither padded
/// nor truncated to match.
fn render_table(table: &Table) -> Vec<String> {
    if table.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(table.row_count() + 3);
    lines.push(String::new());

    for (i, row) in table.rows.iter().enumerate() {
        lines.push(render_row(row));
        if i == 0 && table.row_count() >= 2 {
            lines.push(separator(table.column_count()));
        }
    }

    lines.push(String::new());
    lines
}

fn render_row(row: &Row) -> String {
    let cells: Vec<String> = row
        .cells
        .iter()
        .map(|cell| cell.text.trim().replace('\n', " "))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn separator(columns: usize) -> String {
    format!("|{}", " --- |".repeat(columns))
}
