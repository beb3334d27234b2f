//! DOCX (Word) document reader.
//!
//! Turns the main document part into a [`Document`](crate::model::Document):
//! body paragraphs with resolved style names, and top-level tables.

mod parser;
pub mod styles;

pub use parser::DocxParser;
pub use styles::{Style, StyleMap, StyleType};
