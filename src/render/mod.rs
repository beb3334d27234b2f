//! Output rendering for documents.
//!
//! Paragraph styles are mapped to heading levels by [`classify_style`], and
//! [`to_markdown`] turns a [`Document`](crate::Document) into Markdown text.
//! [`to_json`] dumps the parsed model for inspection.
//!
//! # Example
//!
//! ```no_run
//! use docdown::{parse_file, render::*};
//!
//! let doc = parse_file("document.docx")?;
//!
//! let md = to_markdown(&doc, &RenderOptions::default());
//! let json = to_json(&doc, JsonFormat::Pretty)?;
//! # Ok::<(), docdown::Error>(())
//! ```

mod json;
mod markdown;
mod options;
mod style_mapping;

pub use json::{to_json, to_json_default, JsonFormat};
pub use markdown::to_markdown;
pub use options::RenderOptions;
pub use style_mapping::classify_style;
