//! In-memory document model.
//!
//! The DOCX reader produces these structures and the renderers consume them.
//! A document keeps its paragraphs and tables as two separate ordered lists;
//! their relative position in the source is not tracked.

mod document;
mod paragraph;
mod table;

pub use document::*;
pub use paragraph::*;
pub use table::*;
