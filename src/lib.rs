//! # docdown
//!
//! Convert Word documents (DOCX) to Markdown.
//!
//! Paragraph styles become ATX headings ("Title" and "Heading N" styles),
//! other paragraphs become plain text lines, and tables become pipe tables.
//! All body paragraphs are emitted first, followed by all tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docdown::{convert_file, parse_file, to_markdown};
//!
//! // Convert to a Markdown string
//! let markdown = to_markdown("report.docx")?;
//! println!("{}", markdown);
//!
//! // Write report.md next to the input
//! let written = convert_file("report.docx", None)?;
//! println!("Created: {}", written.display());
//!
//! // Full parsing with access to structure
//! let doc = parse_file("report.docx")?;
//! println!("Paragraphs: {}", doc.paragraphs.len());
//! println!("Tables: {}", doc.tables.len());
//! # Ok::<(), docdown::Error>(())
//! ```
//!
//! ## Features
//!
//! - `docx` (default): the DOCX reader. Without it every parse entry point
//!   returns [`Error::ReaderUnavailable`].
//! - `async`: [`parse_file_async`] reads the file with Tokio.

pub mod container;
pub mod detect;
pub mod error;
pub mod model;

#[cfg(feature = "docx")]
pub mod docx;

pub mod render;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{Cell, Document, HeadingLevel, Metadata, Paragraph, Row, Table};

use std::path::{Path, PathBuf};

/// Whether this build includes the DOCX reader.
pub const DOCX_SUPPORT: bool = cfg!(feature = "docx");

/// Parse a document file and return a Document model.
///
/// # Example
///
/// ```no_run
/// use docdown::parse_file;
///
/// let doc = parse_file("document.docx")?;
/// println!("Paragraphs: {}", doc.paragraphs.len());
/// # Ok::<(), docdown::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    detect_format_from_path(path)?.ensure_supported()?;
    parse_docx_file(path)
}

/// Parse a document from bytes.
///
/// # Example
///
/// ```no_run
/// use docdown::parse_bytes;
///
/// let data = std::fs::read("document.docx")?;
/// let doc = parse_bytes(&data)?;
/// # Ok::<(), docdown::Error>(())
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    detect_format_from_bytes(data)?.ensure_supported()?;
    parse_docx_bytes(data)
}

#[cfg(feature = "docx")]
fn parse_docx_file(path: &Path) -> Result<Document> {
    docx::DocxParser::open(path)?.parse()
}

#[cfg(feature = "docx")]
fn parse_docx_bytes(data: &[u8]) -> Result<Document> {
    docx::DocxParser::from_bytes(data.to_vec())?.parse()
}

#[cfg(not(feature = "docx"))]
fn parse_docx_file(_path: &Path) -> Result<Document> {
    Err(Error::ReaderUnavailable)
}

#[cfg(not(feature = "docx"))]
fn parse_docx_bytes(_data: &[u8]) -> Result<Document> {
    Err(Error::ReaderUnavailable)
}

/// Parse a document file, reading it asynchronously.
///
/// Only the read is asynchronous; parsing runs on the calling task.
#[cfg(feature = "async")]
pub async fn parse_file_async(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    parse_bytes(&data)
}

/// Convert a document to Markdown.
///
/// # Example
///
/// ```no_run
/// use docdown::to_markdown;
///
/// let markdown = to_markdown("document.docx")?;
/// std::fs::write("output.md", markdown)?;
/// # Ok::<(), docdown::Error>(())
/// ```
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    to_markdown_with_options(path, &render::RenderOptions::default())
}

/// Convert a document to Markdown with options.
///
/// # Example
///
/// ```no_run
/// use docdown::{to_markdown_with_options, render::RenderOptions};
///
/// let options = RenderOptions::default().with_max_heading(3);
/// let markdown = to_markdown_with_options("document.docx", &options)?;
/// # Ok::<(), docdown::Error>(())
/// ```
pub fn to_markdown_with_options(
    path: impl AsRef<Path>,
    options: &render::RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_markdown(&doc, options))
}

/// Output path for an input document: same location, `md` extension.
pub fn markdown_path_for(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("md")
}

/// Convert a document and write the Markdown file.
///
/// The output is `name.md` next to the input, or inside `out_dir` when
/// given. Returns the path written.
pub fn convert_file(input: impl AsRef<Path>, out_dir: Option<&Path>) -> Result<PathBuf> {
    convert_file_with_options(input, out_dir, &render::RenderOptions::default())
}

/// Like [`convert_file`], with explicit render options.
pub fn convert_file_with_options(
    input: impl AsRef<Path>,
    out_dir: Option<&Path>,
    options: &render::RenderOptions,
) -> Result<PathBuf> {
    let input = input.as_ref();
    let markdown = to_markdown_with_options(input, options)?;

    let target = markdown_path_for(input);
    let output = match (out_dir, target.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => target,
    };

    std::fs::write(&output, markdown)?;
    log::info!("wrote {}", output.display());
    Ok(output)
}
