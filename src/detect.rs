//! Format detection for Office Open XML packages.
//!
//! Only word-processing packages are converted; spreadsheets and
//! presentations are recognised so they can be rejected with a clear error.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
/// Macro-enabled documents share the body schema.
const DOCM_CONTENT_TYPE: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Detected Office package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Word document (.docx)
    Docx,
    /// Excel workbook (.xlsx)
    Xlsx,
    /// PowerPoint presentation (.pptx)
    Pptx,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
            FormatType::Pptx => "pptx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Pptx => "PowerPoint Presentation",
        }
    }

    /// Whether documents of this format can be converted.
    pub fn is_supported(&self) -> bool {
        matches!(self, FormatType::Docx)
    }

    /// Return `self` if convertible, otherwise [`Error::UnsupportedFormat`].
    pub fn ensure_supported(self) -> Result<Self> {
        if self.is_supported() {
            Ok(self)
        } else {
            Err(Error::UnsupportedFormat(self.name().to_string()))
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format type from a file path.
///
/// # Example
///
/// ```no_run
/// use docdown::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("notes.docx")?;
/// println!("Detected format: {}", format);
/// # Ok::<(), docdown::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let mut magic = [0u8; 4];
    if reader.read_exact(&mut magic).is_err() || !is_zip_file(&magic) {
        return Err(Error::UnknownFormat);
    }
    reader.rewind()?;
    detect_format_from_reader(reader)
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_format_from_reader(std::io::Cursor::new(data))
}

/// Detect the format type from a reader positioned at the start of a ZIP archive.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Some(decode_xml_bytes(&bytes)?)
        }
        Err(_) => None,
    };

    if let Some(types) = content_types {
        if types.contains(DOCX_CONTENT_TYPE) || types.contains(DOCM_CONTENT_TYPE) {
            return Ok(FormatType::Docx);
        }
        if types.contains(XLSX_CONTENT_TYPE) {
            return Ok(FormatType::Xlsx);
        }
        if types.contains(PPTX_CONTENT_TYPE) {
            return Ok(FormatType::Pptx);
        }
    } else {
        log::debug!("package has no [Content_Types].xml, checking folder layout");
    }

    detect_by_folder_structure(&archive)
}

/// Fallback detection by top-level folder.
fn detect_by_folder_structure<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> Result<FormatType> {
    let has = |prefix: &str| archive.file_names().any(|n| n.starts_with(prefix));

    match (has("word/"), has("xl/"), has("ppt/")) {
        (true, false, false) => Ok(FormatType::Docx),
        (false, true, false) => Ok(FormatType::Xlsx),
        (false, false, true) => Ok(FormatType::Pptx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
