//! ZIP container abstraction for Office Open XML packages.

use crate::error::{Error, Result};
use crate::model::Metadata;
use quick_xml::events::Event;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Component, Path, PathBuf};

/// Relationship type of the package's main document part.
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Strict-conformance variant of [`OFFICE_DOCUMENT_REL`].
const OFFICE_DOCUMENT_REL_STRICT: &str =
    "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";

/// Main part location used when the package relationships don't name one.
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_type: HashMap<String, Vec<Relationship>>,
    count: usize,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get relationships by type.
    pub fn get_by_type(&self, rel_type: &str) -> &[Relationship] {
        self.by_type.get(rel_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.by_type
            .entry(rel.rel_type.clone())
            .or_default()
            .push(rel);
        self.count += 1;
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Decode XML bytes handling UTF-8 and UTF-16 (LE/BE), with or without BOM.
///
/// After UTF-16 input is decoded, the XML declaration is rewritten to say
/// UTF-8 so the XML reader does not try to re-decode the text.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes).map(|s| declare_utf8(&s));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes).map(|s| declare_utf8(&s));
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        // No BOM: ASCII markup in UTF-16 leaves zero bytes at odd (LE) or even (BE) offsets
        Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
            decode_utf16(bytes, u16::from_le_bytes).map(|s| declare_utf8(&s))
        }
        Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
            decode_utf16(bytes, u16::from_be_bytes).map(|s| declare_utf8(&s))
        }
        Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Rewrite a UTF-16 encoding declaration to UTF-8.
fn declare_utf8(content: &str) -> String {
    if !content.starts_with("<?xml") {
        return content.to_string();
    }
    let Some(end) = content.find("?>") else {
        return content.to_string();
    };
    let (decl, rest) = content.split_at(end + 2);
    let mut fixed = decl.to_string();
    for quote in ['"', '\''] {
        for label in ["UTF-16", "utf-16"] {
            fixed = fixed.replace(
                &format!("encoding={quote}{label}{quote}"),
                &format!("encoding={quote}UTF-8{quote}"),
            );
        }
    }
    fixed + rest
}

/// OOXML container over a ZIP archive.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docdown::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("report.docx")?;
    /// assert!(container.exists("[Content_Types].xml"));
    /// # Ok::<(), docdown::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_xml_bytes(&bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// List all parts in the archive.
    pub fn list_files(&self) -> Vec<String> {
        self.archive.borrow().file_names().map(String::from).collect()
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.parse_relationships("_rels/.rels")
    }

    /// Locate the main document part.
    ///
    /// Follows the package's officeDocument relationship and falls back to
    /// `word/document.xml` when there is no internal one.
    pub fn main_document_path(&self) -> Result<String> {
        let rels = self.read_package_relationships()?;
        let target = [OFFICE_DOCUMENT_REL, OFFICE_DOCUMENT_REL_STRICT]
            .iter()
            .find_map(|t| rels.get_by_type(t).iter().find(|rel| !rel.external))
            .map(|rel| Self::resolve_path("", &rel.target));

        match target {
            Some(path) => Ok(path),
            None => {
                log::debug!(
                    "no officeDocument relationship, using {}",
                    DEFAULT_DOCUMENT_PART
                );
                Ok(DEFAULT_DOCUMENT_PART.to_string())
            }
        }
    }

    /// Parse core metadata from docProps/core.xml.
    ///
    /// A missing or malformed core part yields empty metadata.
    pub fn parse_core_metadata(&self) -> Metadata {
        let mut meta = Metadata::default();
        let Ok(xml) = self.read_xml("docProps/core.xml") else {
            return meta;
        };

        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);
        let mut current: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    current =
                        Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Ok(Event::Text(e)) => {
                    let Some(field) = current.as_deref() else {
                        continue;
                    };
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match field {
                        "title" => meta.title = Some(text),
                        "creator" => meta.author = Some(text),
                        "subject" => meta.subject = Some(text),
                        "created" => meta.created = Some(text),
                        "modified" => meta.modified = Some(text),
                        _ => {}
                    }
                }
                Ok(Event::End(_)) => current = None,
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("ignoring malformed docProps/core.xml: {}", e);
                    break;
                }
                _ => {}
            }
        }

        meta
    }

    /// Parse a relationships file; a missing file yields an empty collection.
    fn parse_relationships(&self, rels_path: &str) -> Result<Relationships> {
        let content = match self.read_xml(rels_path) {
            Ok(c) => c,
            Err(Error::MissingComponent(_)) => return Ok(Relationships::new()),
            Err(e) => return Err(e),
        };

        let mut rels = Relationships::new();
        let mut reader = quick_xml::Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event()? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    let mut rel = Relationship {
                        id: String::new(),
                        rel_type: String::new(),
                        target: String::new(),
                        external: false,
                    };
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            b"TargetMode" => rel.external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }
                    if !rel.id.is_empty() {
                        rels.add(rel);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(rels)
    }

    /// Resolve a relationship target against the part that owns it.
    ///
    /// Absolute targets (leading `/`) are package-rooted; relative ones are
    /// resolved from the directory of `base`.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let mut result: PathBuf = Path::new(base)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        for component in Path::new(relative).components() {
            match component {
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(c) => result.push(c),
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        buffer
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            OoxmlContainer::resolve_path("word/document.xml", "../media/image1.png"),
            "media/image1.png"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("word/document.xml", "styles.xml"),
            "word/styles.xml"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("", "word/document.xml"),
            "word/document.xml"
        );
        assert_eq!(
            OoxmlContainer::resolve_path("", "/word/document2.xml"),
            "word/document2.xml"
        );
    }

    #[test]
    fn test_relationships_collection() {
        let mut rels = Relationships::new();
        assert!(rels.is_empty());
        rels.add(Relationship {
            id: "rId1".to_string(),
            rel_type: "http://test/type1".to_string(),
            target: "target1.xml".to_string(),
            external: false,
        });
        rels.add(Relationship {
            id: "rId2".to_string(),
            rel_type: "http://test/type1".to_string(),
            target: "target2.xml".to_string(),
            external: false,
        });

        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get_by_type("http://test/type1").len(), 2);
        assert!(rels.get_by_type("http://test/other").is_empty());
    }

    #[test]
    fn test_utf16_decoding() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }

    #[test]
    fn test_utf16_declaration_rewritten() {
        let decl = r#"<?xml version="1.0" encoding="UTF-16"?><a/>"#;
        let mut bytes = vec![0xFF, 0xFE];
        for unit in decl.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let decoded = decode_xml_bytes(&bytes).unwrap();
        assert_eq!(decoded, r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#);
    }

    #[test]
    fn test_main_document_from_relationships() {
        let data = build_zip(&[(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/word/document2.xml"/>
</Relationships>"#,
        )]);
        let container = OoxmlContainer::from_bytes(data).unwrap();

        assert_eq!(container.main_document_path().unwrap(), "word/document2.xml");
    }

    #[test]
    fn test_main_document_skips_external_target() {
        let data = build_zip(&[(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="http://example.com/doc.xml" TargetMode="External"/>
</Relationships>"#,
        )]);
        let container = OoxmlContainer::from_bytes(data).unwrap();

        assert_eq!(container.main_document_path().unwrap(), DEFAULT_DOCUMENT_PART);
    }

    #[test]
    fn test_main_document_fallback() {
        let data = build_zip(&[("word/document.xml", "<w:document/>")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();

        assert!(container.exists("word/document.xml"));
        assert!(!container.exists("_rels/.rels"));
        assert_eq!(container.main_document_path().unwrap(), DEFAULT_DOCUMENT_PART);
    }

    #[test]
    fn test_core_metadata() {
        let data = build_zip(&[(
            "docProps/core.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/">
  <dc:title>Interview Prep</dc:title>
  <dc:creator>Jamie</dc:creator>
  <dcterms:created>2024-05-01T10:00:00Z</dcterms:created>
</cp:coreProperties>"#,
        )]);
        let container = OoxmlContainer::from_bytes(data).unwrap();
        let meta = container.parse_core_metadata();

        assert_eq!(meta.title.as_deref(), Some("Interview Prep"));
        assert_eq!(meta.author.as_deref(), Some("Jamie"));
        assert_eq!(meta.created.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert!(meta.subject.is_none());
    }

    #[test]
    fn test_missing_part() {
        let data = build_zip(&[("a.xml", "<a/>")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();

        let err = container.read_xml("word/styles.xml").unwrap_err();
        assert!(matches!(err, Error::MissingComponent(p) if p == "word/styles.xml"));
        assert!(container.parse_core_metadata().is_empty());
    }
}
