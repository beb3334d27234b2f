//! DOCX parser implementation.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{Cell, Document, Paragraph, Row, Table};
use quick_xml::events::{BytesStart, Event};

use super::styles::{attr_value, StyleMap};

/// Parser for DOCX (Word) documents.
#[derive(Debug)]
pub struct DocxParser {
    container: OoxmlContainer,
    styles: StyleMap,
    document_path: String,
}

impl DocxParser {
    /// Open a DOCX file for parsing.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Create a parser from a container.
    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let document_path = container.main_document_path()?;
        let styles_path = OoxmlContainer::resolve_path(&document_path, "styles.xml");

        let styles = match container.read_xml(&styles_path) {
            Ok(xml) => StyleMap::parse(&xml).unwrap_or_else(|e| {
                log::warn!("ignoring unparsable {}: {}", styles_path, e);
                StyleMap::default()
            }),
            Err(_) => {
                log::debug!("no styles part at {}", styles_path);
                StyleMap::default()
            }
        };

        Ok(Self {
            container,
            styles,
            document_path,
        })
    }

    /// Parse the document into paragraphs and tables.
    pub fn parse(&self) -> Result<Document> {
        let xml = self.container.read_xml(&self.document_path)?;

        let mut walker = BodyWalker::new(&self.styles);
        walker.walk(&xml)?;

        let mut doc = walker.finish();
        doc.metadata = self.container.parse_core_metadata();

        log::debug!(
            "parsed {}: {} paragraphs, {} tables",
            self.document_path,
            doc.paragraphs.len(),
            doc.tables.len()
        );
        Ok(doc)
    }
}

/// Paragraph being collected, tagged with the table depth it was opened at.
struct OpenParagraph {
    depth: usize,
    style_id: Option<String>,
    text: String,
}

/// `w:vMerge` state of a table cell.
#[derive(Clone, Copy, PartialEq, Eq)]
enum VerticalMerge {
    None,
    Restart,
    Continue,
}

struct OpenCell {
    paragraphs: Vec<String>,
    grid_span: usize,
    v_merge: VerticalMerge,
}

/// Collects a top-level table, expanding merged cells onto the grid.
#[derive(Default)]
struct TableBuilder {
    rows: Vec<Row>,
    row: Option<Vec<Cell>>,
    cell: Option<OpenCell>,
}

impl TableBuilder {
    fn start_row(&mut self) {
        self.row = Some(Vec::new());
    }

    fn start_cell(&mut self) {
        self.cell = Some(OpenCell {
            paragraphs: Vec::new(),
            grid_span: 1,
            v_merge: VerticalMerge::None,
        });
    }

    fn end_cell(&mut self) {
        let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) else {
            return;
        };

        let above = self.rows.last();
        let text = cell.paragraphs.join("\n");
        for _ in 0..cell.grid_span {
            let grid_col = row.len();
            let text = match cell.v_merge {
                VerticalMerge::Continue => above
                    .and_then(|r| r.cells.get(grid_col))
                    .map(|c| c.text.clone())
                    .unwrap_or_default(),
                VerticalMerge::None | VerticalMerge::Restart => text.clone(),
            };
            row.push(Cell::with_text(text));
        }
    }

    fn end_row(&mut self) {
        if let Some(cells) = self.row.take() {
            self.rows.push(Row { cells });
        }
    }

    fn finish(self) -> Table {
        Table { rows: self.rows }
    }
}

/// Single-pass walker over the main document part.
///
/// Body paragraphs sit at table depth 0 and cell paragraphs of a top-level
/// table at depth 1; anything deeper belongs to nested tables and is dropped.
struct BodyWalker<'a> {
    styles: &'a StyleMap,
    doc: Document,
    in_body: bool,
    table_depth: usize,
    /// Depth inside elements whose content is never part of paragraph text
    skip_depth: usize,
    in_run: bool,
    in_text: bool,
    paragraph: Option<OpenParagraph>,
    table: Option<TableBuilder>,
}

impl<'a> BodyWalker<'a> {
    fn new(styles: &'a StyleMap) -> Self {
        Self {
            styles,
            doc: Document::new(),
            in_body: false,
            table_depth: 0,
            skip_depth: 0,
            in_run: false,
            in_text: false,
            paragraph: None,
            table: None,
        }
    }

    fn walk(&mut self, xml: &str) -> Result<()> {
        let mut reader = quick_xml::Reader::from_str(xml);
        // xml:space="preserve" text must keep its spaces
        reader.config_mut().trim_text(false);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => self.open(&e),
                Ok(Event::Empty(e)) => {
                    self.open(&e);
                    self.close(e.name().as_ref());
                }
                Ok(Event::End(e)) => self.close(e.name().as_ref()),
                Ok(Event::Text(e)) => {
                    if self.in_text && self.skip_depth == 0 {
                        let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        self.push_text(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if self.in_text && self.skip_depth == 0 {
                        self.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlParse(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn open(&mut self, e: &BytesStart) {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return;
        }

        match e.name().as_ref() {
            b"w:body" => self.in_body = true,
            // Drawings, text boxes, embedded objects, move sources and tracked property changes
            b"w:drawing" | b"w:pict" | b"w:object" | b"mc:AlternateContent" | b"w:txbxContent"
            | b"w:moveFrom" | b"w:pPrChange" | b"w:rPrChange" => self.skip_depth = 1,
            b"w:tbl" if self.in_body => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(TableBuilder::default());
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    table.start_row();
                }
            }
            b"w:tc" if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    table.start_cell();
                }
            }
            b"w:gridSpan" if self.table_depth == 1 => {
                let span = attr_value(e, b"w:val").and_then(|v| v.parse::<usize>().ok());
                if let Some(cell) = self.open_cell() {
                    cell.grid_span = span.unwrap_or(1).max(1);
                }
            }
            b"w:vMerge" if self.table_depth == 1 => {
                let restart = attr_value(e, b"w:val").is_some_and(|v| v == "restart");
                if let Some(cell) = self.open_cell() {
                    cell.v_merge = if restart {
                        VerticalMerge::Restart
                    } else {
                        VerticalMerge::Continue
                    };
                }
            }
            b"w:p" if self.in_body && self.table_depth <= 1 => {
                self.paragraph = Some(OpenParagraph {
                    depth: self.table_depth,
                    style_id: None,
                    text: String::new(),
                });
            }
            b"w:pStyle" => {
                if let Some(para) = self.current_paragraph() {
                    para.style_id = attr_value(e, b"w:val");
                }
            }
            b"w:r" => self.in_run = true,
            b"w:t" if self.in_run => self.in_text = true,
            b"w:tab" | b"w:ptab" if self.in_run => self.push_text("\t"),
            b"w:cr" if self.in_run => self.push_text("\n"),
            b"w:noBreakHyphen" if self.in_run => self.push_text("-"),
            b"w:br" if self.in_run => {
                // Page and column breaks carry no text
                let kind = attr_value(e, b"w:type");
                if kind.as_deref().is_none_or(|k| k == "textWrapping") {
                    self.push_text("\n");
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }

        match name {
            b"w:body" => self.in_body = false,
            b"w:t" => self.in_text = false,
            b"w:r" => self.in_run = false,
            b"w:p" => self.finish_paragraph(),
            b"w:tc" if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    table.end_cell();
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    table.end_row();
                }
            }
            b"w:tbl" if self.table_depth > 0 => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.take() {
                        self.doc.add_table(table.finish());
                    }
                }
                self.table_depth -= 1;
            }
            _ => {}
        }
    }

    /// The open paragraph, if it belongs to the current table depth.
    fn current_paragraph(&mut self) -> Option<&mut OpenParagraph> {
        let depth = self.table_depth;
        self.paragraph.as_mut().filter(|p| p.depth == depth)
    }

    fn open_cell(&mut self) -> Option<&mut OpenCell> {
        self.table.as_mut().and_then(|t| t.cell.as_mut())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(para) = self.current_paragraph() {
            para.text.push_str(text);
        }
    }

    fn finish_paragraph(&mut self) {
        let depth = self.table_depth;
        let Some(para) = self.paragraph.take_if(|p| p.depth == depth) else {
            return;
        };
        self.in_run = false;
        self.in_text = false;

        if depth == 0 {
            let style = self.styles.paragraph_label(para.style_id.as_deref());
            self.doc.add_paragraph(Paragraph {
                text: para.text,
                style,
            });
        } else if let Some(cell) = self.open_cell() {
            cell.paragraphs.push(para.text);
        }
    }

    fn finish(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn walk(body: &str) -> Document {
        walk_with_styles(body, &StyleMap::default())
    }

    fn walk_with_styles(body: &str, styles: &StyleMap) -> Document {
        let xml = format!("<w:document {}><w:body>{}</w:body></w:document>", NS, body);
        let mut walker = BodyWalker::new(styles);
        walker.walk(&xml).unwrap();
        walker.finish()
    }

    #[test]
    fn test_paragraph_text_and_style() {
        let doc = walk(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr>
                 <w:r><w:t>Design</w:t></w:r><w:r><w:t xml:space="preserve"> goals</w:t></w:r></w:p>
               <w:p><w:r><w:t>Plain</w:t></w:r></w:p>"#,
        );

        assert_eq!(
            doc.paragraphs,
            vec![
                Paragraph::styled("Design goals", "Heading2"),
                Paragraph::with_text("Plain"),
            ]
        );
    }

    #[test]
    fn test_special_run_content() {
        let doc = walk(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
                 <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t>
                      <w:br w:type="page"/><w:t>d</w:t><w:noBreakHyphen/><w:t>e</w:t></w:r></w:p>"#,
        );

        assert_eq!(doc.paragraphs[0].text, "a\tb\ncd-e");
    }

    #[test]
    fn test_ignored_run_content() {
        let doc = walk(
            r#"<w:p>
                 <w:r><w:instrText> PAGE </w:instrText></w:r>
                 <w:del><w:r><w:delText>gone</w:delText></w:r></w:del>
                 <w:ins><w:r><w:t>added</w:t></w:r></w:ins>
                 <w:hyperlink><w:r><w:t> link</w:t></w:r></w:hyperlink>
                 <w:r><w:drawing><wp:inline><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></wp:inline></w:drawing></w:r>
               </w:p>"#,
        );

        assert_eq!(doc.paragraphs.len(), 1);
        assert_eq!(doc.paragraphs[0].text, "added link");
    }

    #[test]
    fn test_moved_text_kept_once() {
        let doc = walk(
            r#"<w:p>
                 <w:moveFrom w:id="1"><w:r><w:t xml:space="preserve">moved </w:t></w:r></w:moveFrom>
                 <w:r><w:t>stay</w:t></w:r>
                 <w:moveTo w:id="2"><w:r><w:t xml:space="preserve"> moved</w:t></w:r></w:moveTo>
               </w:p>"#,
        );

        assert_eq!(doc.paragraphs[0].text, "stay moved");
    }

    #[test]
    fn test_escaped_text() {
        let doc = walk(r#"<w:p><w:r><w:t>R&amp;D &lt;team&gt;</w:t></w:r></w:p>"#);
        assert_eq!(doc.paragraphs[0].text, "R&D <team>");
    }

    #[test]
    fn test_empty_paragraph_kept_in_model() {
        let doc = walk(r#"<w:p/><w:p><w:pPr/></w:p>"#);
        assert_eq!(doc.paragraphs.len(), 2);
        assert!(doc.paragraphs.iter().all(Paragraph::is_empty));
    }

    #[test]
    fn test_table_paragraphs_are_not_body_paragraphs() {
        let doc = walk(
            r#"<w:p><w:r><w:t>Before</w:t></w:r></w:p>
               <w:tbl>
                 <w:tr>
                   <w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p><w:p><w:r><w:t>more</w:t></w:r></w:p></w:tc>
                   <w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc>
                 </w:tr>
               </w:tbl>
               <w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        );

        let texts: Vec<&str> = doc.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Before", "After"]);
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].rows[0], Row::from_texts(["A1\nmore", "B1"]));
    }

    #[test]
    fn test_nested_table_excluded_from_cell() {
        let doc = walk(
            r#"<w:tbl><w:tr><w:tc>
                 <w:p><w:r><w:t>outer</w:t></w:r></w:p>
                 <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
                 <w:p/>
               </w:tc></w:tr></w:tbl>"#,
        );

        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].rows.len(), 1);
        assert_eq!(doc.tables[0].rows[0].cells[0].text, "outer\n");
    }

    #[test]
    fn test_merged_cells_expand_onto_grid() {
        let doc = walk(
            r#"<w:tbl>
                 <w:tr>
                   <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>Wide</w:t></w:r></w:p></w:tc>
                   <w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>Tall</w:t></w:r></w:p></w:tc>
                 </w:tr>
                 <w:tr>
                   <w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc>
                   <w:tc><w:p><w:r><w:t>y</w:t></w:r></w:p></w:tc>
                   <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>
                 </w:tr>
               </w:tbl>"#,
        );

        let table = &doc.tables[0];
        assert_eq!(table.rows[0], Row::from_texts(["Wide", "Wide", "Tall"]));
        assert_eq!(table.rows[1], Row::from_texts(["x", "y", "Tall"]));
    }

    #[test]
    fn test_styles_resolve_through_map() {
        let styles = StyleMap::parse(
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
                 <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
                 <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
               </w:styles>"#,
        )
        .unwrap();

        let doc = walk_with_styles(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>H</w:t></w:r></w:p>
               <w:p><w:r><w:t>body</w:t></w:r></w:p>"#,
            &styles,
        );

        assert_eq!(doc.paragraphs[0].style(), Some("Heading 1"));
        assert_eq!(doc.paragraphs[1].style(), Some("Normal"));
    }

    #[test]
    fn test_tracked_style_change_ignored() {
        let doc = walk(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/>
                 <w:pPrChange w:id="1"><w:pPr><w:pStyle w:val="Normal"/></w:pPr></w:pPrChange>
               </w:pPr><w:r><w:t>T</w:t></w:r></w:p>"#,
        );

        assert_eq!(doc.paragraphs[0].style(), Some("Title"));
    }

    #[test]
    fn test_malformed_xml() {
        let styles = StyleMap::default();
        let mut walker = BodyWalker::new(&styles);
        let result = walker.walk("<w:document><w:body><w:p></w:body></w:document>");
        assert!(matches!(result, Err(Error::XmlParse(_))));
    }
}
