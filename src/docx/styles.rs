//! DOCX styles parsing.
//!
//! Only what the converter needs is kept: style ids, display names, style
//! types and the default paragraph style.

use crate::error::Result;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Style type (paragraph, character, table, numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    fn from_attr(value: &str) -> Option<Self> {
        match value {
            "paragraph" => Some(StyleType::Paragraph),
            "character" => Some(StyleType::Character),
            "table" => Some(StyleType::Table),
            "numbering" => Some(StyleType::Numbering),
            _ => None,
        }
    }
}

/// A parsed style definition.
#[derive(Debug, Clone, Default)]
pub struct Style {
    /// Style ID (e.g., "Heading1")
    pub id: String,
    /// Display name (e.g., "Heading 1")
    pub name: String,
    /// Style type; `w:type` defaults to paragraph when absent
    pub style_type: Option<StyleType>,
}

/// Collection of styles from styles.xml.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    /// Styles by ID
    pub styles: HashMap<String, Style>,
    /// Default paragraph style ID
    pub default_paragraph: Option<String>,
}

impl StyleMap {
    /// Parse styles from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut map = StyleMap::default();
        if xml.trim().is_empty() {
            return Ok(map);
        }

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut current: Option<Style> = None;
        let mut current_is_default = false;
        // w:name also appears in latent styles; only the one directly under w:style counts
        let mut depth_in_style = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"w:style" => {
                    let (style, is_default) = style_header(&e);
                    current = Some(style);
                    current_is_default = is_default;
                    depth_in_style = 0;
                }
                Event::Start(_) if current.is_some() => depth_in_style += 1,
                Event::Empty(e) if depth_in_style == 0 && e.name().as_ref() == b"w:name" => {
                    if let Some(style) = current.as_mut() {
                        style.name = attr_value(&e, b"w:val").unwrap_or_default();
                    }
                }
                Event::Empty(e) if e.name().as_ref() == b"w:style" => {
                    let (style, is_default) = style_header(&e);
                    map.insert(style, is_default);
                }
                Event::End(e) if e.name().as_ref() == b"w:style" => {
                    if let Some(style) = current.take() {
                        map.insert(style, current_is_default);
                    }
                }
                Event::End(_) if current.is_some() => {
                    depth_in_style = depth_in_style.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!("parsed {} styles", map.styles.len());
        Ok(map)
    }

    fn insert(&mut self, style: Style, is_default: bool) {
        if style.id.is_empty() {
            return;
        }
        if is_default && style.style_type == Some(StyleType::Paragraph) {
            self.default_paragraph = Some(style.id.clone());
        }
        self.styles.insert(style.id.clone(), style);
    }

    /// Get a style by ID.
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Check if no styles were loaded.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve the style label of a paragraph.
    ///
    /// `style_id` is the paragraph's `w:pStyle` value. An absent or unknown id
    /// (or one naming a non-paragraph style) resolves to the default paragraph
    /// style. With no styles part at all, the raw id is used as the label.
    pub fn paragraph_label(&self, style_id: Option<&str>) -> Option<String> {
        if self.is_empty() {
            return style_id.map(str::to_string);
        }

        let style = style_id
            .and_then(|id| self.get(id))
            .filter(|s| s.style_type == Some(StyleType::Paragraph))
            .or_else(|| self.default_paragraph.as_deref().and_then(|id| self.get(id)))?;

        if style.name.is_empty() {
            Some(style.id.clone())
        } else {
            Some(ui_name(&style.name))
        }
    }
}

/// Read id, type and default flag from a `w:style` element.
fn style_header(e: &BytesStart) -> (Style, bool) {
    let mut style = Style {
        style_type: Some(StyleType::Paragraph),
        ..Default::default()
    };
    let mut is_default = false;

    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"w:styleId" => style.id = value.into_owned(),
            b"w:type" => style.style_type = StyleType::from_attr(&value),
            b"w:default" => is_default = matches!(value.as_ref(), "1" | "true" | "on"),
            _ => {}
        }
    }

    (style, is_default)
}

/// Get an attribute value as a string.
pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Map built-in style names stored in lowercase to the names Word shows.
fn ui_name(name: &str) -> String {
    const BUILT_IN: &[&str] = &["caption", "footer", "header"];

    let lower = name.to_lowercase();
    if BUILT_IN.contains(&lower.as_str()) {
        let mut chars = lower.chars();
        return chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect())
            .unwrap_or_default();
    }
    if let Some(n) = lower.strip_prefix("heading ") {
        if n.len() == 1 && n.chars().all(|c| ('1'..='9').contains(&c)) {
            return format!("Heading {}", n);
        }
    }
    name.to_string()
}
