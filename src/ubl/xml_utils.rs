use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::io::Cursor;
use tracing::warn;

use super::ir::{Body, Node};
use crate::core::CodecError;

pub type XmlResult = Result<String, CodecError>;

fn xml_io(e: std::io::Error) -> CodecError {
    CodecError::Xml(format!("XML write error: {e}"))
}

/// Indenting writer over an in-memory buffer. Text and attribute values are
/// passed through [`xml_safe`] and entity-escaped (`& < > " '`) on the way
/// out.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, CodecError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> XmlResult {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| CodecError::Xml(format!("XML UTF-8 error: {e}")))
    }

    /// Write `node` and its subtree.
    pub fn node(&mut self, node: &Node) -> Result<&mut Self, CodecError> {
        let mut start = BytesStart::new(node.name);
        for (k, v) in &node.attrs {
            let value = checked_chars(node.name, v);
            start.push_attribute((*k, value.as_ref()));
        }

        match &node.body {
            Body::Text(text) => {
                let text = checked_chars(node.name, text);
                self.writer.write_event(Event::Start(start)).map_err(xml_io)?;
                self.writer
                    .write_event(Event::Text(BytesText::from_escaped(escape(text.as_ref()))))
                    .map_err(xml_io)?;
                self.end_element(node.name)
            }
            Body::Children(children) if children.is_empty() => {
                self.writer.write_event(Event::Empty(start)).map_err(xml_io)?;
                Ok(self)
            }
            Body::Children(children) => {
                self.writer.write_event(Event::Start(start)).map_err(xml_io)?;
                for child in children {
                    self.node(child)?;
                }
                self.end_element(node.name)
            }
        }
    }

    fn end_element(&mut self, name: &str) -> Result<&mut Self, CodecError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }
}

/// Whether XML 1.0 can carry `c` at all, escaped or not.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Drop the characters XML 1.0 forbids (C0 controls other than tab, line
/// feed and carriage return, `U+FFFE`, `U+FFFF`).
pub fn xml_safe(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn checked_chars<'a>(element: &str, value: &'a str) -> Cow<'a, str> {
    let clean = xml_safe(value);
    if let Cow::Owned(_) = clean {
        warn!(element, "dropped characters not allowed in XML");
    }
    clean
}

/// Render a complete document: XML declaration followed by `root`.
pub fn render(root: &Node) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.node(root)?;
    w.into_string()
}

/// Format a Decimal for XML output: always include at least 2 decimal places,
/// strip trailing zeros beyond that.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}
