//! Value → XML, the reverse of the decoder's folding rules.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{EncodeError, EncodeErrorKind, Result};
use crate::format::Format;
use crate::options::EncodeOptions;
use crate::value::{Mapping, Path, Value, ATTRIBUTE_PREFIX, TEXT_KEY};

use super::is_xml_name;

/// Encode a single-key mapping as an XML document whose root element is
/// named after that key.
///
/// `@`-keys become attributes, `#text` becomes element text, sequences
/// become repeated sibling elements. Output is pretty-printed with
/// [`EncodeOptions::indent`] spaces per level (`0` for none).
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let (name, content) = root_element(value)?;

    let writer = if options.indent > 0 {
        Writer::new_with_indent(Vec::new(), b' ', options.indent)
    } else {
        Writer::new(Vec::new())
    };
    let mut encoder = Encoder {
        writer,
        path: Path::default(),
    };

    if options.xml_declaration {
        encoder.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    }
    encoder.path.push_key(name);
    encoder.element(name, content)?;

    let mut out = encoder.writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn root_element(value: &Value) -> Result<(&str, &Value), EncodeError> {
    let mapping = value.as_mapping().ok_or_else(|| {
        error(
            EncodeErrorKind::InvalidRoot,
            format!(
                "document root must be a mapping with exactly one key, found {}",
                value.type_name()
            ),
        )
    })?;

    let mut entries = mapping.iter();
    let (name, content) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(error(
                EncodeErrorKind::InvalidRoot,
                format!(
                    "document root must be a mapping with exactly one key, found {} keys",
                    mapping.len()
                ),
            ))
        }
    };

    if name == TEXT_KEY || name.starts_with(ATTRIBUTE_PREFIX) {
        return Err(error(
            EncodeErrorKind::InvalidRoot,
            format!("reserved key '{name}' cannot name the root element"),
        ));
    }
    if !is_xml_name(name) {
        return Err(error(
            EncodeErrorKind::InvalidKey,
            format!("key '{name}' at $ is not a valid XML element name"),
        ));
    }
    if let Value::Sequence(items) = content {
        return Err(error(
            EncodeErrorKind::InvalidRoot,
            format!(
                "root element <{name}> holds a sequence of {} items; a document has exactly one root",
                items.len()
            ),
        ));
    }
    Ok((name.as_str(), content))
}

fn error(kind: EncodeErrorKind, message: impl Into<String>) -> EncodeError {
    EncodeError::new(Format::Xml, kind, message)
}

struct Encoder<'a> {
    writer: Writer<Vec<u8>>,
    path: Path<'a>,
}

impl<'a> Encoder<'a> {
    fn write(&mut self, event: Event<'_>) -> Result<(), EncodeError> {
        self.writer
            .write_event(event)
            .map_err(|e| error(EncodeErrorKind::Serialization, e.to_string()))
    }

    /// Write one element named `name` holding `value`. Sequences are expanded
    /// by the caller, so one here means a sequence nested in a sequence.
    fn element(&mut self, name: &'a str, value: &'a Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.write(Event::Empty(BytesStart::new(name))),
            Value::Mapping(mapping) => self.mapping_element(name, mapping),
            Value::Sequence(_) => Err(error(
                EncodeErrorKind::UnsupportedValue,
                format!(
                    "sequence nested directly in a sequence at {} has no XML form",
                    self.path
                ),
            )),
            scalar => {
                let text = self.scalar_text(scalar)?;
                if text.is_empty() {
                    return self.write(Event::Empty(BytesStart::new(name)));
                }
                self.write(Event::Start(BytesStart::new(name)))?;
                self.write(Event::Text(BytesText::from_escaped(escape_text(&text))))?;
                self.write(Event::End(BytesEnd::new(name)))
            }
        }
    }

    fn mapping_element(&mut self, name: &'a str, mapping: &'a Mapping) -> Result<(), EncodeError> {
        let mut start = BytesStart::new(name);
        let mut text = String::new();
        let mut children = Vec::new();

        for (key, item) in mapping {
            self.path.push_key(key);
            if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                if !is_xml_name(attribute) {
                    return Err(self.invalid_key(key, "attribute"));
                }
                let value = self.scalar_text(item)?;
                start.push_attribute((attribute.as_bytes(), escape_text(&value).as_bytes()));
            } else if key == TEXT_KEY {
                text = self.scalar_text(item)?;
            } else {
                if !is_xml_name(key) {
                    return Err(self.invalid_key(key, "element"));
                }
                children.push((key.as_str(), item));
            }
            self.path.pop();
        }

        if children.is_empty() && text.is_empty() {
            return self.write(Event::Empty(start));
        }

        self.write(Event::Start(start))?;
        // Text goes first so indentation only ever follows it.
        if !text.is_empty() {
            self.write(Event::Text(BytesText::from_escaped(escape_text(&text))))?;
            if !children.is_empty() {
                self.writer
                    .write_indent()
                    .map_err(|e| error(EncodeErrorKind::Serialization, e.to_string()))?;
            }
        }
        for (key, item) in children {
            self.path.push_key(key);
            match item {
                Value::Sequence(items) => {
                    for (i, each) in items.iter().enumerate() {
                        self.path.push_index(i);
                        self.element(key, each)?;
                        self.path.pop();
                    }
                }
                _ => self.element(key, item)?,
            }
            self.path.pop();
        }
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Text form of a scalar used as element text or attribute value.
    fn scalar_text(&self, value: &Value) -> Result<String, EncodeError> {
        let text = match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(_) | Value::Mapping(_) => {
                return Err(error(
                    EncodeErrorKind::UnsupportedValue,
                    format!(
                        "{} at {} must be a scalar to become XML text or an attribute",
                        value.type_name(),
                        self.path
                    ),
                ))
            }
        };
        if let Some(c) = text.chars().find(|&c| !is_xml_char(c)) {
            return Err(error(
                EncodeErrorKind::UnsupportedValue,
                format!(
                    "character U+{:04X} at {} cannot appear in an XML document",
                    c as u32, self.path
                ),
            ));
        }
        Ok(text)
    }

    fn invalid_key(&self, key: &str, what: &str) -> EncodeError {
        error(
            EncodeErrorKind::InvalidKey,
            format!("key '{key}' at {} is not a valid XML {what} name", self.path),
        )
    }
}

/// Escape markup characters, and carriage returns so a reader's line-break
/// normalization leaves them intact.
fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
