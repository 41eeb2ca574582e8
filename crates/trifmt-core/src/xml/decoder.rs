//! XML → Value, driven by the quick-xml pull parser.
//!
//! Open elements live on an explicit stack. When an element closes it is
//! folded into a [`Value`] and attached to its parent, which is where the
//! repetition rule (one occurrence → bare value, more → sequence) applies.
//!
//! Line breaks in text and attribute values are normalized to `\n` before
//! entities are expanded, so `&#13;` still yields a carriage return.

use std::borrow::Cow;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{utf8, DecodeError, Position, Result};
use crate::format::Format;
use crate::options::DecodeOptions;
use crate::value::{Mapping, Value, ATTRIBUTE_PREFIX, TEXT_KEY};

use super::is_xml_name;

/// Decode an XML document into a one-entry mapping `{root_tag: content}`.
///
/// Comments, processing instructions, the XML declaration and DOCTYPE are
/// skipped. Every leaf is a `String` or `Null`; XML carries no types.
pub fn decode(input: &[u8], _options: &DecodeOptions) -> Result<Value, DecodeError> {
    utf8(input, Format::Xml)?;

    let mut reader = Reader::from_reader(input);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event_start = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| syntax_at(input, reader.buffer_position(), e.to_string()))?;

        match event {
            Event::Start(start) => {
                ensure_single_root(input, event_start, &stack, &root)?;
                stack.push(Element::open(&start, input, event_start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(input, event_start, &stack, &root)?;
                let element = Element::open(&start, input, event_start)?;
                attach(element, &mut stack, &mut root);
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    syntax_at(
                        input,
                        event_start,
                        format!(
                            "closing tag </{}> has no matching opening tag",
                            String::from_utf8_lossy(end.name().as_ref())
                        ),
                    )
                })?;
                attach(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = unescape_raw(&text, input, event_start)?;
                append_text(&mut stack, &text, input, event_start)?;
            }
            Event::CData(cdata) => {
                let text = std::str::from_utf8(&cdata)
                    .map_err(|e| syntax_at(input, event_start, e.to_string()))?;
                append_text(&mut stack, &normalize_line_breaks(text), input, event_start)?;
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(syntax_at(
            input,
            input.len(),
            format!("unexpected end of input: element <{}> is not closed", open.name),
        ));
    }

    match root {
        Some((name, content)) => Ok(Value::mapping([(name, content)])),
        None => Err(syntax_at(input, input.len(), "document has no root element")),
    }
}

fn syntax_at(input: &[u8], offset: usize, message: impl Into<String>) -> DecodeError {
    DecodeError::syntax(Format::Xml, message).at(Some(Position::from_offset(input, offset)))
}

/// `\r\n` and lone `\r` become `\n`.
fn normalize_line_breaks(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Normalize line breaks in raw markup, then expand entity and character
/// references.
fn unescape_raw(raw: &[u8], input: &[u8], offset: usize) -> Result<String, DecodeError> {
    let raw = std::str::from_utf8(raw).map_err(|e| syntax_at(input, offset, e.to_string()))?;
    let normalized = normalize_line_breaks(raw);
    unescape(&normalized)
        .map(Cow::into_owned)
        .map_err(|e| syntax_at(input, offset, e.to_string()))
}

fn ensure_single_root(
    input: &[u8],
    offset: usize,
    stack: &[Element],
    root: &Option<(String, Value)>,
) -> Result<(), DecodeError> {
    match root {
        Some((name, _)) if stack.is_empty() => Err(syntax_at(
            input,
            offset,
            format!("second top-level element after root <{name}>"),
        )),
        _ => Ok(()),
    }
}

fn append_text(
    stack: &mut [Element],
    text: &str,
    input: &[u8],
    offset: usize,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(syntax_at(input, offset, "text outside the root element")),
    }
}

/// Hand a closed element to its parent, or make it the document root.
fn attach(element: Element, stack: &mut [Element], root: &mut Option<(String, Value)>) {
    let name = element.name.clone();
    let content = element.finish();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, content),
        None => *root = Some((name, content)),
    }
}

/// An element whose end tag has not been seen yet.
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Mapping,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>, input: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| syntax_at(input, offset, e.to_string()))?
            .to_string();
        if !is_xml_name(&name) {
            return Err(syntax_at(
                input,
                offset,
                format!("'{name}' is not a valid element name"),
            ));
        }

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| syntax_at(input, offset, e.to_string()))?;
            let key = std::str::from_utf8(attribute.key.as_ref())
                .map_err(|e| syntax_at(input, offset, e.to_string()))?
                .to_string();
            if !is_xml_name(&key) {
                return Err(syntax_at(
                    input,
                    offset,
                    format!("'{key}' on <{name}> is not a valid attribute name"),
                ));
            }
            let value = unescape_raw(&attribute.value, input, offset)?;
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            children: Mapping::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, content: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Sequence(items)) => items.push(content),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::Sequence(vec![first, content]);
            }
            None => {
                self.children.insert(name, content);
            }
        }
    }

    /// Attributes first, then children in document order, then `#text`.
    fn finish(self) -> Value {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
        }

        let mut mapping =
            Mapping::with_capacity(self.attributes.len() + self.children.len() + 1);
        for (key, value) in self.attributes {
            mapping.insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value));
        }
        for (key, value) in self.children {
            mapping.insert(key, value);
        }
        if !text.is_empty() {
            mapping.insert(TEXT_KEY, Value::String(text.to_string()));
        }
        Value::Mapping(mapping)
    }
}
