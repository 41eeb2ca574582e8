//! YAML decoding and encoding.
//!
//! Decoding is driven by the `yaml-rust2` event parser. Plain scalars are
//! resolved with the YAML 1.2 core schema and never construct application
//! types: the only tags accepted are the core ones (`!!str`, `!!int`,
//! `!!float`, `!!bool`, `!!null`, `!!map`, `!!seq`) and the non-specific `!`.
//! Mappings are built with last-write-wins, so a repeated key keeps its
//! first position and its last value.
//!
//! Both output styles are written by hand. Strings are quoted whenever a
//! YAML 1.1 or 1.2 reader could take them for anything but a string
//! (`yes`, `ON`, `1_000`, `2001-12-14`, `0x1F`, `null`).

use std::borrow::Cow;
use std::collections::HashMap;

use yaml_rust2::parser::{Event, Parser, Tag};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

use crate::error::{utf8, DecodeError, DecodeErrorKind, EncodeError, Position, Result};
use crate::format::Format;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::value::{Mapping, Number, Value};

/// Prefix the `!!` handle expands to.
const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Implicit keys longer than this are written in explicit `? key` form.
const MAX_IMPLICIT_KEY_CHARS: usize = 1000;

// ============================================================================
// Decoding
// ============================================================================

/// Decode a single YAML document.
///
/// An empty stream decodes to `Null`. A stream holding more than one
/// document is rejected unless [`DecodeOptions::first_document_only`] is set.
pub fn decode(input: &[u8], options: &DecodeOptions) -> Result<Value, DecodeError> {
    let text = utf8(input, Format::Yaml)?;
    let mut reader = EventReader {
        parser: Parser::new_from_str(text),
        text,
    };

    let (event, mark) = reader.next()?;
    if event != Event::StreamStart {
        return Err(reader.syntax(mark, "stream does not start with a stream marker"));
    }

    let value = match reader.next()? {
        (Event::StreamEnd, _) => return Ok(Value::Null),
        (Event::DocumentStart, _) => Builder::default().document(&mut reader)?,
        (_, mark) => return Err(reader.syntax(mark, "expected the start of a document")),
    };

    if options.first_document_only {
        return Ok(value);
    }
    match reader.next()? {
        (Event::StreamEnd, _) => Ok(value),
        (_, mark) => Err(DecodeError::new(
            Format::Yaml,
            DecodeErrorKind::MultipleDocuments,
            "stream contains more than one document",
        )
        .at(Some(reader.position(mark)))),
    }
}

/// Pulls events out of the parser and turns marks into [`Position`]s.
struct EventReader<'a> {
    parser: Parser<std::str::Chars<'a>>,
    text: &'a str,
}

impl<'a> EventReader<'a> {
    fn next(&mut self) -> Result<(Event, Marker), DecodeError> {
        self.parser.next_token().map_err(|e| self.scan_error(&e))
    }

    fn scan_error(&self, e: &ScanError) -> DecodeError {
        DecodeError::syntax(Format::Yaml, e.info()).at(Some(self.position(*e.marker())))
    }

    fn syntax(&self, mark: Marker, message: impl Into<String>) -> DecodeError {
        DecodeError::syntax(Format::Yaml, message).at(Some(self.position(mark)))
    }

    fn error(&self, kind: DecodeErrorKind, mark: Marker, message: impl Into<String>) -> DecodeError {
        DecodeError::new(Format::Yaml, kind, message).at(Some(self.position(mark)))
    }

    /// Marks count lines from 1 and columns from 0 in characters.
    fn position(&self, mark: Marker) -> Position {
        let line_start: usize = self
            .text
            .split_inclusive('\n')
            .take(mark.line().saturating_sub(1))
            .map(str::len)
            .sum();
        let rest = &self.text[line_start.min(self.text.len())..];
        let column = rest
            .char_indices()
            .nth(mark.col())
            .map_or(rest.len(), |(i, _)| i);
        Position::from_offset(self.text.as_bytes(), line_start + column)
    }
}

/// A collection whose end event has not been seen yet.
enum Frame {
    Sequence {
        items: Vec<Value>,
        anchor: usize,
    },
    Mapping {
        entries: Mapping,
        key: Option<String>,
        anchor: usize,
    },
}

/// Assembles one document from parser events with an explicit stack.
#[derive(Default)]
struct Builder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    root: Option<Value>,
}

impl Builder {
    fn document(mut self, reader: &mut EventReader<'_>) -> Result<Value, DecodeError> {
        loop {
            let (event, mark) = reader.next()?;
            let node = match event {
                Event::DocumentEnd => break,
                Event::Scalar(text, style, anchor, tag) => {
                    Some((scalar(text, style, tag.as_ref(), reader, mark)?, anchor))
                }
                Event::SequenceStart(anchor, tag) => {
                    collection_tag(tag.as_ref(), CoreTag::Seq, reader, mark)?;
                    self.stack.push(Frame::Sequence {
                        items: Vec::new(),
                        anchor,
                    });
                    None
                }
                Event::MappingStart(anchor, tag) => {
                    collection_tag(tag.as_ref(), CoreTag::Map, reader, mark)?;
                    self.stack.push(Frame::Mapping {
                        entries: Mapping::new(),
                        key: None,
                        anchor,
                    });
                    None
                }
                Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                    Some(Frame::Sequence { items, anchor }) => {
                        Some((Value::Sequence(items), anchor))
                    }
                    Some(Frame::Mapping {
                        entries, anchor, ..
                    }) => Some((Value::Mapping(entries), anchor)),
                    None => return Err(reader.syntax(mark, "collection end without a start")),
                },
                Event::Alias(id) => {
                    let value = self
                        .anchors
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| reader.syntax(mark, "alias refers to an unknown anchor"))?;
                    Some((value, 0))
                }
                _ => return Err(reader.syntax(mark, "unexpected event inside a document")),
            };

            if let Some((value, anchor)) = node {
                if anchor > 0 {
                    self.anchors.insert(anchor, value.clone());
                }
                self.attach(value, reader, mark)?;
            }
        }
        Ok(self.root.unwrap_or(Value::Null))
    }

    /// Hand a finished node to the enclosing collection, or make it the root.
    fn attach(
        &mut self,
        value: Value,
        reader: &EventReader<'_>,
        mark: Marker,
    ) -> Result<(), DecodeError> {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping { entries, key, .. }) => match key.take() {
                Some(key) => {
                    entries.insert(key, value);
                }
                None => *key = Some(mapping_key(value, reader, mark)?),
            },
        }
        Ok(())
    }
}

/// Scalar keys become their canonical text (`1`, `true`, `null`), so
/// `1: a` and `"1": b` collide and the later one wins.
fn mapping_key(key: Value, reader: &EventReader<'_>, mark: Marker) -> Result<String, DecodeError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Sequence(_) | Value::Mapping(_) => Err(reader.error(
            DecodeErrorKind::UnsupportedValue,
            mark,
            "mapping keys must be scalars",
        )),
    }
}

/// The tags a document may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreTag {
    Str,
    Int,
    Float,
    Bool,
    Null,
    Map,
    Seq,
}

impl CoreTag {
    fn name(self) -> &'static str {
        match self {
            CoreTag::Str => "!!str",
            CoreTag::Int => "!!int",
            CoreTag::Float => "!!float",
            CoreTag::Bool => "!!bool",
            CoreTag::Null => "!!null",
            CoreTag::Map => "!!map",
            CoreTag::Seq => "!!seq",
        }
    }
}

/// Classify `tag`, rejecting anything outside the core schema.
fn core_tag(tag: &Tag, reader: &EventReader<'_>, mark: Marker) -> Result<CoreTag, DecodeError> {
    let full = format!("{}{}", tag.handle, tag.suffix);
    if full == "!" {
        return Ok(CoreTag::Str);
    }
    let core = match full.strip_prefix(CORE_TAG_PREFIX) {
        Some("str") => Some(CoreTag::Str),
        Some("int") => Some(CoreTag::Int),
        Some("float") => Some(CoreTag::Float),
        Some("bool") => Some(CoreTag::Bool),
        Some("null") => Some(CoreTag::Null),
        Some("map") => Some(CoreTag::Map),
        Some("seq") => Some(CoreTag::Seq),
        _ => None,
    };
    core.ok_or_else(|| {
        let shown = match full.strip_prefix(CORE_TAG_PREFIX) {
            Some(suffix) => format!("!!{suffix}"),
            None => full.clone(),
        };
        reader.error(
            DecodeErrorKind::UnsupportedTag,
            mark,
            format!("tag {shown} is not supported"),
        )
    })
}

fn collection_tag(
    tag: Option<&Tag>,
    expected: CoreTag,
    reader: &EventReader<'_>,
    mark: Marker,
) -> Result<(), DecodeError> {
    let Some(tag) = tag else {
        return Ok(());
    };
    match core_tag(tag, reader, mark)? {
        found if found == expected => Ok(()),
        found => Err(reader.syntax(
            mark,
            format!("{} tag on a {} node", found.name(), expected.name()),
        )),
    }
}

fn scalar(
    text: String,
    style: TScalarStyle,
    tag: Option<&Tag>,
    reader: &EventReader<'_>,
    mark: Marker,
) -> Result<Value, DecodeError> {
    let tag = match tag {
        Some(tag) => core_tag(tag, reader, mark)?,
        None if style == TScalarStyle::Plain => return Ok(resolve_plain(text)),
        None => return Ok(Value::String(text)),
    };

    if tag == CoreTag::Str {
        return Ok(Value::String(text));
    }
    let invalid = || reader.syntax(mark, format!("'{text}' is not a valid {} value", tag.name()));
    match tag {
        CoreTag::Str => Ok(Value::String(text.clone())),
        CoreTag::Map | CoreTag::Seq => {
            Err(reader.syntax(mark, format!("{} tag on a scalar", tag.name())))
        }
        CoreTag::Null => match resolve_plain_str(&text) {
            Some(Value::Null) => Ok(Value::Null),
            _ => Err(invalid()),
        },
        CoreTag::Bool => match resolve_plain_str(&text) {
            Some(value @ Value::Bool(_)) => Ok(value),
            _ => Err(invalid()),
        },
        CoreTag::Int => match resolve_plain_str(&text) {
            Some(value @ Value::Number(Number::Int(_) | Number::UInt(_))) => Ok(value),
            _ => Err(invalid()),
        },
        CoreTag::Float => match resolve_plain_str(&text) {
            Some(Value::Number(n)) => Ok(Value::Number(Number::Float(n.as_f64()))),
            _ => Err(invalid()),
        },
    }
}

fn resolve_plain(text: String) -> Value {
    resolve_plain_str(&text).unwrap_or(Value::String(text))
}

/// Core-schema resolution of a plain scalar; `None` means it is a string.
fn resolve_plain_str(text: &str) -> Option<Value> {
    if text.is_empty() || matches!(text, "~" | "null" | "Null" | "NULL") {
        return Some(Value::Null);
    }
    match text {
        "true" | "True" | "TRUE" => return Some(Value::Bool(true)),
        "false" | "False" | "FALSE" => return Some(Value::Bool(false)),
        _ => {}
    }
    // Leading zeros make a string, not an octal or decimal.
    if digits_with_leading_zero(text) {
        return None;
    }
    parse_int(text)
        .or_else(|| parse_float(text).map(Number::Float))
        .map(Value::Number)
}

fn digits_with_leading_zero(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Decimal, `0x`, `0o` and `0b` integers with an optional sign. Values past
/// `i64::MAX` become `UInt`; values past `u64::MAX` are left to the float
/// parser.
fn parse_int(text: &str) -> Option<Number> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(rest) = unsigned.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = unsigned.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = unsigned.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, unsigned)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        match i64::try_from(magnitude) {
            Ok(m) => Some(Number::Int(-m)),
            Err(_) if magnitude == i64::MIN.unsigned_abs() => Some(Number::Int(i64::MIN)),
            Err(_) => None,
        }
    } else {
        Some(i64::try_from(magnitude).map_or(Number::UInt(magnitude), Number::Int))
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let (sign, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    match unsigned {
        ".inf" | ".Inf" | ".INF" => return Some(sign * f64::INFINITY),
        ".nan" | ".NaN" | ".NAN" if unsigned.len() == text.len() => return Some(f64::NAN),
        _ => {}
    }
    if unsigned.starts_with(['+', '-']) {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a value as YAML, block style unless
/// [`EncodeOptions::yaml_flow_style`] is set.
///
/// Block style indents nested mappings by two spaces and writes a sequence
/// under a mapping key at the key's own indentation. Empty collections are
/// written inline as `{}` and `[]`.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut out = String::new();
    if options.yaml_flow_style {
        encode_flow(value, &mut out);
        out.push('\n');
    } else {
        match value {
            Value::Mapping(mapping) if !mapping.is_empty() => {
                write_block_mapping(mapping, 0, false, &mut out)
            }
            Value::Sequence(items) if !items.is_empty() => {
                write_block_sequence(items, 0, false, &mut out)
            }
            _ => {
                write_inline(value, &mut out);
                out.push('\n');
            }
        }
    }
    Ok(out.into_bytes())
}

fn pad(indent: usize, out: &mut String) {
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Write `mapping` one entry per line. With `inline_first` the first entry
/// continues the current line (after `- `).
fn write_block_mapping(mapping: &Mapping, indent: usize, inline_first: bool, out: &mut String) {
    for (i, (key, item)) in mapping.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(indent, out);
        }
        if key.chars().count() > MAX_IMPLICIT_KEY_CHARS {
            out.push_str("? ");
            write_block_string(key, out);
            out.push('\n');
            pad(indent, out);
        } else {
            write_block_string(key, out);
        }
        out.push(':');
        match item {
            Value::Mapping(nested) if !nested.is_empty() => {
                out.push('\n');
                write_block_mapping(nested, indent + 2, false, out);
            }
            Value::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                write_block_sequence(items, indent, false, out);
            }
            _ => {
                out.push(' ');
                write_inline(item, out);
                out.push('\n');
            }
        }
    }
}

fn write_block_sequence(items: &[Value], indent: usize, inline_first: bool, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(indent, out);
        }
        out.push_str("- ");
        match item {
            Value::Mapping(nested) if !nested.is_empty() => {
                write_block_mapping(nested, indent + 2, true, out)
            }
            Value::Sequence(nested) if !nested.is_empty() => {
                write_block_sequence(nested, indent + 2, true, out)
            }
            _ => {
                write_inline(item, out);
                out.push('\n');
            }
        }
    }
}

/// A scalar or an empty collection on the current line.
fn write_inline(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)),
        Value::String(s) => write_block_string(s, out),
        Value::Sequence(_) => out.push_str("[]"),
        Value::Mapping(_) => out.push_str("{}"),
    }
}

/// Plain when unambiguous, single-quoted when printable, double-quoted with
/// escapes otherwise.
fn write_block_string(s: &str, out: &mut String) {
    if is_block_plain_safe(s) {
        out.push_str(s);
    } else if s.chars().any(needs_escape) {
        write_double_quoted(s, out);
    } else {
        out.push('\'');
        out.push_str(&s.replace('\'', "''"));
        out.push('\'');
    }
}

/// Characters that may start a plain scalar only at the risk of being read
/// as an indicator.
const INDICATORS: &str = "-?:,[]{}#&*!|>'\"%@`<=";

fn is_block_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if first.is_whitespace() || INDICATORS.contains(first) || s.starts_with("...") {
        return false;
    }
    if s.ends_with(char::is_whitespace) || s.ends_with(':') {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.chars().any(needs_escape) {
        return false;
    }
    reads_back_as_string(s)
}

/// Write `value` in flow style: `{name: Alice, tags: [a, b], n: 3.0}`.
fn encode_flow(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)),
        Value::String(s) => encode_flow_string(s, out),
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                encode_flow(item, out);
            }
            out.push(']');
        }
        Value::Mapping(mapping) => {
            out.push('{');
            for (i, (key, item)) in mapping.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                encode_flow_string(key, out);
                out.push_str(": ");
                encode_flow(item, out);
            }
            out.push('}');
        }
    }
}

/// YAML spelling of a number. Floats keep a fractional part or exponent so
/// they resolve back to floats.
fn format_number(n: &Number) -> Cow<'static, str> {
    match *n {
        Number::Float(f) if f.is_nan() => Cow::Borrowed(".nan"),
        Number::Float(f) if f.is_infinite() && f > 0.0 => Cow::Borrowed(".inf"),
        Number::Float(f) if f.is_infinite() => Cow::Borrowed("-.inf"),
        _ => Cow::Owned(n.to_string()),
    }
}

/// Emit a string plain when that is unambiguous, double-quoted otherwise.
fn encode_flow_string(s: &str, out: &mut String) {
    if is_flow_plain_safe(s) {
        out.push_str(s);
    } else {
        write_double_quoted(s, out);
    }
}

fn write_double_quoted(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Words a YAML 1.1 or 1.2 reader could resolve to bool or null.
const RESERVED_WORDS: &[&str] = &[
    "true", "false", "null", "yes", "no", "on", "off", "y", "n", "~",
];

/// A string may stay unquoted in flow context when it starts with a letter
/// or underscore, uses only letters, digits, spaces and `_-./`, does not end
/// in a space and reads back as the same string.
fn is_flow_plain_safe(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    if !chars.all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.' | '/')) {
        return false;
    }
    !s.ends_with(' ') && reads_back_as_string(s)
}

/// Whether a plain `s` resolves to a string under the core schema and does
/// not look like a YAML 1.1 bool, null, number, sexagesimal or timestamp.
fn reads_back_as_string(s: &str) -> bool {
    resolve_plain_str(s).is_none() && !is_yaml11_lookalike(s)
}

fn is_yaml11_lookalike(s: &str) -> bool {
    if RESERVED_WORDS.contains(&s.to_ascii_lowercase().as_str()) || s == "=" || s == "<<" {
        return true;
    }
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && body
            .chars()
            .all(|c| c.is_ascii_hexdigit() || "xXoO_.:+-tTzZ ".contains(c))
}
