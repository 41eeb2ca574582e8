//! Error types for decoding, encoding and conversion.
//!
//! Decoders fail with [`DecodeError`], encoders with [`EncodeError`]; the
//! converter wraps both (unchanged) in [`ConversionError`] together with its
//! own format-tag rejection.

use std::fmt;

use thiserror::Error;

use crate::format::Format;

/// Location of a decode failure inside the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in bytes.
    pub column: usize,
}

impl Position {
    /// Derive line and column from a byte offset. Offsets past the end of
    /// `input` are clamped to its length.
    pub fn from_offset(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = &input[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Position {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }

    /// Derive a byte offset from a 1-based line and column. Returns `None`
    /// when the parser reported no location (line 0).
    pub fn from_line_column(input: &[u8], line: usize, column: usize) -> Option<Self> {
        if line == 0 {
            return None;
        }
        let mut line_start = 0;
        for _ in 1..line {
            match input[line_start..].iter().position(|&b| b == b'\n') {
                Some(i) => line_start += i + 1,
                None => break,
            }
        }
        let offset = (line_start + column.saturating_sub(1)).min(input.len());
        Some(Position {
            offset,
            line,
            column: column.max(1),
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (byte {})",
            self.line, self.column, self.offset
        )
    }
}

/// What went wrong while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// The input is not well-formed for the claimed format.
    Syntax,
    /// A YAML tag outside the core schema.
    UnsupportedTag,
    /// Well-formed input the Value model cannot hold (e.g. a YAML mapping
    /// used as a mapping key).
    UnsupportedValue,
    /// A YAML stream with more than one document.
    MultipleDocuments,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecodeErrorKind::Syntax => "syntax error",
            DecodeErrorKind::UnsupportedTag => "unsupported tag",
            DecodeErrorKind::UnsupportedValue => "unsupported value",
            DecodeErrorKind::MultipleDocuments => "multiple documents",
        })
    }
}

/// A decoder rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{format} {kind}{}: {message}", located(.position))]
pub struct DecodeError {
    pub format: Format,
    pub kind: DecodeErrorKind,
    pub message: String,
    pub position: Option<Position>,
}

fn located(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(" at {position}"),
        None => String::new(),
    }
}

impl DecodeError {
    pub fn new(format: Format, kind: DecodeErrorKind, message: impl Into<String>) -> Self {
        DecodeError {
            format,
            kind,
            message: message.into(),
            position: None,
        }
    }

    /// Shorthand for a [`DecodeErrorKind::Syntax`] error.
    pub fn syntax(format: Format, message: impl Into<String>) -> Self {
        Self::new(format, DecodeErrorKind::Syntax, message)
    }

    pub fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }
}

/// View `input` as UTF-8, reporting the first invalid byte as a syntax error.
pub(crate) fn utf8(input: &[u8], format: Format) -> Result<&str, DecodeError> {
    std::str::from_utf8(input).map_err(|e| {
        DecodeError::syntax(format, format!("invalid UTF-8: {e}"))
            .at(Some(Position::from_offset(input, e.valid_up_to())))
    })
}

/// serde_json appends "at line L column C" to its messages;
/// trifmt carries the position separately.
pub(crate) fn strip_location(message: &str) -> &str {
    match message.rfind(" at line ") {
        Some(i) => &message[..i],
        None => message,
    }
}

/// What went wrong while encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeErrorKind {
    /// A value the target format has no representation for.
    UnsupportedValue,
    /// The root value does not satisfy the target's root constraint.
    InvalidRoot,
    /// A mapping key that cannot become a name in the target format.
    InvalidKey,
    /// The backend emitter itself failed.
    Serialization,
}

impl fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncodeErrorKind::UnsupportedValue => "unsupported value",
            EncodeErrorKind::InvalidRoot => "invalid root",
            EncodeErrorKind::InvalidKey => "invalid key",
            EncodeErrorKind::Serialization => "serialization failure",
        })
    }
}

/// An encoder could not represent its input tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{format} {kind}: {message}")]
pub struct EncodeError {
    pub format: Format,
    pub kind: EncodeErrorKind,
    pub message: String,
}

impl EncodeError {
    pub fn new(format: Format, kind: EncodeErrorKind, message: impl Into<String>) -> Self {
        EncodeError {
            format,
            kind,
            message: message.into(),
        }
    }
}

/// Flattened classification of a [`ConversionError`], e.g. for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    Decode(DecodeErrorKind),
    Encode(EncodeErrorKind),
}

/// Errors returned by [`convert`](crate::convert) and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The caller named a format tag that is not `xml`, `json`, `yaml` or `yml`.
    #[error("unsupported format '{format}' (expected one of: xml, json, yaml, yml)")]
    UnsupportedFormat { format: String },

    #[error("cannot decode input: {0}")]
    Decode(#[from] DecodeError),

    #[error("cannot encode output: {0}")]
    Encode(#[from] EncodeError),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConversionError::Decode(e) => ErrorKind::Decode(e.kind),
            ConversionError::Encode(e) => ErrorKind::Encode(e.kind),
        }
    }

    /// Byte offset into the input, when the failure could be located.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ConversionError::Decode(e) => e.position.map(|p| p.offset),
            _ => None,
        }
    }
}

/// Convenience alias used throughout trifmt-core. Defaults to
/// [`ConversionError`]; decoders and encoders name their own error type.
pub type Result<T, E = ConversionError> = std::result::Result<T, E>;
