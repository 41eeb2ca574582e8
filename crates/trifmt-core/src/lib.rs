//! # trifmt-core
//!
//! Conversion between **XML**, **JSON** and **YAML** through one shared,
//! format-neutral value tree.
//!
//! Every conversion is `decode` (bytes → [`Value`]) followed by `encode`
//! ([`Value`] → bytes). The tree is a closed tagged union, so each encoder is
//! a total function over it, and the mapping rules between each format and
//! the tree are explicit:
//!
//! - JSON and YAML map one-to-one (objects/mappings, arrays/sequences,
//!   scalars); integers and floats stay distinct (`3.0` never becomes `3`).
//! - XML attributes become `@name` keys, mixed text becomes `#text`, and
//!   repeated sibling elements become sequences (see [`xml`]).
//!
//! ## Quick start
//!
//! ```rust
//! use trifmt_core::{convert, ConvertOptions};
//!
//! let xml = br#"<user id="7"><name>Alice</name><role>admin</role><role>dev</role></user>"#;
//! let json = convert(xml, "xml", "json", &ConvertOptions::default()).unwrap();
//! let json: serde_json::Value = serde_json::from_slice(&json).unwrap();
//! assert_eq!(json["user"]["@id"], "7");
//! assert_eq!(json["user"]["role"][1], "dev");
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the [`Value`] tree shared by all formats
//! - [`json`], [`yaml`], [`xml`]: one decoder and one encoder per format
//! - [`converter`]: tag parsing and dispatch (`convert`, `decode`, `encode`)
//! - [`options`]: decode/encode/convert option records
//! - [`error`]: [`DecodeError`], [`EncodeError`], [`ConversionError`]
//!
//! Everything here is pure: no I/O, no global state, no logging of returned
//! errors. Independent conversions can run on any number of threads.

pub mod converter;
pub mod error;
pub mod format;
pub mod json;
pub mod options;
pub mod value;
pub mod xml;
pub mod yaml;

pub use converter::{convert, convert_formats, convert_str, decode, encode};
pub use error::{
    ConversionError, DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, ErrorKind,
    Position,
};
pub use format::Format;
pub use options::{ConvertOptions, DecodeOptions, EncodeOptions, DEFAULT_INDENT};
pub use value::{Mapping, Number, Value, ATTRIBUTE_PREFIX, TEXT_KEY};
