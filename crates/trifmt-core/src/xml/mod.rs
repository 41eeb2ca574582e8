//! XML decoding and encoding.
//!
//! XML has two axes a JSON-like tree does not: attributes and mixed text.
//! Both are folded into a single [`Mapping`](crate::Mapping) namespace:
//!
//! - attributes become keys prefixed with `@` (`<a id="1"/>` → `{"a": {"@id": "1"}}`);
//! - text of an element that also has attributes or children goes under
//!   `#text` (`<a id="1">hi</a>` → `{"a": {"@id": "1", "#text": "hi"}}`);
//! - an element with only text is the bare string (`<a>hi</a>` → `{"a": "hi"}`);
//! - repeated sibling elements become a sequence under one key, a single
//!   occurrence stays a bare value.
//!
//! The last rule means `<r><i>1</i></r>` and `<r><i>1</i><i>2</i></r>` give
//! `i` different shapes. Callers that need a uniform shape have to normalize
//! it themselves.
//!
//! Namespace prefixes are not resolved; `ns:tag` is an opaque name.

mod decoder;
mod encoder;

pub use decoder::decode;
pub use encoder::encode;

/// Whether `name` matches the XML 1.0 `Name` production (approximated with
/// Unicode letter and digit classes).
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => {}
        _ => return false,
    }
    chars.all(|c| is_name_start(c) || c.is_alphanumeric() || matches!(c, '-' | '.' | '\u{B7}'))
}

fn is_name_start(c: char) -> bool {
    c == ':' || c == '_' || c.is_alphabetic()
}
