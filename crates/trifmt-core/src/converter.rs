//! Format dispatch: bytes in one format → [`Value`] → bytes in another.

use crate::error::{DecodeError, EncodeError, Result};
use crate::format::Format;
use crate::options::{ConvertOptions, DecodeOptions, EncodeOptions};
use crate::value::Value;
use crate::{json, xml, yaml};

/// Convert `input` from the `from` format tag to the `to` format tag.
///
/// Both tags are validated before anything is decoded, so an unknown target
/// is reported even for malformed input. Output is returned only once the
/// whole document has been converted.
///
/// ```
/// use trifmt_core::{convert, ConvertOptions};
///
/// let yaml = convert(br#"{"name":"Alice","tags":["a","b"]}"#, "json", "yaml",
///     &ConvertOptions::default()).unwrap();
/// assert_eq!(String::from_utf8(yaml).unwrap(), "name: Alice\ntags:\n- a\n- b\n");
/// ```
pub fn convert(input: &[u8], from: &str, to: &str, options: &ConvertOptions) -> Result<Vec<u8>> {
    let from: Format = from.parse()?;
    let to: Format = to.parse()?;
    convert_formats(input, from, to, options)
}

/// [`convert`] with already-parsed format tags.
pub fn convert_formats(
    input: &[u8],
    from: Format,
    to: Format,
    options: &ConvertOptions,
) -> Result<Vec<u8>> {
    tracing::debug!(%from, %to, input_bytes = input.len(), "converting");
    let value = decode(input, from, &options.decode)?;
    let output = encode(&value, to, &options.encode)?;
    tracing::debug!(output_bytes = output.len(), "converted");
    Ok(output)
}

/// Decode `input` as `format`.
pub fn decode(input: &[u8], format: Format, options: &DecodeOptions) -> Result<Value, DecodeError> {
    tracing::trace!(%format, "decoding");
    match format {
        Format::Xml => xml::decode(input, options),
        Format::Json => json::decode(input, options),
        Format::Yaml => yaml::decode(input, options),
    }
}

/// Encode `value` as `format`.
pub fn encode(value: &Value, format: Format, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    tracing::trace!(%format, root = value.type_name(), "encoding");
    match format {
        Format::Xml => xml::encode(value, options),
        Format::Json => json::encode(value, options),
        Format::Yaml => yaml::encode(value, options),
    }
}

/// [`convert`] for callers holding text rather than bytes.
pub fn convert_str(input: &str, from: &str, to: &str, options: &ConvertOptions) -> Result<String> {
    let output = convert(input.as_bytes(), from, to, options)?;
    // Every encoder writes UTF-8, so this never replaces anything.
    Ok(String::from_utf8_lossy(&output).into_owned())
}
