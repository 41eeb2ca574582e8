//! Option records accepted by decoders, encoders and the converter.
//!
//! All records deserialize with defaults for missing fields, so bindings can
//! pass a partial JSON object such as `{"encode": {"indent": 2}}`.

use serde::{Deserialize, Serialize};

/// Indentation used when nothing else is configured.
pub const DEFAULT_INDENT: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Decode only the first document of a multi-document YAML stream
    /// instead of rejecting the stream.
    pub first_document_only: bool,
}

impl DecodeOptions {
    pub fn with_first_document_only(mut self, first_only: bool) -> Self {
        self.first_document_only = first_only;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Spaces per nesting level for JSON and XML output. `0` produces
    /// compact output.
    pub indent: usize,
    /// Emit YAML in single-line flow style instead of block style.
    pub yaml_flow_style: bool,
    /// Start XML output with an `<?xml ...?>` declaration.
    pub xml_declaration: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: DEFAULT_INDENT,
            yaml_flow_style: false,
            xml_declaration: true,
        }
    }
}

impl EncodeOptions {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_yaml_flow_style(mut self, flow: bool) -> Self {
        self.yaml_flow_style = flow;
        self
    }

    pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = declaration;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub decode: DecodeOptions,
    pub encode: EncodeOptions,
}

impl ConvertOptions {
    pub fn with_decode(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_encode(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }
}
