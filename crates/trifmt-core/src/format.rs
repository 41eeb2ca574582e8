//! Format tags recognized by the converter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// One of the three textual serialization formats trifmt understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Xml,
    Json,
    Yaml,
}

impl Format {
    /// Every supported format, in the order they are listed to users.
    pub const ALL: [Format; 3] = [Format::Xml, Format::Json, Format::Yaml];

    /// Canonical lowercase tag (`"xml"`, `"json"`, `"yaml"`).
    pub fn name(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    /// File extensions conventionally used for this format, without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Xml => &["xml"],
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ConversionError;

    /// Parse a format tag. Matching ignores ASCII case and surrounding
    /// whitespace; `yml` is accepted as an alias of `yaml`.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(ConversionError::UnsupportedFormat {
                format: tag.to_string(),
            }),
        }
    }
}
