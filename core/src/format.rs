//! Wire format selection.

use std::fmt;
use std::str::FromStr;

/// The wire format a manager talks to the server in.
///
/// Redmine picks the format from the URL extension (`/projects.xml`,
/// `/projects.json`), so the format also decides the path suffix and the
/// `Content-Type` of request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MimeFormat {
    #[default]
    Xml,
    Json,
}

impl MimeFormat {
    /// URL extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            MimeFormat::Xml => "xml",
            MimeFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MimeFormat::Xml => "application/xml",
            MimeFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for MimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format `{0}`, expected `xml` or `json`")]
pub struct ParseFormatError(String);

impl FromStr for MimeFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(MimeFormat::Xml),
            "json" => Ok(MimeFormat::Json),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}
