//! Export formats.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A downloadable image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    #[default]
    Png,
}

impl ExportFormat {
    /// Returns the file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Error returned for any format other than `svg` or `png`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("export format `{0}` is not supported")]
pub struct UnsupportedFormatError(pub String);

impl FromStr for ExportFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(UnsupportedFormatError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("svg".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
    }

    #[test]
    fn test_pdf_is_unsupported() {
        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err, UnsupportedFormatError("pdf".to_string()));
        assert_eq!(err.to_string(), "export format `pdf` is not supported");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
    }
}
