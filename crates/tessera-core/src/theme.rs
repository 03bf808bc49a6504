//! Light/dark theme preference.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

/// The persisted two-valued theme setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// Returns the persisted value (`"light"` or `"dark"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Interprets a stored value. Only `"dark"` selects the dark theme; any
    /// other value, including a missing one, falls back to light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Returns the Mermaid theme name this preference selects.
    pub fn renderer_theme(self) -> &'static str {
        match self {
            Self::Light => "default",
            Self::Dark => "dark",
        }
    }

    /// Returns the page background used behind rasterized diagrams.
    pub fn background(self) -> Color {
        let css = match self {
            Self::Light => "#ffffff",
            Self::Dark => "#1e1e2e",
        };
        Color::new(css).expect("theme backgrounds are valid CSS colors")
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names neither theme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme `{0}`, expected `light` or `dark`")]
pub struct ParseThemeError(pub String);

impl FromStr for ThemePreference {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}
