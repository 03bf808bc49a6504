//! Diagram kinds.
//!
//! [`DiagramKind`] is the closed set of grammars Tessera knows how to talk
//! about. It is always derived from text and never stored authoritatively.
//! [`RequestedKind`] is what the user picked in the kind selector: either
//! `auto` (let detection decide) or one explicit kind.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A diagram grammar.
///
/// The serialized form is the lower-camel wire name (`flowchart`,
/// `entityRelationship`, ...), which is also what [`fmt::Display`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    Pie,
    Gantt,
    EntityRelationship,
    UserJourney,
    Unknown,
}

impl DiagramKind {
    /// Every kind, in selector order.
    pub const ALL: [DiagramKind; 9] = [
        Self::Flowchart,
        Self::Sequence,
        Self::Class,
        Self::State,
        Self::Pie,
        Self::Gantt,
        Self::EntityRelationship,
        Self::UserJourney,
        Self::Unknown,
    ];

    /// Returns the wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequence",
            Self::Class => "class",
            Self::State => "state",
            Self::Pie => "pie",
            Self::Gantt => "gantt",
            Self::EntityRelationship => "entityRelationship",
            Self::UserJourney => "userJourney",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the label shown in the "detected kind" readout.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Flowchart => "Flowchart",
            Self::Sequence => "Sequence Diagram",
            Self::Class => "Class Diagram",
            Self::State => "State Diagram",
            Self::Pie => "Pie Chart",
            Self::Gantt => "Gantt Chart",
            Self::EntityRelationship => "Entity Relationship",
            Self::UserJourney => "User Journey",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns `true` for every kind except [`DiagramKind::Unknown`].
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known diagram kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown diagram kind `{0}`")]
pub struct ParseKindError(pub String);

impl FromStr for DiagramKind {
    type Err = ParseKindError;

    /// Parses a wire name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// The kind the user asked for in the kind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestedKind {
    /// Detect the kind from the text.
    #[default]
    Auto,
    /// Use this kind regardless of what detection would say.
    Explicit(DiagramKind),
}

impl RequestedKind {
    /// Resolves the requested kind, calling `detect` only for [`RequestedKind::Auto`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_core::kind::{DiagramKind, RequestedKind};
    ///
    /// let auto = RequestedKind::Auto;
    /// assert_eq!(auto.resolve_with(|| DiagramKind::Pie), DiagramKind::Pie);
    ///
    /// let explicit = RequestedKind::Explicit(DiagramKind::Gantt);
    /// assert_eq!(explicit.resolve_with(|| DiagramKind::Pie), DiagramKind::Gantt);
    /// ```
    pub fn resolve_with(self, detect: impl FnOnce() -> DiagramKind) -> DiagramKind {
        match self {
            Self::Auto => detect(),
            Self::Explicit(kind) => kind,
        }
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for RequestedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Explicit(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

impl FromStr for RequestedKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse().map(Self::Explicit)
    }
}

impl From<DiagramKind> for RequestedKind {
    fn from(kind: DiagramKind) -> Self {
        Self::Explicit(kind)
    }
}
