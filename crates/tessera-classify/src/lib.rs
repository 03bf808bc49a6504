//! Text classification for Mermaid diagram sources.
//!
//! Two shallow, single-pass heuristics live here:
//!
//! - [`detect`] infers which diagram grammar a block of text is written in.
//! - [`count`] estimates how many structural elements the text describes.
//!
//! Both are total functions over every string, including the empty one. Every
//! pattern is either a plain substring scan or a [`regex`] (which guarantees
//! linear-time matching), so arbitrarily large inputs are safe.
//!
//! The crate also carries [`format_text`], the editor's indentation
//! normalizer.
//!
//! # Example
//!
//! ```
//! use tessera_classify::{classify, DiagramKind};
//!
//! let text = "sequenceDiagram\nparticipant A\nparticipant B\nA->>B: hi";
//! let classification = classify(text);
//! assert_eq!(classification.kind, DiagramKind::Sequence);
//! assert_eq!(classification.element_count, 3);
//! ```

mod count;
mod detect;
mod format;

pub use count::count;
pub use detect::detect;
pub use format::format_text;

pub use tessera_core::kind::{DiagramKind, RequestedKind};

/// Kind and element count computed together from one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: DiagramKind,
    pub element_count: usize,
}

/// Detects the kind of `text` and counts its elements.
pub fn classify(text: &str) -> Classification {
    Classification {
        kind: detect(text),
        element_count: count(text),
    }
}

/// Resolves the kind the user asked for, running detection only for `auto`.
pub fn resolve(requested: RequestedKind, text: &str) -> DiagramKind {
    requested.resolve_with(|| detect(text))
}
