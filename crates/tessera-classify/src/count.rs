//! Element counting.
//!
//! The count is an estimate keyed to the detected kind. It is meant for the
//! "elements" readout, not for anything that needs an exact model of the
//! diagram.

use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use tessera_core::kind::DiagramKind;

use crate::detect::detect;

/// Bracketed, braced and parenthesized node labels. Lazy, single-line.
static NODE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]|\{.*?\}|\(.*?\)").expect("valid node label regex"));

static PARTICIPANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)participant\s+\w+").expect("valid participant regex"));

/// Message arrows, longest alternative first so `-->>` is one match.
static MESSAGE_ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-->>|->>|-->|->x|--x|->|-").expect("valid message arrow regex")
});

static CLASS_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)class\s+\w+").expect("valid class regex"));

static CLASS_RELATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|--|--|\.\.").expect("valid class relation regex"));

/// Two-byte flowchart edge markers.
const EDGE_MARKERS: [&[u8; 2]; 3] = [b"--", b"==", b"->"];

/// Estimates the number of structural elements in `text`.
///
/// The kind is always re-detected from `text`. Per kind:
///
/// - flowchart: node labels plus half the edge markers (a `-->` link carries
///   two markers, `--` and `->`)
/// - sequence: `participant X` declarations plus message arrows
/// - class: `class X` declarations plus relationship markers
/// - anything else: non-blank lines that are not `%` comments
///
/// # Examples
///
/// ```
/// use tessera_classify::count;
///
/// assert_eq!(count("graph TD\nA[Start]-->B[End]"), 3);
/// assert_eq!(count("pie title X\n\"A\":10\n\"B\":20"), 3);
/// assert_eq!(count(""), 0);
/// ```
pub fn count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let kind = detect(text);
    let count = match kind {
        DiagramKind::Flowchart => {
            NODE_LABEL.find_iter(text).count() + edge_marker_count(text) / 2
        }
        DiagramKind::Sequence => {
            PARTICIPANT.find_iter(text).count() + MESSAGE_ARROW.find_iter(text).count()
        }
        DiagramKind::Class => {
            CLASS_DECLARATION.find_iter(text).count() + CLASS_RELATION.find_iter(text).count()
        }
        DiagramKind::State
        | DiagramKind::Pie
        | DiagramKind::Gantt
        | DiagramKind::EntityRelationship
        | DiagramKind::UserJourney
        | DiagramKind::Unknown => content_line_count(text),
    };

    trace!(kind:% = kind, element_count = count; "Counted diagram elements");
    count
}

/// Counts the byte positions at which an edge marker starts.
///
/// Each position contributes at most one marker, but markers at neighbouring
/// positions may share a byte, so `-->` yields `--` and `->`. A leftmost
/// non-overlapping scan would see only `--` there and count a two-node link
/// as 2 elements instead of 3.
fn edge_marker_count(text: &str) -> usize {
    text.as_bytes()
        .windows(2)
        .filter(|pair| EDGE_MARKERS.iter().any(|marker| *pair == marker.as_slice()))
        .count()
}

fn content_line_count(text: &str) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('%'))
        .count()
}
