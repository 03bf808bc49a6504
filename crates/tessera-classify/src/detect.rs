//! Diagram kind detection.

use log::trace;

use tessera_core::kind::DiagramKind;

/// First-line keywords, checked in priority order. The first substring hit wins.
///
/// `"er"` is deliberately broad: any first line containing those two letters
/// (`"user"`, `"server"`) classifies as an entity-relationship diagram unless
/// an earlier keyword matched.
const FIRST_LINE_RULES: [(&str, DiagramKind); 8] = [
    ("graph", DiagramKind::Flowchart),
    ("sequence", DiagramKind::Sequence),
    ("class", DiagramKind::Class),
    ("state", DiagramKind::State),
    ("pie", DiagramKind::Pie),
    ("gantt", DiagramKind::Gantt),
    ("er", DiagramKind::EntityRelationship),
    ("journey", DiagramKind::UserJourney),
];

const FLOWCHART_MARKERS: [&str; 3] = ["-->", "---", "==>"];
const SEQUENCE_MARKERS: [&str; 3] = ["participant", "->>", "-->>"];

/// Classifies `text` into a [`DiagramKind`].
///
/// The first line of the trimmed text decides when it contains one of the
/// keywords; otherwise the whole text is sniffed for flowchart links and then
/// for sequence participants/messages.
///
/// # Examples
///
/// ```
/// use tessera_classify::{detect, DiagramKind};
///
/// assert_eq!(detect("graph TD\nA-->B"), DiagramKind::Flowchart);
/// assert_eq!(detect("pie title Pets"), DiagramKind::Pie);
/// assert_eq!(detect("A --> B"), DiagramKind::Flowchart);
/// assert_eq!(detect("   "), DiagramKind::Unknown);
/// ```
pub fn detect(text: &str) -> DiagramKind {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DiagramKind::Unknown;
    }

    let first_line = trimmed
        .split('\n')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if let Some((keyword, kind)) = FIRST_LINE_RULES
        .iter()
        .find(|(keyword, _)| first_line.contains(keyword))
    {
        trace!(keyword = *keyword, kind:% = kind; "Kind decided by first line");
        return *kind;
    }

    if FLOWCHART_MARKERS.iter().any(|marker| text.contains(marker)) {
        return DiagramKind::Flowchart;
    }

    if SEQUENCE_MARKERS.iter().any(|marker| text.contains(marker)) {
        return DiagramKind::Sequence;
    }

    DiagramKind::Unknown
}
