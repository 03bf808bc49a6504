//! Indentation normalizer for the editor's "format" action.

/// Indentation emitted per nesting level.
const INDENT: &str = "  ";

/// Re-indents `text` line by line.
///
/// Every line is trimmed and re-emitted at the current nesting level. Blank
/// lines stay blank. A line starting with `end` or containing a `-->` link
/// closes one level before it is emitted; a line containing `{`, ending in
/// `-->`, or opening a `participant`/`class` declaration opens one level
/// after it. The level never drops below zero.
///
/// Returns `None` when `text` is blank, since there is nothing to format.
///
/// # Examples
///
/// ```
/// use tessera_classify::format_text;
///
/// let formatted = format_text("classDiagram\nclass A {\n+id\n}").unwrap();
/// assert_eq!(formatted, "classDiagram\n  class A {\n    +id\n    }");
/// assert_eq!(format_text("  \n"), None);
/// ```
pub fn format_text(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let mut level = 0usize;
    let formatted: Vec<String> = text
        .split('\n')
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return String::new();
            }

            if closes_level(line) {
                level = level.saturating_sub(1);
            }
            let emitted = format!("{}{line}", INDENT.repeat(level));
            if opens_level(line) {
                level += 1;
            }
            emitted
        })
        .collect();

    Some(formatted.join("\n"))
}

fn closes_level(line: &str) -> bool {
    line.starts_with("end") || line.contains("-->")
}

fn opens_level(line: &str) -> bool {
    line.contains('{')
        || line.ends_with("-->")
        || line.starts_with("participant")
        || line.starts_with("class")
}
