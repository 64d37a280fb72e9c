//! # Text Flow
//!
//! Writes free text one physical line per source line. Lines end at any of
//! the separators in [`LINE_BREAKS`], Unicode line and paragraph separators
//! included. There is no reflow: a line longer than the content width runs
//! past the right margin. Before
//! each line the cursor is checked against the low-water mark, so a long
//! block continues at the top of the next page.

use super::{ElementRole, LayoutCursor, LayoutElement};
use crate::font::StandardFont;

/// Font and rhythm for a block of flowed text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f64,
    pub line_height: f64,
}

/// Characters that end a line. `\r\n` counts as one break.
pub const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split on every character in [`LINE_BREAKS`]. A trailing break adds no
/// empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.char_indices().find(|(_, c)| LINE_BREAKS.contains(c)) {
            Some((pos, ch)) => {
                lines.push(&rest[..pos]);
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { ch.len_utf8() };
                rest = &rest[pos + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

/// Emit `text` at the cursor, starting at `x`. Returns the number of lines
/// written.
pub fn flow_text(cursor: &mut LayoutCursor, text: &str, x: f64, style: TextStyle, role: ElementRole) -> usize {
    let lines = split_lines(text);
    for line in &lines {
        if cursor.below_low_water() {
            cursor.page_break();
        }
        cursor.push(LayoutElement::text(role, style.font, style.size, x, cursor.y(), *line));
        cursor.advance(style.line_height);
    }
    lines.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageGeometry;

    const BODY: TextStyle = TextStyle {
        font: StandardFont::Helvetica,
        size: 10.0,
        line_height: 12.0,
    };

    #[test]
    fn splits_on_every_break_style() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn splits_on_unicode_and_control_separators() {
        for sep in LINE_BREAKS {
            let text = format!("a{}b", sep);
            assert_eq!(split_lines(&text), vec!["a", "b"], "separator {:?}", sep);
        }
        assert_eq!(split_lines("a\u{2028}b\x0cc\u{85}d"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\u{2029}"), vec!["a"]);
        assert_eq!(split_lines("a\n\u{85}b"), vec!["a", "", "b"]);
    }

    #[test]
    fn trailing_break_adds_nothing() {
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\r\n"), vec!["a"]);
        assert_eq!(split_lines("a\r"), vec!["a"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn no_reflow_of_long_lines() {
        let long = "x".repeat(500);
        assert_eq!(split_lines(&long), vec![long.as_str()]);
    }

    #[test]
    fn advances_one_line_height_per_line() {
        let mut cursor = LayoutCursor::new(PageGeometry::default());
        let start = cursor.y();
        let n = flow_text(&mut cursor, "Uplink: 1Gbps\nBackup: 100Mbps", 40.0, BODY, ElementRole::NotesLine);
        assert_eq!(n, 2);
        assert!((start - cursor.y() - 24.0).abs() < 1e-9);

        let pages = cursor.finish();
        let lines: Vec<_> = pages[0].elements_with_role(ElementRole::NotesLine).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].texts(), vec!["Uplink: 1Gbps"]);
        assert!((lines[0].bottom() - start).abs() < 1e-9);
        assert!((lines[1].bottom() - (start - 12.0)).abs() < 1e-9);
    }

    #[test]
    fn long_notes_continue_on_next_page() {
        let mut cursor = LayoutCursor::new(PageGeometry::default());
        let text = vec!["line"; 100].join("\n");
        flow_text(&mut cursor, &text, 40.0, BODY, ElementRole::NotesLine);
        let pages = cursor.finish();

        // (781.89 - 80) / 12 = 58.49 -> 59 lines per page
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].count_role(ElementRole::NotesLine), 59);
        assert_eq!(pages[1].count_role(ElementRole::NotesLine), 41);
        for page in &pages {
            for line in &page.elements {
                assert!(line.bottom() >= 80.0);
            }
        }
    }
}
